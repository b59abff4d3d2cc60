// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2025 Daniel Negri
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Account persistence capability.
//!
//! The engine does not own a storage format. It talks to an [`AccountStore`]
//! that can load and save [`AccountRecord`]s; [`MemoryStore`] is the in-process
//! implementation used by tests and the batch tool.

use crate::base::AccountId;
use crate::ledger::LedgerEntry;
use dashmap::DashMap;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Storable form of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountRecord {
    pub account_id: AccountId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub holder: Option<String>,
    pub balance: Decimal,
    pub withdraw_limit: Decimal,
    #[serde(default)]
    pub ledger: Vec<LedgerEntry>,
}

/// Failure reported by an account store backend.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("account store error: {message}")]
pub struct StoreError {
    message: String,
}

impl StoreError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Load/save access to persisted accounts.
pub trait AccountStore {
    /// Returns `Ok(None)` when no record exists for `account_id`.
    fn load(&self, account_id: &AccountId) -> Result<Option<AccountRecord>, StoreError>;

    /// Inserts or replaces the record for `record.account_id`.
    fn save(&self, record: &AccountRecord) -> Result<(), StoreError>;
}

/// Thread-safe in-memory store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: DashMap<AccountId, AccountRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl AccountStore for MemoryStore {
    fn load(&self, account_id: &AccountId) -> Result<Option<AccountRecord>, StoreError> {
        Ok(self.records.get(account_id).map(|record| record.clone()))
    }

    fn save(&self, record: &AccountRecord) -> Result<(), StoreError> {
        self.records.insert(record.account_id.clone(), record.clone());
        Ok(())
    }
}
