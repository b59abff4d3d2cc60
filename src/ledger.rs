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

//! Ledger entries.
//!
//! A [`LedgerEntry`] is written once per completed withdrawal or deposit and
//! never changes afterwards. Balance inquiries do not produce entries.

use crate::base::EntryId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Kind of mutation recorded by a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    Withdraw,
    Deposit,
}

impl fmt::Display for EntryKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Withdraw => f.write_str("withdraw"),
            Self::Deposit => f.write_str("deposit"),
        }
    }
}

/// Immutable audit record of a completed mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerEntry {
    id: EntryId,
    kind: EntryKind,
    amount: Decimal,
    balance_after: Decimal,
    created_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// Stamps a new entry with the current UTC time.
    pub(crate) fn new(id: EntryId, kind: EntryKind, amount: Decimal, balance_after: Decimal) -> Self {
        debug_assert!(amount > Decimal::ZERO, "ledger entries record positive amounts");
        Self {
            id,
            kind,
            amount,
            balance_after,
            created_at: Utc::now(),
        }
    }

    pub fn id(&self) -> EntryId {
        self.id
    }

    pub fn kind(&self) -> EntryKind {
        self.kind
    }

    pub fn amount(&self) -> Decimal {
        self.amount
    }

    /// Account balance immediately after this entry was applied.
    pub fn balance_after(&self) -> Decimal {
        self.balance_after
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Monotonic source of [`EntryId`]s shared by every account of a processor.
#[derive(Debug)]
pub struct EntrySequence {
    next: AtomicU64,
}

impl EntrySequence {
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Hands out the next unused identifier.
    pub fn next_id(&self) -> EntryId {
        EntryId(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// Ensures ids handed out later are greater than `id`.
    ///
    /// Used when accounts are restored from a store with existing entries.
    pub fn advance_past(&self, id: EntryId) {
        self.next.fetch_max(id.0.saturating_add(1), Ordering::Relaxed);
    }
}

impl Default for EntrySequence {
    fn default() -> Self {
        Self::new()
    }
}
