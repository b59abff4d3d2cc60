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

//! Account management.
//!
//! An [`Account`] pairs immutable settings (identity, holder, withdrawal limit)
//! with a mutex-guarded [`AccountState`] holding the balance and the ledger.
//! The processor keeps that mutex for the whole validate → execute → append
//! sequence, so each account is updated as one unit.
//!
//! # Example
//!
//! ```
//! use rust_decimal_macros::dec;
//! use atm_engine::Account;
//!
//! let account = Account::new("12345", dec!(1000.00), dec!(500.00)).unwrap();
//! assert_eq!(account.balance(), dec!(1000.00));
//! assert_eq!(account.ledger_len(), 0);
//! ```

use crate::amount::{MONEY_SCALE, is_money_scaled, to_money};
use crate::base::AccountId;
use crate::error::{AmountRejection, TransactionError};
use crate::ledger::LedgerEntry;
use crate::store::AccountRecord;
use parking_lot::{Mutex, MutexGuard};
use rust_decimal::Decimal;
use serde::ser::{Serialize, SerializeStruct, Serializer};

/// Read-only view of the figures validators look at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountSnapshot {
    pub balance: Decimal,
    pub withdraw_limit: Decimal,
}

/// Mutable part of an account: balance and ledger.
#[derive(Debug)]
pub struct AccountState {
    balance: Decimal,
    ledger: Vec<LedgerEntry>,
}

impl AccountState {
    pub(crate) fn new(balance: Decimal) -> Self {
        Self {
            balance,
            ledger: Vec::new(),
        }
    }

    pub fn balance(&self) -> Decimal {
        self.balance
    }

    /// Entries in the order they were appended.
    pub fn ledger(&self) -> &[LedgerEntry] {
        &self.ledger
    }

    fn assert_invariants(&self) {
        debug_assert!(
            self.balance >= Decimal::ZERO,
            "Invariant violated: balance went negative: {}",
            self.balance
        );
    }

    /// Increases the balance and returns the new value.
    pub(crate) fn credit(&mut self, amount: Decimal) -> Decimal {
        self.balance += amount;
        self.assert_invariants();
        self.balance
    }

    /// Decreases the balance and returns the new value.
    ///
    /// Funds must already have been checked by the withdrawal pipeline.
    pub(crate) fn debit(&mut self, amount: Decimal) -> Decimal {
        self.balance -= amount;
        self.assert_invariants();
        self.balance
    }

    pub(crate) fn append(&mut self, entry: LedgerEntry) {
        self.ledger.push(entry);
    }
}

/// ATM account.
#[derive(Debug)]
pub struct Account {
    id: AccountId,
    holder: Option<String>,
    withdraw_limit: Decimal,
    inner: Mutex<AccountState>,
}

impl Account {
    const DECIMAL_PRECISION: u32 = MONEY_SCALE;

    /// Creates an account with an empty ledger.
    ///
    /// # Errors
    ///
    /// [`TransactionError::InvalidAmount`] if the opening balance or the
    /// withdrawal limit is negative or has more than two decimal places.
    pub fn new(
        id: impl Into<AccountId>,
        initial_balance: Decimal,
        withdraw_limit: Decimal,
    ) -> Result<Self, TransactionError> {
        Ok(Self {
            id: id.into(),
            holder: None,
            withdraw_limit: non_negative_money(withdraw_limit)?,
            inner: Mutex::new(AccountState::new(non_negative_money(initial_balance)?)),
        })
    }

    pub fn with_holder(mut self, holder: impl Into<String>) -> Self {
        self.holder = Some(holder.into());
        self
    }

    pub fn id(&self) -> &AccountId {
        &self.id
    }

    pub fn holder(&self) -> Option<&str> {
        self.holder.as_deref()
    }

    pub fn withdraw_limit(&self) -> Decimal {
        self.withdraw_limit
    }

    pub fn balance(&self) -> Decimal {
        self.inner.lock().balance
    }

    /// Copy of the ledger, oldest entry first.
    pub fn ledger(&self) -> Vec<LedgerEntry> {
        self.inner.lock().ledger.clone()
    }

    pub fn ledger_len(&self) -> usize {
        self.inner.lock().ledger.len()
    }

    pub fn snapshot(&self) -> AccountSnapshot {
        let state = self.inner.lock();
        self.snapshot_of(&state)
    }

    pub(crate) fn snapshot_of(&self, state: &AccountState) -> AccountSnapshot {
        AccountSnapshot {
            balance: state.balance,
            withdraw_limit: self.withdraw_limit,
        }
    }

    pub(crate) fn lock(&self) -> MutexGuard<'_, AccountState> {
        self.inner.lock()
    }

    /// Captures the account as a storable record.
    pub fn to_record(&self) -> AccountRecord {
        let state = self.inner.lock();
        AccountRecord {
            account_id: self.id.clone(),
            holder: self.holder.clone(),
            balance: state.balance,
            withdraw_limit: self.withdraw_limit,
            ledger: state.ledger.clone(),
        }
    }

    /// Rebuilds an account from a stored record, ledger included.
    ///
    /// # Errors
    ///
    /// [`TransactionError::InvalidAmount`] if the stored balance or limit
    /// breaks the same rules [`Account::new`] enforces.
    pub fn from_record(record: AccountRecord) -> Result<Self, TransactionError> {
        let mut state = AccountState::new(non_negative_money(record.balance)?);
        state.ledger = record.ledger;
        Ok(Self {
            id: record.account_id,
            holder: record.holder,
            withdraw_limit: non_negative_money(record.withdraw_limit)?,
            inner: Mutex::new(state),
        })
    }
}

fn non_negative_money(value: Decimal) -> Result<Decimal, TransactionError> {
    if value.is_sign_negative() && !value.is_zero() {
        return Err(TransactionError::invalid_amount(value, AmountRejection::Negative));
    }
    if !is_money_scaled(value) {
        return Err(TransactionError::invalid_amount(value, AmountRejection::TooPrecise));
    }
    to_money(value).ok_or_else(|| TransactionError::invalid_amount(value, AmountRejection::TooLarge))
}

impl Serialize for Account {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let data = self.inner.lock();
        let mut state = serializer.serialize_struct("Account", 4)?;
        state.serialize_field("account", &self.id)?;
        state.serialize_field(
            "balance",
            &data.balance.round_dp(Account::DECIMAL_PRECISION),
        )?;
        state.serialize_field(
            "withdraw_limit",
            &self.withdraw_limit.round_dp(Account::DECIMAL_PRECISION),
        )?;
        state.serialize_field("entries", &data.ledger.len())?;
        state.end()
    }
}
