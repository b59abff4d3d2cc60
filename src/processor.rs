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

//! Transaction processor.
//!
//! The [`TransactionProcessor`] owns the account registry and binds a
//! validator pipeline and a strategy to each [`Operation`]:
//!
//! | Operation | Pipeline | Ledger entry |
//! |-----------|----------|--------------|
//! | Withdraw | amount → funds → limit | yes |
//! | Deposit | amount → headroom | yes |
//! | Inquire | none | no |
//!
//! # Thread Safety
//!
//! Accounts live in a [`DashMap`] behind [`Arc`]. A request clones the
//! account handle out of the map, releases the map guard, and then holds the
//! account's own lock across validation, execution and the ledger append.
//! Requests on different accounts never contend; requests on the same
//! account are serialized, so the balance can never be validated against a
//! stale value.

use crate::account::Account;
use crate::amount::to_money;
use crate::base::AccountId;
use crate::config::AtmConfig;
use crate::ledger::{EntrySequence, LedgerEntry};
use crate::store::AccountStore;
use crate::strategy::Operation;
use crate::validator::ValidatorPipeline;
use crate::TransactionError;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::{debug, warn};

/// ATM transaction processor.
///
/// # Invariants
///
/// - Account identifiers are unique within the registry.
/// - Balances never go negative; a rejected request changes nothing.
/// - Every successful withdrawal or deposit appends exactly one ledger entry;
///   inquiries append none.
pub struct TransactionProcessor {
    /// Registered accounts indexed by identifier.
    accounts: DashMap<AccountId, Arc<Account>>,
    withdrawal_pipeline: ValidatorPipeline,
    deposit_pipeline: ValidatorPipeline,
    /// Source of ledger entry ids for every account.
    entry_ids: EntrySequence,
    config: AtmConfig,
}

impl TransactionProcessor {
    /// Creates a processor with the default amount policy and no accounts.
    pub fn new() -> Self {
        Self::with_config(AtmConfig::default())
    }

    pub fn with_config(config: AtmConfig) -> Self {
        TransactionProcessor {
            accounts: DashMap::new(),
            withdrawal_pipeline: ValidatorPipeline::withdrawal(&config),
            deposit_pipeline: ValidatorPipeline::deposit(&config),
            entry_ids: EntrySequence::new(),
            config,
        }
    }

    pub fn config(&self) -> &AtmConfig {
        &self.config
    }

    /// Pipeline run before `operation`, or `None` when it needs no validation.
    pub fn pipeline(&self, operation: Operation) -> Option<&ValidatorPipeline> {
        match operation {
            Operation::Withdraw => Some(&self.withdrawal_pipeline),
            Operation::Deposit => Some(&self.deposit_pipeline),
            Operation::Inquire => None,
        }
    }

    /// Opens a new account.
    ///
    /// # Errors
    ///
    /// - [`TransactionError::DuplicateAccount`] - Identifier already registered.
    /// - [`TransactionError::InvalidAmount`] - Negative or sub-cent balance or limit.
    pub fn register_account(
        &self,
        account_id: impl Into<AccountId>,
        initial_balance: Decimal,
        withdraw_limit: Decimal,
    ) -> Result<(), TransactionError> {
        self.register(Account::new(account_id, initial_balance, withdraw_limit)?)
    }

    /// Adds a pre-built account to the registry.
    ///
    /// # Errors
    ///
    /// [`TransactionError::DuplicateAccount`] if the identifier is taken.
    pub fn register(&self, account: Account) -> Result<(), TransactionError> {
        // Entry API makes check-and-insert atomic
        let account = match self.accounts.entry(account.id().clone()) {
            Entry::Occupied(entry) => {
                warn!(account = %entry.key(), "duplicate account registration");
                return Err(TransactionError::DuplicateAccount(entry.key().clone()));
            }
            Entry::Vacant(entry) => Arc::clone(entry.insert(Arc::new(account)).value()),
        };

        // Restored ledgers must not collide with ids handed out later
        if let Some(last) = account.ledger().iter().map(LedgerEntry::id).max() {
            self.entry_ids.advance_past(last);
        }
        debug!(
            account = %account.id(),
            balance = %account.balance(),
            withdraw_limit = %account.withdraw_limit(),
            "account registered"
        );
        Ok(())
    }

    /// Withdraws `amount` and returns the new balance.
    ///
    /// # Errors
    ///
    /// - [`TransactionError::AccountNotFound`]
    /// - [`TransactionError::InvalidAmount`]
    /// - [`TransactionError::InsufficientFunds`]
    /// - [`TransactionError::ExceededWithdrawLimit`]
    pub fn withdrawal(&self, account_id: &str, amount: Decimal) -> Result<Decimal, TransactionError> {
        self.execute(Operation::Withdraw, account_id, amount)
    }

    /// Deposits `amount` and returns the new balance.
    ///
    /// # Errors
    ///
    /// - [`TransactionError::AccountNotFound`]
    /// - [`TransactionError::InvalidAmount`]
    pub fn deposit(&self, account_id: &str, amount: Decimal) -> Result<Decimal, TransactionError> {
        self.execute(Operation::Deposit, account_id, amount)
    }

    /// Returns the current balance without recording anything.
    ///
    /// # Errors
    ///
    /// [`TransactionError::AccountNotFound`]
    pub fn balance_inquiry(&self, account_id: &str) -> Result<Decimal, TransactionError> {
        self.execute(Operation::Inquire, account_id, Decimal::ZERO)
    }

    /// Runs `operation` against an account: resolve, validate, execute.
    ///
    /// `amount` is ignored for [`Operation::Inquire`].
    pub fn execute(
        &self,
        operation: Operation,
        account_id: &str,
        amount: Decimal,
    ) -> Result<Decimal, TransactionError> {
        let account = self.resolve(account_id).inspect_err(|error| {
            warn!(account = account_id, %operation, %error, "request rejected");
        })?;

        // Amounts that cannot be held in cents stay as given for the amount rule to reject
        let amount = to_money(amount).unwrap_or(amount);

        // Held until the ledger entry is appended
        let mut state = account.lock();

        if let Some(pipeline) = self.pipeline(operation) {
            let snapshot = account.snapshot_of(&state);
            pipeline.validate(&snapshot, amount).inspect_err(|error| {
                warn!(account = account_id, %operation, %amount, %error, "request rejected");
            })?;
        }

        let balance = operation.strategy()(&mut *state, amount, &self.entry_ids);
        debug!(account = account_id, %operation, %amount, %balance, "request applied");
        Ok(balance)
    }

    /// Retrieves an account by identifier.
    pub fn get_account(&self, account_id: &str) -> Option<Arc<Account>> {
        self.accounts.get(account_id).map(|entry| Arc::clone(entry.value()))
    }

    /// Returns an iterator over all registered accounts.
    pub fn accounts(
        &self,
    ) -> impl Iterator<Item = dashmap::mapref::multiple::RefMulti<'_, AccountId, Arc<Account>>> {
        self.accounts.iter()
    }

    /// Copy of an account's ledger, oldest entry first.
    pub fn ledger(&self, account_id: &str) -> Result<Vec<LedgerEntry>, TransactionError> {
        Ok(self.resolve(account_id)?.ledger())
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    /// Registers the account stored under `account_id`.
    ///
    /// # Errors
    ///
    /// - [`TransactionError::AccountNotFound`] - Store has no such record.
    /// - [`TransactionError::DuplicateAccount`] - Already registered here.
    /// - [`TransactionError::Store`] - Backend failure.
    pub fn load_account<S>(&self, store: &S, account_id: &str) -> Result<(), TransactionError>
    where
        S: AccountStore + ?Sized,
    {
        let id = AccountId::from(account_id);
        let record = store
            .load(&id)?
            .ok_or(TransactionError::AccountNotFound(id))?;
        self.register(Account::from_record(record)?)
    }

    /// Writes one account to `store`.
    pub fn save_account<S>(&self, store: &S, account_id: &str) -> Result<(), TransactionError>
    where
        S: AccountStore + ?Sized,
    {
        let account = self.resolve(account_id)?;
        store.save(&account.to_record())?;
        Ok(())
    }

    /// Writes every account to `store` and returns how many were saved.
    pub fn save_all<S>(&self, store: &S) -> Result<usize, TransactionError>
    where
        S: AccountStore + ?Sized,
    {
        // Collect first so no map guard is held while the store runs
        let accounts: Vec<Arc<Account>> = self
            .accounts
            .iter()
            .map(|entry| Arc::clone(entry.value()))
            .collect();
        for account in &accounts {
            store.save(&account.to_record())?;
        }
        debug!(count = accounts.len(), "accounts saved");
        Ok(accounts.len())
    }

    fn resolve(&self, account_id: &str) -> Result<Arc<Account>, TransactionError> {
        self.get_account(account_id)
            .ok_or_else(|| TransactionError::AccountNotFound(AccountId::from(account_id)))
    }
}

impl Default for TransactionProcessor {
    fn default() -> Self {
        Self::new()
    }
}
