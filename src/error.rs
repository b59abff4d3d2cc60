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

//! Error types for ATM transaction processing.

use crate::base::AccountId;
use crate::store::StoreError;
use rust_decimal::Decimal;
use thiserror::Error;

/// Why an amount was refused by the amount rule.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum AmountRejection {
    /// Zero or negative amount for a withdrawal or deposit
    #[error("must be positive")]
    NotPositive,

    /// Negative opening balance or withdrawal limit
    #[error("must not be negative")]
    Negative,

    /// More than two significant decimal places
    #[error("must have at most two decimal places")]
    TooPrecise,

    /// Below the configured minimum for the operation
    #[error("must be at least {0}")]
    BelowMinimum(Decimal),

    /// Cannot be held at two decimal places, alone or added to the balance
    #[error("is too large")]
    TooLarge,

    /// Not a whole number of notes
    #[error("must be a multiple of {0}")]
    NotMultipleOf(Decimal),
}

/// Transaction processing errors.
///
/// Every variant is terminal for the request that produced it: the account is
/// left untouched and no ledger entry is written.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransactionError {
    /// No account is registered under the identifier
    #[error("account '{0}' not found")]
    AccountNotFound(AccountId),

    /// An account with the identifier is already registered
    #[error("account '{0}' already registered")]
    DuplicateAccount(AccountId),

    /// Amount failed the amount rule
    #[error("invalid amount {requested}: {reason}")]
    InvalidAmount {
        requested: Decimal,
        reason: AmountRejection,
    },

    /// Withdrawal would take the balance below zero
    #[error("insufficient funds: available {available}, requested {requested}")]
    InsufficientFunds {
        available: Decimal,
        requested: Decimal,
    },

    /// Withdrawal is larger than the account's per-transaction limit
    #[error("withdrawal limit exceeded: limit {limit}, requested {requested}")]
    ExceededWithdrawLimit { limit: Decimal, requested: Decimal },

    /// Account store failed to load or save a record
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl TransactionError {
    pub(crate) fn invalid_amount(requested: Decimal, reason: AmountRejection) -> Self {
        Self::InvalidAmount { requested, reason }
    }
}
