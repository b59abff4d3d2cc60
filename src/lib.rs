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

//! # ATM Engine
//!
//! This library provides an ATM transaction engine: withdrawals, deposits and
//! balance inquiries against registered accounts, each gated by an ordered
//! validator pipeline and recorded in an append-only ledger.
//!
//! ## Core Components
//!
//! - [`TransactionProcessor`]: Owns the account registry and runs requests
//! - [`Account`]: Balance, withdrawal limit and ledger of one account
//! - [`ValidatorPipeline`]: Ordered fail-fast rules run before a mutation
//! - [`Operation`]: Withdraw / deposit / inquire, each mapped to a strategy
//! - [`LedgerEntry`]: Immutable record of a completed mutation
//! - [`AccountStore`]: Load/save capability for persisted accounts
//! - [`TransactionError`]: Error types for rejected requests
//!
//! ## Example
//!
//! ```
//! use atm_engine::{TransactionError, TransactionProcessor};
//! use rust_decimal_macros::dec;
//!
//! let processor = TransactionProcessor::new();
//! processor.register_account("12345", dec!(1000.00), dec!(500.00)).unwrap();
//!
//! assert_eq!(processor.withdrawal("12345", dec!(100.00)).unwrap(), dec!(900.00));
//! assert_eq!(processor.deposit("12345", dec!(200.00)).unwrap(), dec!(1100.00));
//! assert_eq!(processor.balance_inquiry("12345").unwrap(), dec!(1100.00));
//!
//! let result = processor.withdrawal("12345", dec!(600.00));
//! assert!(matches!(result, Err(TransactionError::ExceededWithdrawLimit { .. })));
//! ```
//!
//! ## Thread Safety
//!
//! The processor can be shared across threads. Each account is locked for the
//! full validate-execute-append sequence, so concurrent withdrawals can never
//! overdraw it.

pub mod account;
mod amount;
mod base;
mod config;
pub mod error;
pub mod ledger;
mod processor;
pub mod store;
mod strategy;
pub mod validator;

pub use account::{Account, AccountSnapshot, AccountState};
pub use amount::MONEY_SCALE;
pub use base::{AccountId, EntryId};
pub use config::AtmConfig;
pub use error::{AmountRejection, TransactionError};
pub use ledger::{EntryKind, LedgerEntry};
pub use processor::TransactionProcessor;
pub use store::{AccountRecord, AccountStore, MemoryStore, StoreError};
pub use strategy::{Operation, StrategyFn};
pub use validator::{AmountPolicy, Rule, ValidatorPipeline};
