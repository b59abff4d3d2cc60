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

//! Transaction strategies.
//!
//! Each [`Operation`] maps to one strategy function. Strategies assume the
//! request has already passed its validator pipeline; they apply the effect
//! and, for mutations, append a [`LedgerEntry`].

use crate::account::AccountState;
use crate::ledger::{EntryKind, EntrySequence, LedgerEntry};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Signature shared by all strategies. Returns the resulting balance.
pub type StrategyFn = fn(&mut AccountState, Decimal, &EntrySequence) -> Decimal;

/// Operations an ATM supports.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Operation {
    Withdraw,
    Deposit,
    Inquire,
}

impl Operation {
    pub const ALL: [Operation; 3] = [Operation::Withdraw, Operation::Deposit, Operation::Inquire];

    pub fn strategy(self) -> StrategyFn {
        match self {
            Operation::Withdraw => withdraw,
            Operation::Deposit => deposit,
            Operation::Inquire => inquire,
        }
    }

    /// Ledger entry kind written by this operation, if any.
    pub fn entry_kind(self) -> Option<EntryKind> {
        match self {
            Operation::Withdraw => Some(EntryKind::Withdraw),
            Operation::Deposit => Some(EntryKind::Deposit),
            Operation::Inquire => None,
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Withdraw => f.write_str("withdraw"),
            Operation::Deposit => f.write_str("deposit"),
            Operation::Inquire => f.write_str("inquire"),
        }
    }
}

fn withdraw(state: &mut AccountState, amount: Decimal, ids: &EntrySequence) -> Decimal {
    let balance = state.debit(amount);
    record(state, Operation::Withdraw, amount, balance, ids);
    balance
}

fn deposit(state: &mut AccountState, amount: Decimal, ids: &EntrySequence) -> Decimal {
    let balance = state.credit(amount);
    record(state, Operation::Deposit, amount, balance, ids);
    balance
}

/// Appends the entry `operation` writes, if it writes one.
fn record(
    state: &mut AccountState,
    operation: Operation,
    amount: Decimal,
    balance: Decimal,
    ids: &EntrySequence,
) {
    if let Some(kind) = operation.entry_kind() {
        state.append(LedgerEntry::new(ids.next_id(), kind, amount, balance));
    }
}

fn inquire(state: &mut AccountState, _amount: Decimal, _ids: &EntrySequence) -> Decimal {
    state.balance()
}
