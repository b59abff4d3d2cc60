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

//! Validator pipelines.
//!
//! A [`ValidatorPipeline`] is an ordered, immutable list of [`Rule`]s. Rules
//! are evaluated in order and the first failure is returned; later rules rely
//! on earlier ones having passed (the limit check assumes a positive amount).
//!
//! | Operation | Rules |
//! |-----------|-------|
//! | Withdraw | amount → sufficient funds → within limit |
//! | Deposit | amount → headroom |
//! | Inquire | none |

use crate::account::AccountSnapshot;
use crate::amount::{is_money_scaled, to_money};
use crate::config::AtmConfig;
use crate::error::{AmountRejection, TransactionError};
use rust_decimal::Decimal;

/// Constraints the amount rule enforces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AmountPolicy {
    pub minimum: Decimal,
    pub step: Option<Decimal>,
}

impl AmountPolicy {
    fn check(&self, amount: Decimal) -> Result<(), AmountRejection> {
        if amount <= Decimal::ZERO {
            return Err(AmountRejection::NotPositive);
        }
        if !is_money_scaled(amount) {
            return Err(AmountRejection::TooPrecise);
        }
        if to_money(amount).is_none() {
            return Err(AmountRejection::TooLarge);
        }
        if amount < self.minimum {
            return Err(AmountRejection::BelowMinimum(self.minimum));
        }
        match self.step {
            Some(step) if step > Decimal::ZERO && !(amount % step).is_zero() => {
                Err(AmountRejection::NotMultipleOf(step))
            }
            _ => Ok(()),
        }
    }
}

/// A single pre-execution check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rule {
    /// Positive, whole cents, and within the policy.
    Amount(AmountPolicy),
    /// Balance plus amount still fits at two decimal places.
    Headroom,
    /// Amount does not exceed the balance.
    SufficientFunds,
    /// Amount does not exceed the account's withdrawal limit.
    WithinLimit,
}

impl Rule {
    /// Checks `amount` against `snapshot`. Never mutates anything.
    pub fn check(&self, snapshot: &AccountSnapshot, amount: Decimal) -> Result<(), TransactionError> {
        match self {
            Rule::Amount(policy) => policy
                .check(amount)
                .map_err(|reason| TransactionError::invalid_amount(amount, reason)),
            Rule::Headroom => snapshot
                .balance
                .checked_add(amount)
                .and_then(to_money)
                .map(|_| ())
                .ok_or_else(|| TransactionError::invalid_amount(amount, AmountRejection::TooLarge)),
            Rule::SufficientFunds if amount > snapshot.balance => {
                Err(TransactionError::InsufficientFunds {
                    available: snapshot.balance,
                    requested: amount,
                })
            }
            Rule::WithinLimit if amount > snapshot.withdraw_limit => {
                Err(TransactionError::ExceededWithdrawLimit {
                    limit: snapshot.withdraw_limit,
                    requested: amount,
                })
            }
            Rule::SufficientFunds | Rule::WithinLimit => Ok(()),
        }
    }
}

/// Ordered fail-fast sequence of rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatorPipeline {
    rules: Box<[Rule]>,
}

impl ValidatorPipeline {
    pub fn new(rules: Vec<Rule>) -> Self {
        Self {
            rules: rules.into_boxed_slice(),
        }
    }

    /// Amount, then funds, then limit.
    pub fn withdrawal(config: &AtmConfig) -> Self {
        Self::new(vec![
            Rule::Amount(AmountPolicy {
                minimum: config.minimum_withdrawal,
                step: config.withdrawal_step,
            }),
            Rule::SufficientFunds,
            Rule::WithinLimit,
        ])
    }

    /// Amount, then headroom for the credit.
    pub fn deposit(config: &AtmConfig) -> Self {
        Self::new(vec![
            Rule::Amount(AmountPolicy {
                minimum: config.minimum_deposit,
                step: None,
            }),
            Rule::Headroom,
        ])
    }

    pub fn rules(&self) -> &[Rule] {
        &self.rules
    }

    /// Runs every rule in order, stopping at the first failure.
    pub fn validate(&self, snapshot: &AccountSnapshot, amount: Decimal) -> Result<(), TransactionError> {
        self.rules
            .iter()
            .try_for_each(|rule| rule.check(snapshot, amount))
    }
}
