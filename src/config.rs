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

//! Engine configuration.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

/// Amount policy applied by the validator pipelines.
///
/// Defaults accept any positive amount in whole cents. Physical ATMs usually
/// set `withdrawal_step` to the smallest note they dispense.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AtmConfig {
    /// Smallest withdrawal accepted.
    pub minimum_withdrawal: Decimal,
    /// Smallest deposit accepted.
    pub minimum_deposit: Decimal,
    /// When set, withdrawals must be an exact multiple of this amount.
    pub withdrawal_step: Option<Decimal>,
}

impl AtmConfig {
    pub const DEFAULT_MINIMUM: Decimal = dec!(0.01);

    /// Config for a machine that only dispenses multiples of `denomination`.
    pub fn with_note_denomination(denomination: Decimal) -> Self {
        Self {
            minimum_withdrawal: denomination,
            withdrawal_step: Some(denomination),
            ..Self::default()
        }
    }
}

impl Default for AtmConfig {
    fn default() -> Self {
        Self {
            minimum_withdrawal: Self::DEFAULT_MINIMUM,
            minimum_deposit: Self::DEFAULT_MINIMUM,
            withdrawal_step: None,
        }
    }
}
