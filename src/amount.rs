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

//! Fixed-point money helpers.
//!
//! All balances, limits and amounts are [`Decimal`] values carried at two
//! decimal places. Inputs with more precision are refused rather than rounded.

use rust_decimal::Decimal;

/// Number of decimal places carried by every monetary value.
pub const MONEY_SCALE: u32 = 2;

/// Returns `true` when `value` has no significant digits past the cents.
///
/// Trailing zeros do not count, so `1.500` is accepted and `1.005` is not.
pub fn is_money_scaled(value: Decimal) -> bool {
    value.normalize().scale() <= MONEY_SCALE
}

/// Rescales `value` to exactly two decimal places.
///
/// Returns `None` when that would round (sub-cent digits) or when the integer
/// part is too large for the 96-bit mantissa at two decimal places.
pub fn to_money(value: Decimal) -> Option<Decimal> {
    if !is_money_scaled(value) {
        return None;
    }
    let mut value = value;
    value.rescale(MONEY_SCALE);
    (value.scale() == MONEY_SCALE).then_some(value)
}
