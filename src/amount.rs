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

//! Exact monetary amounts.
//!
//! [`Amount`] wraps [`rust_decimal::Decimal`] with the wallet contract:
//! at most four fractional digits, exact addition, and a stable decimal-string
//! representation on the wire (never scientific notation, never a binary float).
//!
//! # Example
//!
//! ```
//! use wallet_ledger_rs::Amount;
//!
//! let credit: Amount = "100.50".parse().unwrap();
//! let debit: Amount = "-30.25".parse().unwrap();
//! assert_eq!(credit.checked_add(debit).unwrap(), "70.25".parse().unwrap());
//! ```

use crate::error::LedgerError;
use crate::transaction::TransactionKind;
use rust_decimal::Decimal;
use rust_decimal::prelude::FromPrimitive;
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// A signed monetary value with at most [`Amount::SCALE`] fractional digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct Amount(Decimal);

impl Amount {
    /// Maximum number of fractional digits an amount may carry.
    pub const SCALE: u32 = 4;

    pub const ZERO: Amount = Amount(Decimal::ZERO);

    /// Wraps a decimal, rejecting values with more than four fractional digits.
    pub fn new(value: Decimal) -> Result<Self, LedgerError> {
        // normalize() first: "1.50000" carries scale 5 but is representable at 4.
        let value = value.normalize();
        if value.scale() > Self::SCALE {
            return Err(LedgerError::InvalidAmount);
        }
        Ok(Self(value))
    }

    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    pub fn is_negative(&self) -> bool {
        self.0.is_sign_negative() && !self.0.is_zero()
    }

    /// Exact addition. `None` only on overflow of the underlying 96-bit mantissa.
    pub fn checked_add(self, other: Amount) -> Option<Amount> {
        self.0.checked_add(other.0).map(Amount)
    }

    /// Transaction classification derived from the sign.
    ///
    /// Zero amounts are rejected before classification ever happens; callers
    /// must not rely on a meaningful kind for zero.
    pub fn kind(&self) -> TransactionKind {
        if self.is_negative() {
            TransactionKind::Debit
        } else {
            TransactionKind::Credit
        }
    }

    pub fn inner(&self) -> Decimal {
        self.0
    }
}

impl FromStr for Amount {
    type Err = LedgerError;

    /// Parses a plain decimal string such as `"100.50"` or `"-0.0001"`.
    ///
    /// Scientific notation is not accepted, and neither are more than four
    /// fractional digits.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // Decimal::from_str parses exponent forms such as "1e5"; reject them.
        if s.contains(['e', 'E']) {
            return Err(LedgerError::InvalidAmount);
        }
        let decimal = Decimal::from_str(s).map_err(|_| LedgerError::InvalidAmount)?;
        Amount::new(decimal)
    }
}

impl TryFrom<f64> for Amount {
    type Error = LedgerError;

    /// Converts a binary float, rejecting NaN and infinities.
    ///
    /// The result is rounded to four decimal places; callers that need exact
    /// values should parse decimal strings instead.
    fn try_from(value: f64) -> Result<Self, Self::Error> {
        let decimal = Decimal::from_f64(value).ok_or(LedgerError::InvalidAmount)?;
        Amount::new(decimal.round_dp(Self::SCALE))
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Through FromStr, so the wire gets the same scale and notation
        // rules as every other entry point.
        let text = <String as Deserialize>::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
