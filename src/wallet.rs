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

//! Wallet entity.
//!
//! A wallet holds a non-negative decimal balance that is only ever mutated
//! through the store's compare-and-swap primitive. At rest the balance equals
//! the sum of all of the wallet's transaction amounts.

use crate::amount::Amount;
use crate::base::WalletId;
use crate::error::LedgerError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum length of a wallet name, in characters (after trimming).
pub const NAME_MAX_LEN: usize = 100;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Wallet {
    pub id: WalletId,
    pub name: String,
    pub balance: Amount,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Wallet {
    /// Creates a wallet with a fresh id. The caller validates the name first.
    pub fn new(name: String, balance: Amount) -> Self {
        let now = Utc::now();
        Self {
            id: WalletId::generate(),
            name,
            balance,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Trims and validates a wallet name (1 to [`NAME_MAX_LEN`] characters).
pub fn validate_name(name: &str) -> Result<String, LedgerError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::Validation(
            "wallet name must not be empty".into(),
        ));
    }
    if trimmed.chars().count() > NAME_MAX_LEN {
        return Err(LedgerError::Validation(format!(
            "wallet name exceeds {NAME_MAX_LEN} characters"
        )));
    }
    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_is_trimmed() {
        assert_eq!(validate_name("  Groceries  ").unwrap(), "Groceries");
    }

    #[test]
    fn empty_and_whitespace_names_rejected() {
        assert!(validate_name("").is_err());
        assert!(validate_name("   ").is_err());
    }

    #[test]
    fn name_length_is_bounded() {
        assert!(validate_name(&"a".repeat(NAME_MAX_LEN)).is_ok());
        assert!(validate_name(&"a".repeat(NAME_MAX_LEN + 1)).is_err());
    }

    #[test]
    fn new_wallet_timestamps_match() {
        let wallet = Wallet::new("Savings".into(), Amount::ZERO);
        assert_eq!(wallet.created_at, wallet.updated_at);
        assert!(wallet.balance.is_zero());
    }
}
