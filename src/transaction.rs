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

//! Immutable transaction records.
//!
//! A [`Transaction`] is an append-only, signed balance-change record tied to
//! one wallet. Its [`TransactionKind`] is fully determined by the sign of the
//! amount, and its `balance` field snapshots the wallet balance immediately
//! after the change was applied.

use crate::amount::Amount;
use crate::base::{TransactionId, WalletId};
use crate::error::LedgerError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Maximum length of a transaction description, in characters.
pub const DESCRIPTION_MAX_LEN: usize = 500;

/// Classification of a balance change, derived from the amount's sign.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TransactionKind {
    Credit,
    Debit,
}

/// A single applied balance change. Never updated or deleted once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: TransactionId,
    pub wallet_id: WalletId,
    /// Signed change, non-zero, at most 4 decimal places.
    pub amount: Amount,
    /// Wallet balance immediately after this transaction was applied.
    pub balance: Amount,
    pub description: Option<String>,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Builds a record for an applied balance change.
    ///
    /// `balance` is the post-apply snapshot; the kind is derived from the
    /// sign of `amount`.
    pub fn new(
        wallet_id: WalletId,
        amount: Amount,
        balance: Amount,
        description: Option<String>,
    ) -> Self {
        Self {
            id: TransactionId::generate(),
            wallet_id,
            kind: amount.kind(),
            amount,
            balance,
            description,
            created_at: Utc::now(),
        }
    }
}

/// Validates an optional description against [`DESCRIPTION_MAX_LEN`].
pub fn validate_description(
    description: Option<String>,
) -> Result<Option<String>, LedgerError> {
    match description {
        Some(text) if text.chars().count() > DESCRIPTION_MAX_LEN => Err(LedgerError::Validation(
            format!("description exceeds {DESCRIPTION_MAX_LEN} characters"),
        )),
        other => Ok(other),
    }
}
