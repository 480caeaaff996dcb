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

//! Error types for wallet and transaction processing.

use crate::amount::Amount;
use thiserror::Error;

/// Wallet service errors.
///
/// The core never swallows an error: every failure propagates as one of these
/// variants, and the HTTP layer maps them to status codes at the boundary.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// Malformed or out-of-range input, rejected before reaching the core
    #[error("invalid input: {0}")]
    Validation(String),

    /// Amount is zero, unparsable, or carries more than four decimal places
    #[error("invalid amount (must be a non-zero decimal with at most 4 decimal places)")]
    InvalidAmount,

    /// Wallet does not exist
    #[error("wallet not found")]
    WalletNotFound,

    /// Debit would drive the balance negative
    #[error("insufficient balance: have {balance}, requested {requested}")]
    InsufficientBalance { balance: Amount, requested: Amount },

    /// Another writer updated the balance between read and compare-and-swap
    #[error("balance changed during transaction; retry")]
    BalanceConflict,

    /// The idempotency key is claimed by an in-flight request
    #[error("request already in-flight")]
    RequestInFlight,

    /// Pagination cursor could not be decoded
    #[error("invalid pagination cursor")]
    InvalidCursor,

    /// Storage timeout or connectivity failure; safe to retry
    #[error("storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Anything unanticipated; details are logged, not shown to clients
    #[error("internal error: {0}")]
    Internal(String),
}
