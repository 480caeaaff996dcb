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

//! # Wallet Ledger
//!
//! This library provides a ledger-style wallet service: signed-amount
//! transactions applied to exact decimal balances, with optimistic-lock
//! concurrency control, idempotent retries, cursor pagination, and CSV export.
//!
//! ## Core Components
//!
//! - [`TransactionProcessor`]: Validates and applies transactions atomically
//! - [`MemoryStore`]: In-memory [`LedgerStore`] with compare-and-swap updates
//! - [`IdempotencyStore`]: Caches results so retried requests apply once
//! - [`Amount`]: Exact decimal money type, at most 4 fractional digits
//! - [`LedgerError`]: Error taxonomy shared across every layer
//!
//! ## Example
//!
//! ```
//! use std::sync::Arc;
//! use rust_decimal_macros::dec;
//! use wallet_ledger_rs::{
//!     Amount, IdempotencyStore, MemoryStore, TransactionProcessor,
//! };
//!
//! let processor = TransactionProcessor::new(
//!     Arc::new(MemoryStore::new()),
//!     Arc::new(IdempotencyStore::new()),
//! );
//!
//! // Create a wallet with an opening balance
//! let (wallet, opening) = processor
//!     .setup_wallet("Groceries", Amount::new(dec!(100.50)).unwrap())
//!     .unwrap();
//! assert!(opening.is_some());
//!
//! // Debit it
//! let tx = processor
//!     .process(
//!         wallet.id,
//!         Amount::new(dec!(-30.25)).unwrap(),
//!         Some("veggies".into()),
//!         None,
//!     )
//!     .unwrap();
//! assert_eq!(tx.balance, Amount::new(dec!(70.25)).unwrap());
//! ```

pub mod amount;
pub mod base;
pub mod error;
pub mod export;
pub mod idempotency;
pub mod processor;
pub mod query;
pub mod server;
pub mod store;
pub mod transaction;
pub mod wallet;

pub use amount::Amount;
pub use base::{TransactionId, WalletId};
pub use error::LedgerError;
pub use export::{EXPORT_LIMIT_MAX, write_csv};
pub use idempotency::{
    Claim, IdempotencyKey, IdempotencyRecord, IdempotencyStatus, IdempotencyStore,
};
pub use processor::TransactionProcessor;
pub use query::{Cursor, Page, SortField, SortOrder, TransactionQuery, fetch_page};
pub use server::{AppState, create_router};
pub use store::{LedgerStore, MemoryStore, StoreHealth};
pub use transaction::{Transaction, TransactionKind};
pub use wallet::Wallet;
