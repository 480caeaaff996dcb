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

//! Persistence layer for wallets and transactions.
//!
//! [`LedgerStore`] is the narrow seam the processor and query engine depend
//! on; storage-engine concerns stay behind it. Storage timeouts and
//! connectivity failures surface as [`LedgerError::StorageUnavailable`],
//! distinguishable from not-found and conflict outcomes so callers can decide
//! retry versus fail-fast.
//!
//! [`MemoryStore`] is the in-process implementation: wallets in a [`DashMap`]
//! and one append-only, mutex-guarded transaction log per wallet. The
//! compare-and-swap runs under the wallet entry's exclusive shard lock, which
//! makes it atomic with respect to every other balance writer.

use crate::amount::Amount;
use crate::base::WalletId;
use crate::error::LedgerError;
use crate::query::{Cursor, SortField, SortOrder, TransactionQuery};
use crate::transaction::Transaction;
use crate::wallet::Wallet;
use chrono::Utc;
use dashmap::DashMap;
use parking_lot::Mutex;
use std::time::Instant;

/// Result of a store read+write probe.
#[derive(Debug, Clone, Copy)]
pub struct StoreHealth {
    pub wallets: usize,
    pub transactions: usize,
    pub latency_ms: u64,
}

/// Storage abstraction over the two ledger entities.
///
/// `compare_and_swap_balance` is the sole mutation path for wallet balances
/// and the optimistic-concurrency primitive the processor depends on.
pub trait LedgerStore: Send + Sync {
    fn create_wallet(&self, name: &str, initial_balance: Amount) -> Result<Wallet, LedgerError>;

    /// Fetches a wallet, failing with [`LedgerError::WalletNotFound`] if absent.
    fn get_wallet(&self, id: WalletId) -> Result<Wallet, LedgerError>;

    /// Atomically updates the balance only if it still equals `expected`.
    ///
    /// Returns `Ok(None)` on a mismatch (a concurrent writer got there first);
    /// that is an expected outcome, not an error.
    fn compare_and_swap_balance(
        &self,
        id: WalletId,
        expected: Amount,
        new: Amount,
    ) -> Result<Option<Wallet>, LedgerError>;

    /// Append-only insert; existing records are never touched.
    fn create_transaction(&self, tx: Transaction) -> Result<Transaction, LedgerError>;

    /// Filtered, sorted read of at most `fetch` rows (the query engine asks
    /// for one row beyond its page size to detect further pages).
    fn transactions(
        &self,
        query: &TransactionQuery,
        fetch: usize,
    ) -> Result<Vec<Transaction>, LedgerError>;

    /// Read+write capability probe with measured latency.
    fn health(&self) -> Result<StoreHealth, LedgerError>;
}

/// In-memory ledger store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    /// Wallets indexed by id.
    wallets: DashMap<WalletId, Wallet>,
    /// Per-wallet transaction logs in append (creation) order.
    logs: DashMap<WalletId, Mutex<Vec<Transaction>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LedgerStore for MemoryStore {
    fn create_wallet(&self, name: &str, initial_balance: Amount) -> Result<Wallet, LedgerError> {
        let wallet = Wallet::new(name.to_string(), initial_balance);
        self.logs.insert(wallet.id, Mutex::new(Vec::new()));
        self.wallets.insert(wallet.id, wallet.clone());
        Ok(wallet)
    }

    fn get_wallet(&self, id: WalletId) -> Result<Wallet, LedgerError> {
        self.wallets
            .get(&id)
            .map(|entry| entry.clone())
            .ok_or(LedgerError::WalletNotFound)
    }

    fn compare_and_swap_balance(
        &self,
        id: WalletId,
        expected: Amount,
        new: Amount,
    ) -> Result<Option<Wallet>, LedgerError> {
        // get_mut holds the shard write lock, so compare and set is atomic.
        let mut entry = self.wallets.get_mut(&id).ok_or(LedgerError::WalletNotFound)?;
        if entry.balance != expected {
            return Ok(None);
        }
        entry.balance = new;
        entry.updated_at = Utc::now();
        Ok(Some(entry.clone()))
    }

    fn create_transaction(&self, tx: Transaction) -> Result<Transaction, LedgerError> {
        let log = self
            .logs
            .entry(tx.wallet_id)
            .or_insert_with(|| Mutex::new(Vec::new()));
        log.lock().push(tx.clone());
        Ok(tx)
    }

    fn transactions(
        &self,
        query: &TransactionQuery,
        fetch: usize,
    ) -> Result<Vec<Transaction>, LedgerError> {
        if !self.wallets.contains_key(&query.wallet_id) {
            return Err(LedgerError::WalletNotFound);
        }

        let mut rows: Vec<Transaction> = match self.logs.get(&query.wallet_id) {
            Some(log) => log
                .lock()
                .iter()
                .filter(|tx| query.kind.is_none_or(|k| tx.kind == k))
                .filter(|tx| match query.cursor {
                    None => true,
                    Some(Cursor::CreatedAt { created_at, id }) => {
                        let row = (tx.created_at, tx.id);
                        let seen = (created_at, id);
                        match query.order {
                            SortOrder::Asc => row > seen,
                            SortOrder::Desc => row < seen,
                        }
                    }
                    Some(Cursor::Amount { amount, id }) => {
                        let row = (tx.amount, tx.id);
                        let seen = (amount, id);
                        match query.order {
                            SortOrder::Asc => row > seen,
                            SortOrder::Desc => row < seen,
                        }
                    }
                })
                .cloned()
                .collect(),
            None => Vec::new(),
        };

        match (query.sort_by, query.order) {
            (SortField::CreatedAt, SortOrder::Asc) => {
                rows.sort_by_key(|tx| (tx.created_at, tx.id));
            }
            (SortField::CreatedAt, SortOrder::Desc) => {
                rows.sort_by(|a, b| (b.created_at, b.id).cmp(&(a.created_at, a.id)));
            }
            (SortField::Amount, SortOrder::Asc) => {
                rows.sort_by_key(|tx| (tx.amount, tx.id));
            }
            (SortField::Amount, SortOrder::Desc) => {
                rows.sort_by(|a, b| (b.amount, b.id).cmp(&(a.amount, a.id)));
            }
        }

        rows.truncate(fetch);
        Ok(rows)
    }

    fn health(&self) -> Result<StoreHealth, LedgerError> {
        let start = Instant::now();

        // Write probe: insert and remove a sentinel log entry.
        let probe = WalletId::generate();
        self.logs.insert(probe, Mutex::new(Vec::new()));
        self.logs.remove(&probe);

        // Read probe doubles as the stats gather.
        let wallets = self.wallets.len();
        let transactions = self
            .logs
            .iter()
            .map(|log| log.lock().len())
            .sum();

        Ok(StoreHealth {
            wallets,
            transactions,
            latency_ms: start.elapsed().as_millis() as u64,
        })
    }
}
