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

//! Transaction processing core.
//!
//! [`TransactionProcessor`] ties balance validation, the optimistic
//! compare-and-swap, transaction-record creation and idempotency-result
//! caching into one logical operation:
//!
//! ```text
//! claim key -> load wallet -> validate balance -> compare-and-swap
//!           -> append record -> mark key done
//! ```
//!
//! # Invariants
//!
//! - A wallet balance never goes negative; a debit that would cross zero
//!   fails with [`LedgerError::InsufficientBalance`] and changes nothing.
//! - The compare-and-swap is the only serialization point for a wallet.
//!   Concurrent writers race; exactly one wins per round, the losers get
//!   [`LedgerError::BalanceConflict`] and append no record. The processor
//!   never retries internally; retry belongs to the caller.
//! - A transaction submitted twice under one idempotency key applies at most
//!   once; the retry returns the cached record of the first success.
//!
//! # Crash gap
//!
//! The in-memory store has no multi-entity transaction, so the swap is the
//! sole correctness guarantee: a crash between the balance update and the
//! record append leaves a balance without its record. This is an accepted,
//! documented gap, not something the processor tries to repair.

use crate::amount::Amount;
use crate::base::WalletId;
use crate::error::LedgerError;
use crate::idempotency::{Claim, IdempotencyKey, IdempotencyStatus, IdempotencyStore};
use crate::store::LedgerStore;
use crate::transaction::{self, Transaction};
use crate::wallet::{self, Wallet};
use std::sync::Arc;

/// The state machine that owns all writes to wallets, transactions and
/// idempotency records.
pub struct TransactionProcessor<S: LedgerStore> {
    store: Arc<S>,
    idempotency: Arc<IdempotencyStore>,
}

impl<S: LedgerStore> TransactionProcessor<S> {
    pub fn new(store: Arc<S>, idempotency: Arc<IdempotencyStore>) -> Self {
        Self { store, idempotency }
    }

    /// Read-path access to the underlying store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Creates a wallet, optionally with an opening credit.
    ///
    /// A positive `initial_balance` produces an initial `CREDIT` transaction
    /// whose balance snapshot equals the opening balance, so the
    /// sum-of-amounts invariant holds from the first record.
    pub fn setup_wallet(
        &self,
        name: &str,
        initial_balance: Amount,
    ) -> Result<(Wallet, Option<Transaction>), LedgerError> {
        let name = wallet::validate_name(name)?;
        if initial_balance.is_negative() {
            return Err(LedgerError::Validation(
                "initial balance must not be negative".into(),
            ));
        }

        let wallet = self.store.create_wallet(&name, initial_balance)?;
        let opening = if initial_balance.is_zero() {
            None
        } else {
            Some(self.store.create_transaction(Transaction::new(
                wallet.id,
                initial_balance,
                initial_balance,
                Some("Initial balance".into()),
            ))?)
        };

        tracing::info!(wallet = %wallet.id, balance = %wallet.balance, "wallet created");
        Ok((wallet, opening))
    }

    /// Applies a signed amount to a wallet and appends the transaction record.
    ///
    /// With an idempotency key, a completed earlier attempt short-circuits to
    /// its cached result, a concurrent attempt fails with
    /// [`LedgerError::RequestInFlight`], and a failed attempt releases the
    /// key before the error propagates.
    ///
    /// # Errors
    ///
    /// - [`LedgerError::InvalidAmount`] - zero amount (also rejected upstream).
    /// - [`LedgerError::WalletNotFound`] - no such wallet.
    /// - [`LedgerError::InsufficientBalance`] - debit would cross zero.
    /// - [`LedgerError::BalanceConflict`] - lost the compare-and-swap race.
    /// - [`LedgerError::RequestInFlight`] - key held by a concurrent request.
    pub fn process(
        &self,
        wallet_id: WalletId,
        amount: Amount,
        description: Option<String>,
        key: Option<IdempotencyKey>,
    ) -> Result<Transaction, LedgerError> {
        // Zero carries no sign to classify.
        if amount.is_zero() {
            return Err(LedgerError::InvalidAmount);
        }
        let description = transaction::validate_description(description)?;

        if let Some(key) = &key {
            match self.idempotency.claim(key) {
                Claim::Claimed => {}
                Claim::Existing(record) => match record.status {
                    IdempotencyStatus::Done => {
                        tracing::debug!(key = key.as_str(), "returning cached idempotent result");
                        return record
                            .result
                            .ok_or_else(|| LedgerError::Internal("done record without result".into()));
                    }
                    _ => return Err(LedgerError::RequestInFlight),
                },
            }
        }

        match self.apply(wallet_id, amount, description) {
            Ok(tx) => {
                if let Some(key) = &key {
                    self.idempotency.mark_done(key, tx.clone());
                }
                Ok(tx)
            }
            Err(err) => {
                // Release the key so the caller can retry with it immediately.
                if let Some(key) = &key {
                    self.idempotency.mark_failed(key);
                }
                Err(err)
            }
        }
    }

    fn apply(
        &self,
        wallet_id: WalletId,
        amount: Amount,
        description: Option<String>,
    ) -> Result<Transaction, LedgerError> {
        let wallet = self.store.get_wallet(wallet_id)?;

        let new_balance = wallet
            .balance
            .checked_add(amount)
            .ok_or_else(|| LedgerError::Internal("balance overflow".into()))?;
        if new_balance.is_negative() {
            return Err(LedgerError::InsufficientBalance {
                balance: wallet.balance,
                requested: amount,
            });
        }

        // Single attempt: a lost race is the caller's retry, not ours.
        let swapped =
            self.store
                .compare_and_swap_balance(wallet_id, wallet.balance, new_balance)?;
        if swapped.is_none() {
            tracing::debug!(wallet = %wallet_id, "compare-and-swap lost to a concurrent writer");
            return Err(LedgerError::BalanceConflict);
        }

        // Balance is committed from here on; the append is best-effort
        // sequential (see the crash-gap note in the module docs).
        let tx = self.store.create_transaction(Transaction::new(
            wallet_id,
            amount,
            new_balance,
            description,
        ))?;

        tracing::debug!(
            wallet = %wallet_id,
            tx = %tx.id,
            amount = %amount,
            balance = %new_balance,
            "transaction applied"
        );
        Ok(tx)
    }
}

impl<S: LedgerStore> Clone for TransactionProcessor<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            idempotency: Arc::clone(&self.idempotency),
        }
    }
}
