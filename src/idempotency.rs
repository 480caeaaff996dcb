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

//! Idempotency key claims and cached results.
//!
//! The store provides an atomic claim-or-read primitive: the first caller to
//! claim a key inserts a `Processing` record and runs the transaction; every
//! concurrent caller with the same key observes that record instead. Once the
//! transaction commits, the record turns `Done` and carries the result so a
//! retried request returns the original transaction without side effects.
//!
//! A failed attempt marks its record `Failed`, which makes the key
//! immediately re-claimable; records also expire after a TTL (24 hours by
//! default) and are swept by [`IdempotencyStore::purge_expired`].

use crate::error::LedgerError;
use crate::transaction::Transaction;
use chrono::{DateTime, Duration, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

/// Maximum length of an idempotency key, in characters.
pub const KEY_MAX_LEN: usize = 255;

const DEFAULT_TTL_HOURS: i64 = 24;

/// Caller-supplied token ensuring a logical request applies at most once.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IdempotencyKey(String);

impl IdempotencyKey {
    /// Validates a raw key (1 to [`KEY_MAX_LEN`] characters).
    pub fn new(key: impl Into<String>) -> Result<Self, LedgerError> {
        let key = key.into();
        if key.is_empty() || key.chars().count() > KEY_MAX_LEN {
            return Err(LedgerError::Validation(format!(
                "idempotency key must be 1 to {KEY_MAX_LEN} characters"
            )));
        }
        Ok(Self(key))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdempotencyStatus {
    Processing,
    Done,
    Failed,
}

#[derive(Debug, Clone)]
pub struct IdempotencyRecord {
    pub status: IdempotencyStatus,
    /// Cached transaction, present only once the record is `Done`.
    pub result: Option<Transaction>,
    pub created_at: DateTime<Utc>,
}

impl IdempotencyRecord {
    fn processing() -> Self {
        Self {
            status: IdempotencyStatus::Processing,
            result: None,
            created_at: Utc::now(),
        }
    }
}

/// Outcome of a claim attempt.
#[derive(Debug)]
pub enum Claim {
    /// The key was free (or expired/failed) and is now held by this caller.
    Claimed,
    /// Another caller holds the key; `Done` records carry the cached result.
    Existing(IdempotencyRecord),
}

#[derive(Debug)]
pub struct IdempotencyStore {
    records: DashMap<IdempotencyKey, IdempotencyRecord>,
    ttl: Duration,
}

impl IdempotencyStore {
    pub fn new() -> Self {
        Self::with_ttl(Duration::hours(DEFAULT_TTL_HOURS))
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            records: DashMap::new(),
            ttl,
        }
    }

    /// Atomically claims `key` or returns the existing record.
    ///
    /// The entry API gives a single atomic insert-or-fail, closing the race
    /// between two concurrent callers with the same key. Expired and `Failed`
    /// records are replaced by a fresh `Processing` claim, so `Existing` only
    /// ever carries `Processing` or `Done`.
    pub fn claim(&self, key: &IdempotencyKey) -> Claim {
        match self.records.entry(key.clone()) {
            Entry::Occupied(mut entry) => {
                let record = entry.get().clone();
                let expired = Utc::now() - record.created_at > self.ttl;
                if expired || record.status == IdempotencyStatus::Failed {
                    entry.insert(IdempotencyRecord::processing());
                    Claim::Claimed
                } else {
                    Claim::Existing(record)
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(IdempotencyRecord::processing());
                Claim::Claimed
            }
        }
    }

    /// Stores the committed transaction as the cached result for `key`.
    pub fn mark_done(&self, key: &IdempotencyKey, result: Transaction) {
        if let Some(mut record) = self.records.get_mut(key) {
            record.status = IdempotencyStatus::Done;
            record.result = Some(result);
        }
    }

    /// Releases `key` after a failed attempt so the caller can retry it.
    pub fn mark_failed(&self, key: &IdempotencyKey) {
        if let Some(mut record) = self.records.get_mut(key) {
            record.status = IdempotencyStatus::Failed;
            record.result = None;
        }
    }

    /// Removes records older than the TTL. Returns the number purged.
    pub fn purge_expired(&self) -> usize {
        let cutoff = Utc::now() - self.ttl;
        let before = self.records.len();
        self.records.retain(|_, record| record.created_at >= cutoff);
        before - self.records.len()
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.records.len()
    }
}

impl Default for IdempotencyStore {
    fn default() -> Self {
        Self::new()
    }
}
