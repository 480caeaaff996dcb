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

//! Transaction history queries and cursor pagination.
//!
//! Pagination is cursor-based: a cursor encodes the sort key and id of the
//! last returned row, and a page fetches `limit + 1` rows to learn whether
//! more follow without a second count query. The `(sort key, id)` pair is a
//! total order, so pages never overlap or skip rows even when the sort key
//! collides.
//!
//! A cursor is bound to the sort field that produced it: resuming an
//! amount-sorted listing with a `created_at` cursor (or vice versa) fails
//! with [`LedgerError::InvalidCursor`].

use crate::amount::Amount;
use crate::base::{TransactionId, WalletId};
use crate::error::LedgerError;
use crate::store::LedgerStore;
use crate::transaction::{Transaction, TransactionKind};
use base64::Engine as _;
use base64::engine::general_purpose::URL_SAFE_NO_PAD as BASE64;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Listing limits are silently clamped into this range, not rejected.
pub const LIST_LIMIT_MIN: usize = 1;
pub const LIST_LIMIT_MAX: usize = 100;
pub const DEFAULT_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    CreatedAt,
    Amount,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

/// Opaque pagination position: the sort key and id of the last-seen row.
///
/// Encoded as URL-safe base64 over `"t|{rfc3339}|{uuid}"` or
/// `"a|{amount}|{uuid}"`, so it can ride in a query string without escaping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cursor {
    CreatedAt {
        created_at: DateTime<Utc>,
        id: TransactionId,
    },
    Amount {
        amount: Amount,
        id: TransactionId,
    },
}

impl Cursor {
    /// Builds the resume position after `tx` for a `sort_by` listing.
    pub fn after(tx: &Transaction, sort_by: SortField) -> Self {
        match sort_by {
            SortField::CreatedAt => Self::CreatedAt {
                created_at: tx.created_at,
                id: tx.id,
            },
            SortField::Amount => Self::Amount {
                amount: tx.amount,
                id: tx.id,
            },
        }
    }

    /// The sort field this cursor can resume.
    pub fn sort_field(&self) -> SortField {
        match self {
            Self::CreatedAt { .. } => SortField::CreatedAt,
            Self::Amount { .. } => SortField::Amount,
        }
    }

    pub fn encode(&self) -> String {
        let text = match self {
            Self::CreatedAt { created_at, id } => {
                format!("t|{}|{}", created_at.to_rfc3339(), id)
            }
            Self::Amount { amount, id } => format!("a|{amount}|{id}"),
        };
        BASE64.encode(text)
    }

    pub fn decode(raw: &str) -> Result<Self, LedgerError> {
        let bytes = BASE64.decode(raw).map_err(|_| LedgerError::InvalidCursor)?;
        let text = String::from_utf8(bytes).map_err(|_| LedgerError::InvalidCursor)?;
        let (tag, rest) = text.split_once('|').ok_or(LedgerError::InvalidCursor)?;
        let (key, id) = rest.split_once('|').ok_or(LedgerError::InvalidCursor)?;
        let id = TransactionId(Uuid::parse_str(id).map_err(|_| LedgerError::InvalidCursor)?);
        match tag {
            "t" => {
                let created_at = DateTime::parse_from_rfc3339(key)
                    .map_err(|_| LedgerError::InvalidCursor)?
                    .with_timezone(&Utc);
                Ok(Self::CreatedAt { created_at, id })
            }
            "a" => {
                let amount = key.parse().map_err(|_| LedgerError::InvalidCursor)?;
                Ok(Self::Amount { amount, id })
            }
            _ => Err(LedgerError::InvalidCursor),
        }
    }
}

/// Filter, sort and page specification for a transaction history read.
#[derive(Debug, Clone)]
pub struct TransactionQuery {
    pub wallet_id: WalletId,
    pub kind: Option<TransactionKind>,
    pub sort_by: SortField,
    pub order: SortOrder,
    pub limit: usize,
    pub cursor: Option<Cursor>,
}

impl TransactionQuery {
    /// Default listing: newest first, no filter, [`DEFAULT_LIMIT`] rows.
    pub fn new(wallet_id: WalletId) -> Self {
        Self {
            wallet_id,
            kind: None,
            sort_by: SortField::CreatedAt,
            order: SortOrder::Desc,
            limit: DEFAULT_LIMIT,
            cursor: None,
        }
    }
}

/// One page of results with pagination metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub transactions: Vec<Transaction>,
    pub has_more: bool,
    pub next_cursor: Option<String>,
    /// The effective (clamped) limit that produced this page.
    pub limit: usize,
}

/// Executes `query` against `store`: clamps the limit, fetches `limit + 1`
/// rows, and derives `has_more`/`next_cursor` from the overshoot.
pub fn fetch_page<S: LedgerStore + ?Sized>(
    store: &S,
    mut query: TransactionQuery,
) -> Result<Page, LedgerError> {
    query.limit = query.limit.clamp(LIST_LIMIT_MIN, LIST_LIMIT_MAX);
    if let Some(cursor) = &query.cursor
        && cursor.sort_field() != query.sort_by
    {
        return Err(LedgerError::InvalidCursor);
    }

    let mut rows = store.transactions(&query, query.limit + 1)?;
    let has_more = rows.len() > query.limit;
    rows.truncate(query.limit);

    let next_cursor = if has_more {
        rows.last().map(|tx| Cursor::after(tx, query.sort_by).encode())
    } else {
        None
    };

    Ok(Page {
        transactions: rows,
        has_more,
        next_cursor,
        limit: query.limit,
    })
}
