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

//! Cursor pagination integration tests.

use rust_decimal_macros::dec;
use std::collections::HashSet;
use std::sync::Arc;
use wallet_ledger_rs::{
    Amount, Cursor, IdempotencyStore, LedgerError, MemoryStore, SortField, SortOrder,
    TransactionId, TransactionKind, TransactionProcessor, TransactionQuery, fetch_page,
};

fn seeded_wallet(count: usize) -> (TransactionProcessor<MemoryStore>, wallet_ledger_rs::WalletId) {
    let processor = TransactionProcessor::new(
        Arc::new(MemoryStore::new()),
        Arc::new(IdempotencyStore::new()),
    );
    let (wallet, _) = processor.setup_wallet("Paged", Amount::ZERO).unwrap();
    for i in 0..count {
        let delta = if i % 3 == 2 { dec!(-1) } else { dec!(10) };
        processor
            .process(wallet.id, Amount::new(delta).unwrap(), None, None)
            .unwrap();
    }
    (processor, wallet.id)
}

#[test]
fn following_cursors_visits_every_record_once() {
    let (processor, wallet_id) = seeded_wallet(5);

    let mut seen: Vec<TransactionId> = Vec::new();
    let mut cursor: Option<Cursor> = None;
    let mut pages = 0;
    loop {
        let mut query = TransactionQuery::new(wallet_id);
        query.limit = 2;
        query.cursor = cursor.take();
        let page = fetch_page(processor.store(), query).unwrap();

        assert!(page.transactions.len() <= 2);
        seen.extend(page.transactions.iter().map(|tx| tx.id));
        pages += 1;

        if !page.has_more {
            assert!(page.next_cursor.is_none());
            break;
        }
        let next = page.next_cursor.expect("more pages must carry a cursor");
        cursor = Some(Cursor::decode(&next).unwrap());
    }

    assert_eq!(pages, 3);
    assert_eq!(seen.len(), 5);
    let distinct: HashSet<_> = seen.iter().copied().collect();
    assert_eq!(distinct.len(), 5, "no record repeats across pages");
}

#[test]
fn default_order_is_newest_first() {
    let (processor, wallet_id) = seeded_wallet(4);

    let page = fetch_page(processor.store(), TransactionQuery::new(wallet_id)).unwrap();
    assert_eq!(page.transactions.len(), 4);
    for pair in page.transactions.windows(2) {
        assert!(
            (pair[0].created_at, pair[0].id) > (pair[1].created_at, pair[1].id),
            "descending (created_at, id) order"
        );
    }
}

#[test]
fn limit_is_clamped_to_bounds() {
    let (processor, wallet_id) = seeded_wallet(3);

    let mut query = TransactionQuery::new(wallet_id);
    query.limit = 0;
    let page = fetch_page(processor.store(), query).unwrap();
    assert_eq!(page.limit, 1);
    assert_eq!(page.transactions.len(), 1);

    let mut query = TransactionQuery::new(wallet_id);
    query.limit = 5000;
    let page = fetch_page(processor.store(), query).unwrap();
    assert_eq!(page.limit, 100);
    assert_eq!(page.transactions.len(), 3);
    assert!(!page.has_more);
}

#[test]
fn kind_filter_returns_only_matching_records() {
    let (processor, wallet_id) = seeded_wallet(6);

    let mut query = TransactionQuery::new(wallet_id);
    query.kind = Some(TransactionKind::Debit);
    let page = fetch_page(processor.store(), query).unwrap();

    assert_eq!(page.transactions.len(), 2);
    assert!(
        page.transactions
            .iter()
            .all(|tx| tx.kind == TransactionKind::Debit)
    );
}

#[test]
fn amount_sort_pages_by_value_with_resumable_cursors() {
    let (processor, wallet_id) = seeded_wallet(6);

    let mut query = TransactionQuery::new(wallet_id);
    query.sort_by = SortField::Amount;
    query.order = SortOrder::Asc;
    query.limit = 3;
    let first = fetch_page(processor.store(), query.clone()).unwrap();

    assert_eq!(first.transactions.len(), 3);
    assert!(first.has_more);
    let next = first.next_cursor.expect("more pages must carry a cursor");

    query.cursor = Some(Cursor::decode(&next).unwrap());
    let second = fetch_page(processor.store(), query).unwrap();
    assert_eq!(second.transactions.len(), 3);
    assert!(!second.has_more);
    assert!(second.next_cursor.is_none());

    // The two pages together cover all six rows in amount order.
    let all: Vec<_> = first
        .transactions
        .iter()
        .chain(second.transactions.iter())
        .collect();
    let distinct: HashSet<_> = all.iter().map(|tx| tx.id).collect();
    assert_eq!(distinct.len(), 6);
    for pair in all.windows(2) {
        assert!((pair[0].amount, pair[0].id) <= (pair[1].amount, pair[1].id));
    }
}

#[test]
fn cursor_bound_to_another_sort_field_is_rejected() {
    let (processor, wallet_id) = seeded_wallet(3);

    let page = fetch_page(processor.store(), {
        let mut query = TransactionQuery::new(wallet_id);
        query.limit = 1;
        query
    })
    .unwrap();
    let created_at_cursor = page.next_cursor.unwrap();

    let mut query = TransactionQuery::new(wallet_id);
    query.sort_by = SortField::Amount;
    query.cursor = Some(Cursor::decode(&created_at_cursor).unwrap());
    assert_eq!(
        fetch_page(processor.store(), query),
        Err(LedgerError::InvalidCursor)
    );
}

#[test]
fn empty_wallet_yields_an_empty_page() {
    let (processor, wallet_id) = seeded_wallet(0);

    let page = fetch_page(processor.store(), TransactionQuery::new(wallet_id)).unwrap();
    assert!(page.transactions.is_empty());
    assert!(!page.has_more);
    assert!(page.next_cursor.is_none());
}
