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

//! Benchmarks for the transaction processor.
//!
//! Run with: cargo bench
//!
//! Benchmarks include:
//! - Single-threaded credit processing
//! - Contended updates against a single wallet
//! - Idempotent replay of a cached result
//! - Paginated reads over a populated log

use criterion::{BenchmarkId, Criterion, Throughput, black_box, criterion_group, criterion_main};
use rust_decimal::Decimal;
use std::sync::Arc;
use std::thread;
use wallet_ledger_rs::{
    Amount, IdempotencyKey, IdempotencyStore, LedgerError, MemoryStore, TransactionProcessor,
    TransactionQuery, fetch_page,
};

// =============================================================================
// Helper Functions
// =============================================================================

fn make_processor() -> TransactionProcessor<MemoryStore> {
    TransactionProcessor::new(Arc::new(MemoryStore::new()), Arc::new(IdempotencyStore::new()))
}

fn amount(ticks: i64) -> Amount {
    Amount::new(Decimal::new(ticks, 4)).unwrap()
}

// =============================================================================
// Single-Threaded Benchmarks
// =============================================================================

fn bench_single_credit(c: &mut Criterion) {
    c.bench_function("single_credit", |b| {
        let processor = make_processor();
        let (wallet, _) = processor.setup_wallet("bench", Amount::ZERO).unwrap();
        b.iter(|| {
            processor
                .process(wallet.id, black_box(amount(10_000)), None, None)
                .unwrap();
        })
    });
}

fn bench_credit_debit_pair(c: &mut Criterion) {
    c.bench_function("credit_debit_pair", |b| {
        let processor = make_processor();
        let (wallet, _) = processor.setup_wallet("bench", Amount::ZERO).unwrap();
        b.iter(|| {
            processor
                .process(wallet.id, amount(10_000), None, None)
                .unwrap();
            processor
                .process(wallet.id, amount(-10_000), None, None)
                .unwrap();
        })
    });
}

fn bench_idempotent_replay(c: &mut Criterion) {
    c.bench_function("idempotent_replay", |b| {
        let processor = make_processor();
        let (wallet, _) = processor.setup_wallet("bench", Amount::ZERO).unwrap();
        let key = IdempotencyKey::new("bench-key").unwrap();
        processor
            .process(wallet.id, amount(10_000), None, Some(key.clone()))
            .unwrap();
        b.iter(|| {
            processor
                .process(wallet.id, amount(10_000), None, Some(black_box(key.clone())))
                .unwrap();
        })
    });
}

// =============================================================================
// Contention Benchmarks
// =============================================================================

fn bench_contended_wallet(c: &mut Criterion) {
    let mut group = c.benchmark_group("contended_wallet");
    for threads in [2u32, 4, 8] {
        group.throughput(Throughput::Elements(u64::from(threads) * 100));
        group.bench_with_input(
            BenchmarkId::from_parameter(threads),
            &threads,
            |b, &threads| {
                b.iter(|| {
                    let processor = make_processor();
                    let (wallet, _) = processor.setup_wallet("bench", Amount::ZERO).unwrap();

                    let mut handles = Vec::new();
                    for _ in 0..threads {
                        let processor = processor.clone();
                        let wallet_id = wallet.id;
                        handles.push(thread::spawn(move || {
                            for _ in 0..100 {
                                loop {
                                    match processor.process(wallet_id, amount(10_000), None, None)
                                    {
                                        Ok(_) => break,
                                        Err(LedgerError::BalanceConflict) => continue,
                                        Err(err) => panic!("unexpected error: {err}"),
                                    }
                                }
                            }
                        }));
                    }
                    for handle in handles {
                        handle.join().unwrap();
                    }
                })
            },
        );
    }
    group.finish();
}

// =============================================================================
// Read-Path Benchmarks
// =============================================================================

fn bench_paginated_read(c: &mut Criterion) {
    c.bench_function("paginated_read_100_of_10k", |b| {
        let processor = make_processor();
        let (wallet, _) = processor.setup_wallet("bench", Amount::ZERO).unwrap();
        for _ in 0..10_000 {
            processor
                .process(wallet.id, amount(10_000), None, None)
                .unwrap();
        }

        b.iter(|| {
            let mut query = TransactionQuery::new(wallet.id);
            query.limit = 100;
            let page = fetch_page(processor.store(), black_box(query)).unwrap();
            assert_eq!(page.transactions.len(), 100);
        })
    });
}

criterion_group!(
    benches,
    bench_single_credit,
    bench_credit_debit_pair,
    bench_idempotent_replay,
    bench_contended_wallet,
    bench_paginated_read,
);
criterion_main!(benches);
