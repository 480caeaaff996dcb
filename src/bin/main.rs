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

use std::net::SocketAddr;
use std::process;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use wallet_ledger_rs::idempotency::IdempotencyStore;
use wallet_ledger_rs::processor::TransactionProcessor;
use wallet_ledger_rs::server::{AppState, create_router};
use wallet_ledger_rs::store::MemoryStore;

/// In-memory wallet ledger HTTP service.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Address to listen on.
    #[arg(long, default_value = "127.0.0.1:3000")]
    bind: SocketAddr,

    /// Hours before a completed idempotency record may be claimed again.
    #[arg(long, default_value_t = 24)]
    idempotency_ttl_hours: i64,

    /// Seconds between sweeps of expired idempotency records.
    #[arg(long, default_value_t = 3600)]
    purge_interval_secs: u64,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let store = Arc::new(MemoryStore::new());
    let idempotency = Arc::new(IdempotencyStore::with_ttl(chrono::Duration::hours(
        args.idempotency_ttl_hours,
    )));
    let processor = TransactionProcessor::new(store, Arc::clone(&idempotency));

    // Background sweep so abandoned idempotency records do not pile up.
    let purge_interval = Duration::from_secs(args.purge_interval_secs);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(purge_interval);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let purged = idempotency.purge_expired();
            if purged > 0 {
                tracing::info!(purged, "purged expired idempotency records");
            }
        }
    });

    let app = create_router(AppState { processor });

    let listener = match tokio::net::TcpListener::bind(args.bind).await {
        Ok(listener) => listener,
        Err(err) => {
            eprintln!("failed to bind {}: {err}", args.bind);
            process::exit(1);
        }
    };

    tracing::info!(addr = %args.bind, "wallet ledger listening");
    if let Err(err) = axum::serve(listener, app).await {
        eprintln!("server error: {err}");
        process::exit(1);
    }
}
