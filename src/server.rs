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

//! REST API surface for the wallet ledger.
//!
//! ## Endpoints
//!
//! - `POST /wallet/setup` - Create a wallet, optionally with an opening balance
//! - `GET /wallet/{id}` - Fetch a wallet
//! - `POST /transact/{walletId}` - Apply a signed-amount transaction
//! - `GET /transactions` - Paginated transaction history
//! - `GET /transactions/export/csv` - CSV export
//! - `GET /health` - Storage read+write probe
//!
//! Amounts travel as decimal strings in both directions. The idempotency key
//! is accepted as the `idempotencyKey` body field or the `X-Idempotency-Key`
//! header; the body field wins when both are present.
//!
//! ## Example Usage
//!
//! ```bash
//! # Create a wallet with an opening balance
//! curl -X POST http://localhost:3000/wallet/setup \
//!   -H "Content-Type: application/json" \
//!   -d '{"name": "Groceries", "balance": "100.50"}'
//!
//! # Debit it
//! curl -X POST http://localhost:3000/transact/<walletId> \
//!   -H "Content-Type: application/json" \
//!   -H "X-Idempotency-Key: k1" \
//!   -d '{"amount": "-30.25", "description": "veggies"}'
//!
//! # Page through history
//! curl "http://localhost:3000/transactions?walletId=<walletId>&limit=2"
//! ```

use crate::amount::Amount;
use crate::base::{TransactionId, WalletId};
use crate::error::LedgerError;
use crate::export::{self, EXPORT_LIMIT_MAX};
use crate::idempotency::IdempotencyKey;
use crate::processor::TransactionProcessor;
use crate::query::{self, Cursor, SortField, SortOrder, TransactionQuery};
use crate::store::{LedgerStore, MemoryStore};
use crate::transaction::{Transaction, TransactionKind};
use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;

// === Request/Response DTOs ===

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupWalletRequest {
    pub name: String,
    #[serde(default)]
    pub balance: Option<Amount>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SetupWalletResponse {
    pub id: WalletId,
    pub balance: Amount,
    pub name: String,
    pub date: DateTime<Utc>,
    /// Present only when the opening balance was positive.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transaction_id: Option<TransactionId>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WalletResponse {
    pub id: WalletId,
    pub balance: Amount,
    pub name: String,
    pub date: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactRequest {
    pub amount: Amount,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub idempotency_key: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactResponse {
    pub balance: Amount,
    pub transaction_id: TransactionId,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListTransactionsParams {
    pub wallet_id: WalletId,
    pub limit: Option<usize>,
    pub cursor: Option<String>,
    #[serde(rename = "type")]
    pub kind: Option<TransactionKind>,
    pub sort_by: Option<SortField>,
    pub sort_order: Option<SortOrder>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaginationInfo {
    pub has_more: bool,
    pub next_cursor: Option<String>,
    pub limit: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ListTransactionsResponse {
    pub transactions: Vec<Transaction>,
    pub pagination: PaginationInfo,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportParams {
    pub wallet_id: WalletId,
    pub limit: Option<usize>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DatabaseHealth {
    pub status: String,
    pub latency_ms: u64,
    pub wallets: usize,
    pub transactions: usize,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub database: DatabaseHealth,
}

// === Application State ===

/// Shared application state wrapping the transaction processor.
#[derive(Clone)]
pub struct AppState {
    pub processor: TransactionProcessor<MemoryStore>,
}

// === Error Handling ===

/// Wrapper mapping [`LedgerError`] kinds to HTTP responses at the boundary.
pub struct ApiError(LedgerError);

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self.0 {
            LedgerError::Validation(_) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR"),
            LedgerError::InvalidAmount => (StatusCode::BAD_REQUEST, "INVALID_AMOUNT"),
            LedgerError::InvalidCursor => (StatusCode::BAD_REQUEST, "INVALID_CURSOR"),
            LedgerError::WalletNotFound => (StatusCode::NOT_FOUND, "WALLET_NOT_FOUND"),
            LedgerError::InsufficientBalance { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "INSUFFICIENT_BALANCE")
            }
            LedgerError::BalanceConflict => (StatusCode::CONFLICT, "BALANCE_CONFLICT"),
            LedgerError::RequestInFlight => (StatusCode::CONFLICT, "REQUEST_IN_FLIGHT"),
            LedgerError::StorageUnavailable(_) => {
                (StatusCode::SERVICE_UNAVAILABLE, "STORAGE_UNAVAILABLE")
            }
            LedgerError::Internal(_) => (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR"),
        };

        // Internal details are logged with context, never shown to clients.
        let message = match &self.0 {
            LedgerError::Internal(detail) => {
                tracing::error!(detail, "internal error");
                "internal server error".to_string()
            }
            other => other.to_string(),
        };

        let mut body = json!({
            "error": message,
            "code": code,
        });
        if let LedgerError::InsufficientBalance { balance, requested } = &self.0 {
            body["balance"] = json!(balance);
            body["requested"] = json!(requested);
        }

        (status, Json(body)).into_response()
    }
}

// === Handlers ===

/// POST /wallet/setup - Create a wallet, optionally with an opening credit.
async fn setup_wallet(
    State(state): State<AppState>,
    Json(request): Json<SetupWalletRequest>,
) -> Result<(StatusCode, Json<SetupWalletResponse>), ApiError> {
    let balance = request.balance.unwrap_or(Amount::ZERO);
    let (wallet, opening) = state.processor.setup_wallet(&request.name, balance)?;

    Ok((
        StatusCode::CREATED,
        Json(SetupWalletResponse {
            id: wallet.id,
            balance: wallet.balance,
            name: wallet.name,
            date: wallet.created_at,
            transaction_id: opening.map(|tx| tx.id),
        }),
    ))
}

/// GET /wallet/{id} - Fetch a wallet by id.
async fn get_wallet(
    State(state): State<AppState>,
    Path(id): Path<WalletId>,
) -> Result<Json<WalletResponse>, ApiError> {
    let wallet = state.processor.store().get_wallet(id)?;
    Ok(Json(WalletResponse {
        id: wallet.id,
        balance: wallet.balance,
        name: wallet.name,
        date: wallet.created_at,
    }))
}

/// POST /transact/{walletId} - Apply a signed-amount transaction.
///
/// The sign of `amount` selects CREDIT or DEBIT. The idempotency key may
/// arrive in the body or the `X-Idempotency-Key` header; body wins.
async fn transact(
    State(state): State<AppState>,
    Path(wallet_id): Path<WalletId>,
    headers: HeaderMap,
    Json(request): Json<TransactRequest>,
) -> Result<Json<TransactResponse>, ApiError> {
    let raw_key = request.idempotency_key.or_else(|| {
        headers
            .get("x-idempotency-key")
            .and_then(|value| value.to_str().ok())
            .map(str::to_string)
    });
    let key = raw_key.map(IdempotencyKey::new).transpose()?;

    let tx = state
        .processor
        .process(wallet_id, request.amount, request.description, key)?;

    Ok(Json(TransactResponse {
        balance: tx.balance,
        transaction_id: tx.id,
    }))
}

/// GET /transactions - Cursor-paginated transaction history.
async fn list_transactions(
    State(state): State<AppState>,
    Query(params): Query<ListTransactionsParams>,
) -> Result<Json<ListTransactionsResponse>, ApiError> {
    let mut q = TransactionQuery::new(params.wallet_id);
    q.kind = params.kind;
    if let Some(limit) = params.limit {
        q.limit = limit;
    }
    if let Some(sort_by) = params.sort_by {
        q.sort_by = sort_by;
    }
    if let Some(order) = params.sort_order {
        q.order = order;
    }
    q.cursor = params.cursor.as_deref().map(Cursor::decode).transpose()?;

    let page = query::fetch_page(state.processor.store(), q)?;
    Ok(Json(ListTransactionsResponse {
        transactions: page.transactions,
        pagination: PaginationInfo {
            has_more: page.has_more,
            next_cursor: page.next_cursor,
            limit: page.limit,
        },
    }))
}

/// GET /transactions/export/csv - Bounded CSV export, newest first.
async fn export_csv(
    State(state): State<AppState>,
    Query(params): Query<ExportParams>,
) -> Result<Response, ApiError> {
    let mut q = TransactionQuery::new(params.wallet_id);
    q.limit = params
        .limit
        .unwrap_or(EXPORT_LIMIT_MAX)
        .clamp(1, EXPORT_LIMIT_MAX);

    let rows = state.processor.store().transactions(&q, q.limit)?;

    let mut buf = Vec::new();
    export::write_csv(&rows, &mut buf)
        .map_err(|err| LedgerError::Internal(format!("csv render failed: {err}")))?;

    Ok((
        [
            (header::CONTENT_TYPE, "text/csv"),
            (
                header::CONTENT_DISPOSITION,
                "attachment; filename=\"transactions.csv\"",
            ),
        ],
        buf,
    )
        .into_response())
}

/// GET /health - Probe storage read+write capability.
async fn health(State(state): State<AppState>) -> Result<Json<HealthResponse>, ApiError> {
    let probe = state.processor.store().health()?;
    Ok(Json(HealthResponse {
        status: "ok".into(),
        database: DatabaseHealth {
            status: "up".into(),
            latency_ms: probe.latency_ms,
            wallets: probe.wallets,
            transactions: probe.transactions,
        },
    }))
}

// === Router ===

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/wallet/setup", post(setup_wallet))
        .route("/wallet/{id}", get(get_wallet))
        .route("/transact/{wallet_id}", post(transact))
        .route("/transactions", get(list_transactions))
        .route("/transactions/export/csv", get(export_csv))
        .route("/health", get(health))
        .with_state(state)
}
