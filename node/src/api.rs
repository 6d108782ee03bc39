//! # REST API
//!
//! Builds the axum router for the node. All handlers share one [`Ledger`]
//! handle through axum's `State` extractor.
//!
//! ## Endpoints
//!
//! | Method | Path                 | Description                              |
//! |--------|----------------------|------------------------------------------|
//! | GET    | `/`                  | Full ledger, genesis first               |
//! | POST   | `/`                  | Append a checkout event                  |
//! | POST   | `/new`               | Register a book, returns its derived id  |
//! | GET    | `/blocks/:position`  | Block by position                        |
//! | GET    | `/verify`            | Full-chain integrity check               |
//! | GET    | `/health`            | Liveness probe                           |
//! | GET    | `/status`            | Node status summary                      |
//!
//! An append reports what actually happened: `201` with the committed block,
//! or a 4xx with the rejection reason. Nothing is dropped silently.

use axum::{
    extract::{Path, State},
    http::{Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use bookchain_ledger::{Block, Book, ChainViolation, CheckoutEvent, Ledger, LedgerError};

use crate::metrics::SharedMetrics;

// ---------------------------------------------------------------------------
// Application State
// ---------------------------------------------------------------------------

/// Shared application state available to all request handlers.
///
/// Cheap to clone: the ledger and metrics are both behind `Arc`.
#[derive(Clone)]
pub struct AppState {
    /// The node's reported version string.
    pub version: String,
    /// The ledger this node serves.
    pub ledger: Ledger,
    /// Prometheus metrics for in-handler recording.
    pub metrics: SharedMetrics,
}

// ---------------------------------------------------------------------------
// Router Construction
// ---------------------------------------------------------------------------

/// Builds the full axum [`Router`] with all API routes, CORS, and tracing.
pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers(Any);

    Router::new()
        .route("/", get(chain_handler).post(append_handler))
        .route("/new", post(new_book_handler))
        .route("/blocks/:position", get(block_by_position_handler))
        .route("/verify", get(verify_handler))
        .route("/health", get(health_handler))
        .route("/status", get(status_handler))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ---------------------------------------------------------------------------
// Response Types
// ---------------------------------------------------------------------------

/// Response payload for `GET /`.
#[derive(Debug, Serialize, Deserialize)]
pub struct ChainResponse {
    /// Every committed block, genesis first.
    pub blocks: Vec<Block>,
}

/// Response payload for `POST /new`.
#[derive(Debug, Serialize, Deserialize)]
pub struct BookResponse {
    /// The submitted book with its derived `id` filled in.
    pub book: Book,
}

/// Response payload for `GET /verify`.
#[derive(Debug, Serialize, Deserialize)]
pub struct VerifyResponse {
    /// Whether every invariant holds.
    pub valid: bool,
    /// Number of committed blocks at the time of the check.
    pub length: usize,
    /// First violation found, if any.
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub violation: Option<ChainViolation>,
}

/// Response payload for `GET /status`.
#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Node software version.
    pub version: String,
    /// Number of committed blocks.
    pub length: usize,
    /// Position of the tail block.
    pub height: u64,
    /// Hash of the tail block.
    pub tip_hash: String,
    /// RFC 3339 timestamp of the response.
    pub timestamp: String,
}

/// Error body for refused appends.
#[derive(Debug, Serialize, Deserialize)]
pub struct RejectionResponse {
    /// Human-readable description.
    pub error: String,
    /// Stable machine-readable tag, e.g. `linkage_mismatch`.
    pub reason: String,
}

/// Generic error body returned by REST endpoints on failure.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Human-readable description.
    pub error: String,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// `GET /` - the full ledger.
async fn chain_handler(State(state): State<AppState>) -> Json<ChainResponse> {
    Json(ChainResponse {
        blocks: state.ledger.snapshot(),
    })
}

/// `POST /` - append a checkout event.
///
/// The append runs under the ledger's write lock. It is CPU-bound and
/// short, so it runs inline on the request task.
async fn append_handler(
    State(state): State<AppState>,
    Json(event): Json<CheckoutEvent>,
) -> Response {
    let timer = state.metrics.append_latency_seconds.start_timer();
    let outcome = state.ledger.append(event);
    timer.observe_duration();

    match outcome {
        Ok(block) => {
            state.metrics.blocks_appended_total.inc();
            state.metrics.chain_length.set(block.position as i64 + 1);
            tracing::info!(position = block.position, hash = %block.hash, "checkout recorded");
            (StatusCode::CREATED, Json(block)).into_response()
        }
        Err(e) => {
            state.metrics.record_rejection(e.reason());
            rejection_response(&e)
        }
    }
}

/// Map a refused append to an HTTP response.
///
/// A bad payload is the caller's fault (`422`). Linkage, hash and position
/// failures mean the candidate lost against the current tail (`409`).
fn rejection_response(e: &LedgerError) -> Response {
    let status = match e {
        LedgerError::MalformedPayload(_) => StatusCode::UNPROCESSABLE_ENTITY,
        LedgerError::LinkageMismatch { .. }
        | LedgerError::HashMismatch { .. }
        | LedgerError::PositionGap { .. } => StatusCode::CONFLICT,
    };
    let body = RejectionResponse {
        error: e.to_string(),
        reason: e.reason().to_string(),
    };
    (status, Json(body)).into_response()
}

/// `POST /new` - register a book and return it with its derived id.
async fn new_book_handler(Json(book): Json<Book>) -> Json<BookResponse> {
    let book = book.with_derived_id();
    tracing::debug!(id = %book.id, isbn = %book.isbn, "book registered");
    Json(BookResponse { book })
}

/// `GET /blocks/:position` - one block, or `404`.
async fn block_by_position_handler(
    Path(position): Path<u64>,
    State(state): State<AppState>,
) -> Response {
    match state.ledger.get(position) {
        Some(block) => (StatusCode::OK, Json(block)).into_response(),
        None => {
            let err = ErrorResponse {
                error: format!("Block not found at position {}", position),
            };
            (StatusCode::NOT_FOUND, Json(err)).into_response()
        }
    }
}

/// `GET /verify` - walk the chain and report the first violation.
async fn verify_handler(State(state): State<AppState>) -> Json<VerifyResponse> {
    let (length, result) = state.ledger.with_chain(|c| (c.len(), c.verify()));
    let violation = result.err();
    if let Some(v) = &violation {
        tracing::error!(index = v.index, position = v.position, kind = ?v.kind, "chain verification failed");
    }
    Json(VerifyResponse {
        valid: violation.is_none(),
        length,
        violation,
    })
}

/// `GET /health` - returns 200 if the node is alive.
async fn health_handler() -> impl IntoResponse {
    (StatusCode::OK, Json(serde_json::json!({ "status": "ok" })))
}

/// `GET /status` - node status summary.
async fn status_handler(State(state): State<AppState>) -> Json<StatusResponse> {
    let (length, tip) = state.ledger.with_chain(|c| (c.len(), c.tip().clone()));
    Json(StatusResponse {
        version: state.version.clone(),
        length,
        height: tip.position,
        tip_hash: tip.hash,
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
