//! HTTP server for the Cigar API.
//!
//! # Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | `GET`  | `/` | Liveness text, independent of the store |
//! | `GET`  | `/api/v1/cigars/lines` | Every cigar line |
//! | `GET`  | `/api/v1/cigars/brands/{brandName}/lines` | Cigar lines of one brand (exact match) |
//! | `POST` | `/api/v1/cigars/lines/batch` | Upsert an array of cigar lines |
//!
//! # Error Contract
//!
//! Every error response is JSON with a single `message` field:
//!
//! ```json
//! { "message": "store unavailable: connection refused" }
//! ```
//!
//! Store failures on the list endpoints are `500`. A batch body that is not a
//! JSON array is `400` and never reaches the store. Failures of individual
//! batch items are reported inside the `200` result array instead.
//!
//! # CORS
//!
//! All origins, methods, and headers are permitted.

use anyhow::{Context, Result};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{debug, error, info};

use cigar_api_core::batch::{upsert_batch, BatchItemResult, NOT_AN_ARRAY_MESSAGE};
use cigar_api_core::models::CigarLine;
use cigar_api_core::store::unavailable::UnavailableStore;
use cigar_api_core::store::{Store, StoreError};

use crate::config::Config;
use crate::db;
use crate::sqlite_store::SqliteStore;

/// Prefix shared by all API routes.
pub const API_BASE: &str = "/api/v1/cigars";

/// Body of `GET /`.
pub const ROOT_MESSAGE: &str = "Cigar API is running!";

/// Shared application state passed to all route handlers via Axum's `State` extractor.
#[derive(Clone)]
struct AppState {
    store: Arc<dyn Store>,
}

/// Builds the application router around an injected store.
pub fn router(store: Arc<dyn Store>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let api = Router::new()
        .route("/lines", get(handle_list_lines))
        .route("/brands/{brand_name}/lines", get(handle_list_brand_lines))
        .route("/lines/batch", post(handle_batch_upsert));

    Router::new()
        .route("/", get(handle_root))
        .nest(API_BASE, api)
        .fallback(handle_not_found)
        .layer(cors)
        .with_state(AppState { store })
}

/// Opens the configured database. A failure is logged and yields an
/// [`UnavailableStore`] so the server can still come up.
pub async fn connect_store(config: &Config) -> Arc<dyn Store> {
    match db::connect(config).await {
        Ok(pool) => {
            info!("Connected to database");
            Arc::new(SqliteStore::new(pool))
        }
        Err(err) => {
            let store = UnavailableStore::new(format!("{:#}", err));
            error!(
                error = %store.reason(),
                "Could not connect to database; store requests will fail"
            );
            Arc::new(store)
        }
    }
}

/// Starts the server on `[server].bind` with the configured store.
///
/// Runs until Ctrl+C or SIGTERM.
pub async fn run_server(config: &Config) -> Result<()> {
    let store = connect_store(config).await;
    run_server_with_store(config, store).await
}

/// Like [`run_server`], but with a caller-supplied store.
pub async fn run_server_with_store(config: &Config, store: Arc<dyn Store>) -> Result<()> {
    let listener = TcpListener::bind(&config.server.bind)
        .await
        .with_context(|| format!("Failed to bind {}", config.server.bind))?;
    serve(listener, store).await
}

/// Serves the API on an already-bound listener.
pub async fn serve(listener: TcpListener, store: Arc<dyn Store>) -> Result<()> {
    let addr = listener.local_addr()?;
    info!("Cigar API listening at http://{}", addr);

    axum::serve(listener, router(store))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            error!(error = %err, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(err) => {
                error!(error = %err, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}

// ============ Error response ============

/// JSON error response body.
#[derive(Serialize)]
struct ErrorBody {
    message: String,
}

/// Internal error type that converts into an Axum HTTP response.
struct AppError {
    status: StatusCode,
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            message: self.message,
        };
        (self.status, Json(body)).into_response()
    }
}

fn bad_request(message: impl Into<String>) -> AppError {
    AppError {
        status: StatusCode::BAD_REQUEST,
        message: message.into(),
    }
}

fn store_failure(operation: &str, err: StoreError) -> AppError {
    error!(operation, error = %err, "store operation failed");
    AppError {
        status: StatusCode::INTERNAL_SERVER_ERROR,
        message: err.to_string(),
    }
}

// ============ GET / ============

async fn handle_root() -> &'static str {
    ROOT_MESSAGE
}

// ============ GET /api/v1/cigars/lines ============

async fn handle_list_lines(
    State(state): State<AppState>,
) -> Result<Json<Vec<CigarLine>>, AppError> {
    let lines = state
        .store
        .list_all()
        .await
        .map_err(|e| store_failure("list_all", e))?;

    debug!(count = lines.len(), "listed cigar lines");
    Ok(Json(lines))
}

// ============ GET /api/v1/cigars/brands/{brandName}/lines ============

async fn handle_list_brand_lines(
    State(state): State<AppState>,
    Path(brand_name): Path<String>,
) -> Result<Json<Vec<CigarLine>>, AppError> {
    let lines = state
        .store
        .list_by_brand(&brand_name)
        .await
        .map_err(|e| store_failure("list_by_brand", e))?;

    debug!(brand = %brand_name, count = lines.len(), "listed cigar lines for brand");
    Ok(Json(lines))
}

// ============ POST /api/v1/cigars/lines/batch ============

/// Handler for `POST /api/v1/cigars/lines/batch`.
///
/// Only the outer shape is checked here: anything but a JSON array (including
/// a body that is not JSON at all) is rejected with `400` before the store is
/// touched. Each element then goes through [`upsert_batch`], which reports
/// per-item success or failure in input order.
async fn handle_batch_upsert(
    State(state): State<AppState>,
    payload: Result<Json<Value>, JsonRejection>,
) -> Result<Json<Vec<BatchItemResult>>, AppError> {
    let items = match payload {
        Ok(Json(Value::Array(items))) => items,
        Ok(_) | Err(JsonRejection::MissingJsonContentType(_)) => {
            return Err(bad_request(NOT_AN_ARRAY_MESSAGE));
        }
        Err(rejection) => {
            debug!(error = %rejection, "rejected batch body");
            return Err(bad_request(rejection.body_text()));
        }
    };

    let results = upsert_batch(state.store.as_ref(), &items).await;
    Ok(Json(results))
}

// ============ Fallback ============

async fn handle_not_found(method: Method, uri: Uri) -> AppError {
    AppError {
        status: StatusCode::NOT_FOUND,
        message: format!("Cannot {} {}", method, uri.path()),
    }
}
