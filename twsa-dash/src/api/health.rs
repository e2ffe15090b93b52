//! Health check endpoint

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;
use tracing::warn;

use crate::AppState;

/// Health check response
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when the record store cannot be read
    pub status: String,
    pub module: String,
    pub version: String,
    /// Stored record count; absent when the store failed
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records: Option<usize>,
}

/// GET /health
///
/// Answers 503 with status `degraded` while the record store is unreachable.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let (status, code, records) = match state.store.count().await {
        Ok(count) => ("ok", StatusCode::OK, Some(count)),
        Err(e) => {
            warn!("Health check: record store unavailable: {}", e);
            ("degraded", StatusCode::SERVICE_UNAVAILABLE, None)
        }
    };

    (
        code,
        Json(HealthResponse {
            status: status.to_string(),
            module: "twsa-dash".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            records,
        }),
    )
}

/// Build health check routes
pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
