//! Health probe and the method-level responses shared by the RPC endpoints.

use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use std::sync::Arc;

use super::types::HealthPayload;
use super::{ApiError, ApiResponse, AppState};

/// `GET /api/health`
///
/// Reports 503 when the database does not answer.
pub async fn health(State(state): State<Arc<AppState>>) -> Response {
    let db_ready = match state.store().ping().await {
        Ok(()) => true,
        Err(e) => {
            tracing::warn!(error = %e, "Health check: database unreachable");
            false
        }
    };

    let status = if db_ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let mut body = ApiResponse::success(HealthPayload {
        status: if db_ready { "ok" } else { "degraded" },
        database: if db_ready { "up" } else { "down" },
        uptime_seconds: state.start_time.elapsed().as_secs(),
        version: env!("CARGO_PKG_VERSION"),
    });
    body.success = db_ready;

    (status, Json(body)).into_response()
}

/// Plain `OPTIONS` without CORS request headers. Real preflights are answered
/// by the CORS layer before reaching this.
pub async fn preflight() -> StatusCode {
    StatusCode::OK
}

pub async fn method_not_allowed() -> ApiError {
    ApiError::MethodNotAllowed
}
