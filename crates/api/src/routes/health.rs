//! Health check endpoint.

use axum::Json;
use serde::Serialize;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
}

/// GET /manage/health and GET /health — the gateway is up.
///
/// Backends are not probed; their state shows in the circuit breaker metrics.
pub async fn check() -> Json<HealthResponse> {
    Json(HealthResponse { status: "ok" })
}
