//! Health check handlers
//!
//! - `/health` answers without touching any dependency (liveness)
//! - `/ready` round-trips to the record store (readiness)

use axum::extract::State;
use axum::Json;
use serde::Serialize;
use tracing::warn;

use crate::api::error::{ApiError, ErrorCode};
use crate::server::AppState;

/// Response for the basic health check endpoint
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// Always `healthy` when the process can answer
    pub status: &'static str,
    /// Service name
    pub service: &'static str,
    /// Service version
    pub version: &'static str,
    /// Timestamp of health check
    pub timestamp: String,
}

/// Response for the readiness endpoint
#[derive(Debug, Serialize)]
pub struct ReadinessResponse {
    pub status: &'static str,
    pub database: DatabaseStatus,
}

#[derive(Debug, Serialize)]
pub struct DatabaseStatus {
    pub connected: bool,
    pub response_time_ms: u64,
}

/// Basic health check endpoint.
///
/// Use this for liveness probes.
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        service: "event-registration",
        version: env!("CARGO_PKG_VERSION"),
        timestamp: chrono::Utc::now().to_rfc3339(),
    })
}

/// Readiness check endpoint.
///
/// Checks record store connectivity. Use this for readiness probes.
pub async fn readiness_check(
    State(state): State<AppState>,
) -> Result<Json<ReadinessResponse>, ApiError> {
    let start = std::time::Instant::now();
    match state.registrations.ping().await {
        Ok(()) => Ok(Json(ReadinessResponse {
            status: "ready",
            database: DatabaseStatus {
                connected: true,
                response_time_ms: start.elapsed().as_millis() as u64,
            },
        })),
        Err(e) => {
            warn!(error = %e, "Readiness check failed");
            Err(ApiError::new(
                ErrorCode::ServiceUnavailable,
                "Database unavailable",
            ))
        }
    }
}
