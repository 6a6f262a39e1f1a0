//! Health check handler

use axum::extract::State;
use serde::{Deserialize, Serialize};

use crate::{ApiError, ApiResponse, AppState, Payload, Revision};

/// Health check response
#[derive(Debug, Serialize, Deserialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub timestamp: String,
}

impl Revision for HealthStatus {}

/// GET /_admin/health
pub async fn health_check(State(state): State<AppState>) -> Result<ApiResponse<HealthStatus>, ApiError> {
    state
        .module
        .health_check()
        .await
        .map_err(|e| ApiError::Unavailable(format!("Graph module unhealthy: {}", e)))?;

    let health = HealthStatus {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now().to_rfc3339(),
    };
    Ok(ApiResponse::ok(Payload::Health(health)))
}
