//! Health check handler

use utoipa::ToSchema;

use super::super::types::{ApiResult, ok};

/// Health check response data
#[derive(serde::Serialize, ToSchema)]
pub struct HealthResponse {
    /// Server timestamp in milliseconds
    #[schema(example = 1703494800000_u64)]
    pub timestamp_ms: u64,
}

/// Health check endpoint
#[utoipa::path(
    get,
    path = "/api/v1/health",
    responses(
        (status = 200, description = "Service healthy", body = HealthResponse)
    ),
    tag = "System"
)]
pub async fn health_check() -> ApiResult<HealthResponse> {
    ok(HealthResponse {
        timestamp_ms: chrono::Utc::now().timestamp_millis() as u64,
    })
}
