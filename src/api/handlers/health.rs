//! Handler for health check endpoint.

use axum::{Json, extract::State, http::StatusCode};

use crate::api::dto::health::{CheckStatus, HealthChecks, HealthResponse};
use crate::messaging::{FailureCode, SendError};
use crate::state::AppState;

/// Returns service health status with component checks.
///
/// # Endpoint
///
/// `GET /health`
///
/// # Response Codes
///
/// - **200 OK**: All components healthy
/// - **503 Service Unavailable**: One or more components degraded
///
/// # Components Checked
///
/// 1. **Gateway**: consumer loop still receiving
/// 2. **Storage**: a lookup of id 0 (never assigned) completes, as a hit or
///    a not-found
pub async fn health_handler(
    State(state): State<AppState>,
) -> Result<Json<HealthResponse>, (StatusCode, Json<HealthResponse>)> {
    let gateway_check = check_gateway(&state);
    let storage_check = check_storage(&state).await;

    let all_healthy = gateway_check.is_ok() && storage_check.is_ok();

    let response = HealthResponse {
        status: if all_healthy { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        checks: HealthChecks {
            gateway: gateway_check,
            storage: storage_check,
        },
    };

    if all_healthy {
        Ok(Json(response))
    } else {
        Err((StatusCode::SERVICE_UNAVAILABLE, Json(response)))
    }
}

fn check_gateway(state: &AppState) -> CheckStatus {
    if state.gateway.is_closed() {
        CheckStatus::error("Gateway is not running")
    } else {
        CheckStatus::ok(format!(
            "Request timeout: {}ms",
            state.gateway.request_timeout().as_millis()
        ))
    }
}

async fn check_storage(state: &AppState) -> CheckStatus {
    match state.gateway.find_by_id(0).await {
        Ok(_) => CheckStatus::ok("Reachable"),
        Err(SendError::Failed(failure)) if failure.code == FailureCode::NotFound => {
            CheckStatus::ok("Reachable")
        }
        Err(e) => CheckStatus::error(format!("Storage error: {e}")),
    }
}
