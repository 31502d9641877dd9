//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use serde_json::json;
use tracing::{debug, info, warn};

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a token to its original URL.
///
/// # Endpoint
///
/// `GET /{token}`
///
/// # Request Flow
///
/// 1. Reverse the token into an id (no storage access)
/// 2. Look the id up through the gateway
/// 3. Return 302 Found with the stored URL as `Location`
///
/// # Errors
///
/// - 400 Bad Request if the token is blank
/// - 404 Not Found if the token is not valid for this salt or no link has its id
/// - 503 Service Unavailable if storage is unreachable or too slow
pub async fn redirect_handler(
    Path(token): Path<String>,
    State(state): State<AppState>,
) -> Result<impl IntoResponse, AppError> {
    if token.trim().is_empty() {
        return Err(missing_token());
    }

    info!(token = %token, "redirect request");

    let Some(id) = state.codec.reverse(&token) else {
        warn!(token = %token, "token does not decode");
        return Err(AppError::not_found(
            "Short link not found",
            json!({ "token": token }),
        ));
    };

    let reply = state.gateway.find_by_id(id).await?;
    debug!(token = %token, id, url = %reply.url, "redirecting");

    Ok((StatusCode::FOUND, [(header::LOCATION, reply.url)]))
}

/// `GET /` carries no token at all.
pub async fn missing_token_handler() -> AppError {
    missing_token()
}

fn missing_token() -> AppError {
    AppError::bad_request("Missing token", json!({}))
}
