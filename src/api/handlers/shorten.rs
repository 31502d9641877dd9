//! Handler for link shortening endpoint.

use axum::{Json, extract::State};
use tracing::{debug, info};
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::error::AppError;
use crate::state::AppState;
use crate::utils::url_validator::validate_url;

/// Creates (or returns the existing) shortened URL for a long URL.
///
/// # Endpoint
///
/// `POST /s`
///
/// # Request Body
///
/// ```json
/// { "url": "https://example.com/some/long/path" }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "original": "https://example.com/some/long/path",
///   "shortened": "http://localhost:3000/kK"
/// }
/// ```
///
/// Submitting the same URL again returns the same shortened link.
///
/// # Errors
///
/// - 400 Bad Request if the URL is malformed or not HTTP/HTTPS
/// - 503 Service Unavailable if storage is unreachable or too slow
/// - 500 Internal Server Error on storage faults
pub async fn shorten_handler(
    State(state): State<AppState>,
    Json(payload): Json<ShortenRequest>,
) -> Result<Json<ShortenResponse>, AppError> {
    payload.validate()?;
    validate_url(&payload.url)?;

    info!(url = %payload.url, "shorten request");

    let reply = state.gateway.find_or_create(&payload.url).await?;
    let token = state.codec.generate(reply.id);

    debug!(url = %reply.url, id = reply.id, token = %token, created = ?reply.created, "url shortened");

    Ok(Json(ShortenResponse {
        shortened: state.short_url(&token),
        original: reply.url,
    }))
}
