//! API route configuration.

use crate::api::handlers::{health_handler, missing_token_handler, redirect_handler, shorten_handler};
use crate::state::AppState;
use axum::{
    Router,
    routing::{get, post},
};

/// All public routes.
///
/// # Endpoints
///
/// - `POST /s`        - Shorten a URL
/// - `GET  /health`   - Gateway and storage health
/// - `GET  /{token}`  - Redirect to the original URL
/// - `GET  /`         - 400, no token given
///
/// Tokens never contain `h` or `s` (both are codec separators), so the
/// literal routes cannot shadow a token.
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/s", post(shorten_handler))
        .route("/health", get(health_handler))
        .route("/", get(missing_token_handler))
        .route("/{token}", get(redirect_handler))
}
