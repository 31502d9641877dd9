//! URL validation for the shorten endpoint.
//!
//! Urls are stored byte-for-byte as submitted, so two spellings of the same
//! address get two ids. Validation only rejects what cannot be redirected to.

use url::Url;

use crate::domain::entities::MAX_URL_LENGTH;

/// Reasons a submitted url is rejected.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum UrlValidationError {
    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),

    #[error("Only HTTP and HTTPS protocols are allowed")]
    UnsupportedProtocol,

    #[error("URL has no host")]
    MissingHost,

    #[error("URL is longer than {} bytes", MAX_URL_LENGTH)]
    TooLong,
}

/// Checks that `input` is an absolute http(s) url with a host.
///
/// Rejects `javascript:`, `data:`, `file:` and other schemes a browser should
/// never be redirected to.
///
/// # Errors
///
/// Returns [`UrlValidationError::InvalidFormat`] for unparsable input,
/// [`UrlValidationError::UnsupportedProtocol`] for non-HTTP(S) schemes,
/// [`UrlValidationError::MissingHost`] when no host is present and
/// [`UrlValidationError::TooLong`] above [`MAX_URL_LENGTH`] bytes.
pub fn validate_url(input: &str) -> Result<(), UrlValidationError> {
    if input.len() > MAX_URL_LENGTH {
        return Err(UrlValidationError::TooLong);
    }

    // The url crate silently drops tabs and newlines; the stored string must
    // still be usable as a Location header.
    if input.chars().any(char::is_control) {
        return Err(UrlValidationError::InvalidFormat(
            "control characters are not allowed".to_string(),
        ));
    }

    let url = Url::parse(input).map_err(|e| UrlValidationError::InvalidFormat(e.to_string()))?;

    match url.scheme() {
        "http" | "https" => {}
        _ => return Err(UrlValidationError::UnsupportedProtocol),
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(()),
        _ => Err(UrlValidationError::MissingHost),
    }
}
