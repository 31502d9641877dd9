//! DTOs for link shortening endpoint.

use serde::{Deserialize, Serialize};
use validator::Validate;

/// Request to shorten a single URL.
#[derive(Debug, Deserialize, Validate)]
pub struct ShortenRequest {
    /// The original URL to shorten (must be valid HTTP/HTTPS).
    #[validate(length(min = 1, max = 2048))]
    #[validate(url(message = "Invalid URL format"))]
    pub url: String,
}

/// The stored URL and its shortened form.
#[derive(Debug, Serialize, Deserialize)]
pub struct ShortenResponse {
    pub original: String,
    pub shortened: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::MAX_URL_LENGTH;

    #[test]
    fn test_request_validation() {
        let ok = ShortenRequest {
            url: "https://example.com/page".to_string(),
        };
        assert!(ok.validate().is_ok());

        let long = format!("https://example.com/{}", "a".repeat(MAX_URL_LENGTH));

        for url in ["", "not a url", long.as_str()] {
            let bad = ShortenRequest {
                url: url.to_string(),
            };
            assert!(bad.validate().is_err(), "{url}");
        }
    }
}
