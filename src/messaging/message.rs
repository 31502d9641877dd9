//! Request, reply and failure types exchanged with the gateway.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;
use tokio::sync::oneshot;

use crate::domain::entities::{LinkOutcome, MAX_URL_LENGTH, ShortLink};
use crate::error::StoreError;

/// The two request kinds the gateway answers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Address {
    /// `{ "id": integer }` -> `{ id, url }`
    FindById,
    /// `{ "url": string }` -> `{ id, url, created }`
    FindOrCreate,
}

impl Address {
    pub fn as_str(&self) -> &'static str {
        match self {
            Address::FindById => "shortlink.find_by_id",
            Address::FindOrCreate => "shortlink.find_or_create",
        }
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Address {
    type Err = Failure;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shortlink.find_by_id" => Ok(Address::FindById),
            "shortlink.find_or_create" => Ok(Address::FindOrCreate),
            other => Err(Failure::invalid_request(format!("unknown address '{other}'"))),
        }
    }
}

/// Typed failure codes carried by [`Failure`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum FailureCode {
    /// Backend down or pool exhausted. Safe to retry.
    ResourceUnavailable = 1,
    /// Missing or malformed payload field.
    InvalidRequest = 2,
    /// Unexpected store fault.
    Internal = 3,
    /// No ShortLink with the requested id.
    NotFound = 4,
}

impl FailureCode {
    pub fn as_u8(self) -> u8 {
        self as u8
    }
}

/// A failed reply: a code plus a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("failure {}: {message}", .code.as_u8())]
pub struct Failure {
    pub code: FailureCode,
    pub message: String,
}

impl Failure {
    pub fn new(code: FailureCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(FailureCode::ResourceUnavailable, message)
    }

    pub fn invalid_request(message: impl Into<String>) -> Self {
        Self::new(FailureCode::InvalidRequest, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(FailureCode::Internal, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(FailureCode::NotFound, message)
    }
}

impl From<StoreError> for Failure {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Unavailable(_) => Failure::unavailable("unavailable resources"),
            _ => Failure::internal("internal database error"),
        }
    }
}

/// Successful reply payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkReply {
    pub id: u64,
    pub url: String,
    /// Set for get-or-create replies only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub created: Option<bool>,
}

impl From<ShortLink> for LinkReply {
    fn from(link: ShortLink) -> Self {
        Self {
            id: link.id,
            url: link.url,
            created: None,
        }
    }
}

impl From<LinkOutcome> for LinkReply {
    fn from(outcome: LinkOutcome) -> Self {
        Self {
            id: outcome.link.id,
            url: outcome.link.url,
            created: Some(outcome.created),
        }
    }
}

/// Outcome delivered to the caller exactly once.
pub type ReplyResult = Result<LinkReply, Failure>;

/// A request in flight: where it goes, its payload, and the single-use reply
/// channel.
#[derive(Debug)]
pub struct Envelope {
    pub address: Address,
    pub body: Value,
    pub reply_to: oneshot::Sender<ReplyResult>,
}

/// A request whose payload passed shape validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Command {
    FindById(u64),
    FindOrCreate(String),
}

impl Command {
    /// Validates `body` for `address`.
    ///
    /// # Errors
    ///
    /// Returns a [`FailureCode::InvalidRequest`] failure when the required
    /// field is missing, has the wrong type, is negative, or is blank.
    pub(crate) fn parse(address: Address, body: &Value) -> Result<Self, Failure> {
        match address {
            Address::FindById => body
                .get("id")
                .and_then(Value::as_u64)
                .map(Command::FindById)
                .ok_or_else(|| Failure::invalid_request("invalid identifier")),
            Address::FindOrCreate => body
                .get("url")
                .and_then(Value::as_str)
                .filter(|url| !url.trim().is_empty() && url.len() <= MAX_URL_LENGTH)
                .map(|url| Command::FindOrCreate(url.to_string()))
                .ok_or_else(|| Failure::invalid_request("invalid url")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_failure_code_values() {
        assert_eq!(FailureCode::ResourceUnavailable.as_u8(), 1);
        assert_eq!(FailureCode::InvalidRequest.as_u8(), 2);
        assert_eq!(FailureCode::Internal.as_u8(), 3);
        assert_eq!(FailureCode::NotFound.as_u8(), 4);
    }

    #[test]
    fn test_address_names() {
        for address in [Address::FindById, Address::FindOrCreate] {
            assert_eq!(address.as_str().parse::<Address>(), Ok(address));
        }

        let failure = "shortlink.delete".parse::<Address>().unwrap_err();
        assert_eq!(failure.code, FailureCode::InvalidRequest);
    }

    #[test]
    fn test_parse_find_by_id() {
        assert_eq!(
            Command::parse(Address::FindById, &json!({ "id": 7 })),
            Ok(Command::FindById(7))
        );
    }

    #[test]
    fn test_parse_rejects_bad_ids() {
        for body in [
            json!({}),
            json!({ "id": null }),
            json!({ "id": "7" }),
            json!({ "id": -1 }),
            json!({ "id": 1.5 }),
            json!([7]),
        ] {
            let failure = Command::parse(Address::FindById, &body).unwrap_err();
            assert_eq!(failure.code, FailureCode::InvalidRequest, "body {body}");
        }
    }

    #[test]
    fn test_parse_find_or_create() {
        assert_eq!(
            Command::parse(Address::FindOrCreate, &json!({ "url": "http://a.example/x" })),
            Ok(Command::FindOrCreate("http://a.example/x".to_string()))
        );
    }

    #[test]
    fn test_parse_rejects_bad_urls() {
        for body in [
            json!({}),
            json!({ "url": 42 }),
            json!({ "url": "" }),
            json!({ "url": "   " }),
            json!({ "link": "http://a.example" }),
            json!({ "url": format!("https://a.example/{}", "a".repeat(MAX_URL_LENGTH)) }),
        ] {
            let failure = Command::parse(Address::FindOrCreate, &body).unwrap_err();
            assert_eq!(failure.code, FailureCode::InvalidRequest, "body {body}");
        }
    }

    #[test]
    fn test_parse_accepts_url_at_length_limit() {
        let prefix = "https://a.example/";
        let url = format!("{prefix}{}", "a".repeat(MAX_URL_LENGTH - prefix.len()));

        assert_eq!(
            Command::parse(Address::FindOrCreate, &json!({ "url": url })),
            Ok(Command::FindOrCreate(url))
        );
    }

    #[test]
    fn test_store_errors_map_to_codes() {
        let unavailable = Failure::from(StoreError::Unavailable("down".to_string()));
        assert_eq!(unavailable.code, FailureCode::ResourceUnavailable);

        for err in [
            StoreError::Query("boom".to_string()),
            StoreError::InvalidData("bad row".to_string()),
            StoreError::Conflict("urls_url_key".to_string()),
        ] {
            assert_eq!(Failure::from(err).code, FailureCode::Internal);
        }
    }

    #[test]
    fn test_reply_serialization() {
        let lookup = LinkReply::from(ShortLink::new(7, "http://a.example/x"));
        assert_eq!(
            serde_json::to_value(&lookup).unwrap(),
            json!({ "id": 7, "url": "http://a.example/x" })
        );

        let created = LinkReply::from(LinkOutcome::created(ShortLink::new(8, "http://b.example")));
        assert_eq!(
            serde_json::to_value(&created).unwrap(),
            json!({ "id": 8, "url": "http://b.example", "created": true })
        );
    }
}
