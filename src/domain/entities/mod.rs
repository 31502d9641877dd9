//! Core domain entities.
//!
//! - [`ShortLink`] - the persisted `(id, url)` mapping
//! - [`LinkOutcome`] - a ShortLink plus whether the call created it
//!
//! Tokens are not entities: they are recomputed from the id by
//! [`crate::utils::token_codec`] whenever they are presented.

pub mod short_link;

pub use short_link::{LinkOutcome, MAX_URL_LENGTH, ShortLink};
