//! ShortLink entity: the persisted `(id, url)` pair.

use serde::{Deserialize, Serialize};

/// Longest url, in bytes, that can be stored.
///
/// The unique index on `urls.url` cannot hold entries above roughly 2.7 KB.
pub const MAX_URL_LENGTH: usize = 2048;

/// Canonical mapping between a store-assigned identifier and a URL.
///
/// Both sides are unique: an id is never reused and a URL is stored at most
/// once (exact, case-sensitive match). Rows are never mutated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortLink {
    pub id: u64,
    pub url: String,
}

impl ShortLink {
    /// Creates a new ShortLink instance.
    pub fn new(id: u64, url: impl Into<String>) -> Self {
        Self {
            id,
            url: url.into(),
        }
    }
}

/// Result of a get-or-create call.
///
/// `created` is `true` only for the single call that inserted the row; every
/// concurrent or later call for the same URL observes `false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkOutcome {
    pub link: ShortLink,
    pub created: bool,
}

impl LinkOutcome {
    pub fn created(link: ShortLink) -> Self {
        Self {
            link,
            created: true,
        }
    }

    pub fn existing(link: ShortLink) -> Self {
        Self {
            link,
            created: false,
        }
    }
}
