//! Deduplicating lookup/get-or-create over a pooled link store.

use std::sync::Arc;

use tracing::debug;

use crate::domain::entities::{LinkOutcome, ShortLink};
use crate::domain::repositories::LinkStore;
use crate::error::StoreError;

/// Owns the canonical `id <-> url` mapping.
///
/// Each operation checks out one pooled connection for its whole duration
/// and releases it when the connection guard goes out of scope.
pub struct DedupStore<S: LinkStore> {
    store: Arc<S>,
}

impl<S: LinkStore> DedupStore<S> {
    /// Creates a new dedup store over a connection pool.
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Looks up the ShortLink with `id`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if no connection can be acquired,
    /// or the backend error for failed queries. A missing id is `Ok(None)`.
    pub async fn find_by_id(&self, id: u64) -> Result<Option<ShortLink>, StoreError> {
        let mut conn = self.store.acquire().await?;
        conn.find_by_id(id).await
    }

    /// Returns the ShortLink for `url`, creating it on first use.
    ///
    /// # Deduplication
    ///
    /// Existing rows are returned directly. Otherwise an insert is attempted;
    /// if a concurrent caller inserted the same url first, the backend
    /// reports a conflict and the winner's row is read back on the same
    /// connection. Exactly one caller observes `created == true`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if no connection can be acquired.
    /// Conflicts are never returned.
    pub async fn find_or_create(&self, url: &str) -> Result<LinkOutcome, StoreError> {
        let mut conn = self.store.acquire().await?;

        if let Some(existing) = conn.find_by_url(url).await? {
            return Ok(LinkOutcome::existing(existing));
        }

        match conn.insert(url).await {
            Ok(link) => Ok(LinkOutcome::created(link)),
            Err(StoreError::Conflict(constraint)) => {
                debug!(url, constraint = %constraint, "insert lost race, reading winner");

                conn.find_by_url(url)
                    .await?
                    .map(LinkOutcome::existing)
                    .ok_or_else(|| {
                        StoreError::InvalidData(format!(
                            "conflict on {constraint} but no row holds the url"
                        ))
                    })
            }
            Err(err) => Err(err),
        }
    }
}
