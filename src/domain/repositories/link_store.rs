//! Pooled access to the canonical `id <-> url` table.

use crate::domain::entities::ShortLink;
use crate::error::StoreError;
use async_trait::async_trait;

/// A bounded pool of storage connections.
///
/// Every store operation checks out exactly one [`LinkConnection`] and drops
/// it when done; dropping returns it to the pool on every exit path.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::PgLinkStore`] - PostgreSQL pool
/// - [`crate::infrastructure::persistence::MemoryLinkStore`] - in-process store
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkStore: Send + Sync + 'static {
    /// Waits for a free pooled connection.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] when the backend cannot be reached
    /// or no connection frees up before the acquire timeout.
    async fn acquire(&self) -> Result<Box<dyn LinkConnection>, StoreError>;
}

/// A single checked-out connection.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkConnection: Send {
    /// Point lookup by identifier.
    async fn find_by_id(&mut self, id: u64) -> Result<Option<ShortLink>, StoreError>;

    /// Point lookup by exact url.
    async fn find_by_url(&mut self, url: &str) -> Result<Option<ShortLink>, StoreError>;

    /// Inserts a new row with a freshly assigned id.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Conflict`] if a row for `url` already exists.
    async fn insert(&mut self, url: &str) -> Result<ShortLink, StoreError>;
}
