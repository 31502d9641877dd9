//! In-process link store with a bounded connection pool.
//!
//! Mirrors the PostgreSQL store's contract (monotonic ids, unique urls,
//! conflict on duplicate insert, bounded checkout with timeout) without a
//! database. Used by the test suite.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{Mutex, OwnedSemaphorePermit, Semaphore};

use crate::domain::entities::ShortLink;
use crate::domain::repositories::{LinkConnection, LinkStore};
use crate::error::StoreError;

#[derive(Debug, Default)]
struct Table {
    last_id: u64,
    by_id: BTreeMap<u64, String>,
    by_url: HashMap<String, u64>,
}

/// Memory-backed pool of link connections.
pub struct MemoryLinkStore {
    table: Arc<Mutex<Table>>,
    permits: Arc<Semaphore>,
    max_connections: usize,
    acquire_timeout: Duration,
    acquisitions: AtomicUsize,
}

impl MemoryLinkStore {
    /// Creates an empty store allowing `max_connections` concurrent checkouts.
    pub fn new(max_connections: usize, acquire_timeout: Duration) -> Self {
        Self {
            table: Arc::new(Mutex::new(Table::default())),
            permits: Arc::new(Semaphore::new(max_connections)),
            max_connections,
            acquire_timeout,
            acquisitions: AtomicUsize::new(0),
        }
    }

    /// Total number of connections handed out since creation.
    pub fn acquisitions(&self) -> usize {
        self.acquisitions.load(Ordering::SeqCst)
    }

    /// Number of connections currently checked out.
    pub fn in_use(&self) -> usize {
        self.max_connections - self.permits.available_permits()
    }

    /// Number of stored links.
    pub async fn len(&self) -> usize {
        self.table.lock().await.by_id.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Closes the pool; pending and future checkouts fail as unavailable.
    pub fn close(&self) {
        self.permits.close();
    }
}

#[async_trait]
impl LinkStore for MemoryLinkStore {
    async fn acquire(&self) -> Result<Box<dyn LinkConnection>, StoreError> {
        let permit = tokio::time::timeout(self.acquire_timeout, self.permits.clone().acquire_owned())
            .await
            .map_err(|_| {
                StoreError::Unavailable(format!(
                    "no connection available after {:?}",
                    self.acquire_timeout
                ))
            })?
            .map_err(|_| StoreError::Unavailable("pool is closed".to_string()))?;

        self.acquisitions.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(MemoryLinkConnection {
            table: self.table.clone(),
            _permit: permit,
        }))
    }
}

/// A checked-out memory connection; the permit is released on drop.
pub struct MemoryLinkConnection {
    table: Arc<Mutex<Table>>,
    _permit: OwnedSemaphorePermit,
}

#[async_trait]
impl LinkConnection for MemoryLinkConnection {
    async fn find_by_id(&mut self, id: u64) -> Result<Option<ShortLink>, StoreError> {
        let table = self.table.lock().await;
        Ok(table.by_id.get(&id).map(|url| ShortLink::new(id, url.as_str())))
    }

    async fn find_by_url(&mut self, url: &str) -> Result<Option<ShortLink>, StoreError> {
        let table = self.table.lock().await;
        Ok(table.by_url.get(url).map(|&id| ShortLink::new(id, url)))
    }

    async fn insert(&mut self, url: &str) -> Result<ShortLink, StoreError> {
        let mut table = self.table.lock().await;

        if table.by_url.contains_key(url) {
            return Err(StoreError::Conflict("urls_url_key".to_string()));
        }

        table.last_id += 1;
        let id = table.last_id;
        table.by_id.insert(id, url.to_string());
        table.by_url.insert(url.to_string(), id);

        Ok(ShortLink::new(id, url))
    }
}
