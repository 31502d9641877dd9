//! PostgreSQL implementation of the link store.

use async_trait::async_trait;
use sqlx::PgPool;
use sqlx::pool::PoolConnection;
use sqlx::postgres::Postgres;

use crate::domain::entities::ShortLink;
use crate::domain::repositories::{LinkConnection, LinkStore};
use crate::error::{StoreError, map_sqlx_error};

/// PostgreSQL-backed pool of link connections.
///
/// The pool bound (`max_connections`) and acquire timeout are configured on
/// the [`PgPool`] itself; see [`crate::server::run`].
#[derive(Debug, Clone)]
pub struct PgLinkStore {
    pool: PgPool,
}

impl PgLinkStore {
    /// Creates a store over an existing connection pool.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl LinkStore for PgLinkStore {
    async fn acquire(&self) -> Result<Box<dyn LinkConnection>, StoreError> {
        // Any failure to check out a connection means the backend is unusable
        // right now, whatever sqlx reports as the cause.
        let conn = self
            .pool
            .acquire()
            .await
            .map_err(|err| StoreError::Unavailable(err.to_string()))?;

        Ok(Box::new(PgLinkConnection { conn }))
    }
}

/// A pooled PostgreSQL connection; returned to the pool on drop.
pub struct PgLinkConnection {
    conn: PoolConnection<Postgres>,
}

fn to_short_link((id, url): (i64, String)) -> Result<ShortLink, StoreError> {
    let id = u64::try_from(id)
        .map_err(|_| StoreError::InvalidData(format!("negative identifier {id}")))?;
    Ok(ShortLink::new(id, url))
}

#[async_trait]
impl LinkConnection for PgLinkConnection {
    async fn find_by_id(&mut self, id: u64) -> Result<Option<ShortLink>, StoreError> {
        // BIGSERIAL never assigns ids beyond i64::MAX.
        let Ok(id) = i64::try_from(id) else {
            return Ok(None);
        };

        let row: Option<(i64, String)> = sqlx::query_as("SELECT id, url FROM urls WHERE id = $1")
            .bind(id)
            .fetch_optional(&mut *self.conn)
            .await
            .map_err(map_sqlx_error)?;

        row.map(to_short_link).transpose()
    }

    async fn find_by_url(&mut self, url: &str) -> Result<Option<ShortLink>, StoreError> {
        let row: Option<(i64, String)> =
            sqlx::query_as("SELECT id, url FROM urls WHERE url = $1")
                .bind(url)
                .fetch_optional(&mut *self.conn)
                .await
                .map_err(map_sqlx_error)?;

        row.map(to_short_link).transpose()
    }

    async fn insert(&mut self, url: &str) -> Result<ShortLink, StoreError> {
        let row: Option<(i64, String)> = sqlx::query_as(
            r#"
            INSERT INTO urls (url)
            VALUES ($1)
            ON CONFLICT ON CONSTRAINT urls_url_key DO NOTHING
            RETURNING id, url
            "#,
        )
        .bind(url)
        .fetch_optional(&mut *self.conn)
        .await
        .map_err(map_sqlx_error)?;

        match row {
            Some(row) => to_short_link(row),
            None => Err(StoreError::Conflict("urls_url_key".to_string())),
        }
    }
}
