//! HTTP server initialization and runtime setup.
//!
//! Handles the database pool, migrations, the gateway consumer and the Axum
//! server lifecycle.

use crate::application::services::DedupStore;
use crate::config::Config;
use crate::infrastructure::persistence::PgLinkStore;
use crate::messaging::Gateway;
use crate::routes::app_router;
use crate::state::AppState;

use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

/// Builds the PostgreSQL pool from the pool settings in `config`.
///
/// `max_connections` bounds how many store operations run at once; a
/// checkout that waits longer than `DB_CONNECT_TIMEOUT` fails as unavailable.
///
/// # Errors
///
/// Returns an error if the initial connection fails.
pub async fn connect_pool(config: &Config) -> Result<PgPool> {
    PgPoolOptions::new()
        .max_connections(config.db_max_connections)
        .acquire_timeout(Duration::from_secs(config.db_connect_timeout))
        .idle_timeout(Duration::from_secs(config.db_idle_timeout))
        .max_lifetime(Duration::from_secs(config.db_max_lifetime))
        .connect(&config.database_url)
        .await
        .context("Failed to connect to database")
}

/// Runs the HTTP server with the given configuration.
///
/// Initializes:
/// - PostgreSQL connection pool
/// - Apply migrations
/// - Token codec (once, shared by all handlers)
/// - Gateway consumer loop
/// - Axum HTTP server, until Ctrl+C
///
/// # Errors
///
/// Returns an error if:
/// - Database connection or migration fails
/// - Server bind fails
/// - Server runtime error occurs
pub async fn run(config: Config) -> Result<()> {
    let pool = connect_pool(&config).await?;
    tracing::info!("Connected to database");

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to migrate")?;

    let codec = Arc::new(config.token.codec());

    let store = DedupStore::new(Arc::new(PgLinkStore::new(pool.clone())));
    let (gateway, gateway_handle) =
        Gateway::new(store).spawn(config.gateway_queue_capacity, config.request_timeout());
    tracing::info!(
        capacity = config.gateway_queue_capacity,
        "Gateway started"
    );

    let state = AppState::new(codec, gateway, config.base_url.clone());
    let app = app_router(state);

    let addr: SocketAddr = config
        .listen_addr
        .parse()
        .with_context(|| format!("Invalid listen address '{}'", config.listen_addr))?;
    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Listening on http://{addr}");

    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service(app),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await?;

    // The router held the last client; the consumer exits once in-flight
    // requests drain.
    if tokio::time::timeout(Duration::from_secs(10), gateway_handle)
        .await
        .is_err()
    {
        tracing::warn!("Gateway did not stop within 10s");
    }

    pool.close().await;
    tracing::info!("Server stopped");

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
