#![allow(dead_code)]

use axum::Router;
use axum_test::TestServer;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;

use shortlink::api;
use shortlink::application::services::DedupStore;
use shortlink::infrastructure::persistence::MemoryLinkStore;
use shortlink::messaging::{Gateway, GatewayClient};
use shortlink::state::AppState;
use shortlink::utils::token_codec::TokenCodec;

pub const SALT: &str = "test-salt";
pub const BASE_URL: &str = "http://short.test";

pub fn memory_store(max_connections: usize) -> Arc<MemoryLinkStore> {
    Arc::new(MemoryLinkStore::new(
        max_connections,
        Duration::from_millis(200),
    ))
}

pub fn spawn_gateway(store: Arc<MemoryLinkStore>) -> (GatewayClient, JoinHandle<()>) {
    Gateway::new(DedupStore::new(store)).spawn(64, Duration::from_secs(5))
}

pub fn create_test_state(store: Arc<MemoryLinkStore>) -> (AppState, JoinHandle<()>) {
    let (gateway, handle) = spawn_gateway(store);
    let state = AppState::new(Arc::new(TokenCodec::new(SALT)), gateway, BASE_URL);
    (state, handle)
}

pub fn test_router(state: AppState) -> Router {
    api::routes::public_routes().with_state(state)
}

pub fn test_server(store: Arc<MemoryLinkStore>) -> (TestServer, AppState) {
    let (state, _handle) = create_test_state(store);
    let server = TestServer::new(test_router(state.clone())).unwrap();
    (server, state)
}
