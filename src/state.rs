use std::sync::Arc;

use crate::messaging::GatewayClient;
use crate::utils::token_codec::TokenCodec;

/// Shared handler state. Cloned per request; every field is cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub codec: Arc<TokenCodec>,
    pub gateway: GatewayClient,
    /// Prefix of every shortened link, without a trailing slash.
    pub base_url: String,
}

impl AppState {
    pub fn new(codec: Arc<TokenCodec>, gateway: GatewayClient, base_url: impl Into<String>) -> Self {
        Self {
            codec,
            gateway,
            base_url: base_url.into(),
        }
    }

    /// Full shortened link for `token`.
    pub fn short_url(&self, token: &str) -> String {
        format!("{}/{}", self.base_url, token)
    }
}
