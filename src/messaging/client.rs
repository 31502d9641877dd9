//! Caller-side handle for sending requests to the gateway.

use std::time::Duration;

use serde_json::{Value, json};
use thiserror::Error;
use tokio::sync::{mpsc, oneshot};

use crate::messaging::message::{Address, Envelope, Failure, LinkReply};

/// Why a request produced no reply.
#[derive(Debug, Error)]
pub enum SendError {
    /// The gateway answered with a typed failure.
    #[error(transparent)]
    Failed(#[from] Failure),
    /// The caller stopped waiting; the request may still complete.
    #[error("no reply within {0:?}")]
    Timeout(Duration),
    /// The gateway consumer is not running.
    #[error("gateway is not running")]
    Closed,
}

impl SendError {
    /// Returns the gateway failure, if the gateway produced one.
    pub fn failure(&self) -> Option<&Failure> {
        match self {
            SendError::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Cloneable sender side of the gateway channel.
#[derive(Debug, Clone)]
pub struct GatewayClient {
    tx: mpsc::Sender<Envelope>,
    request_timeout: Duration,
}

impl GatewayClient {
    pub(crate) fn new(tx: mpsc::Sender<Envelope>, request_timeout: Duration) -> Self {
        Self {
            tx,
            request_timeout,
        }
    }

    /// Default time [`Self::request`] waits for a reply.
    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }

    /// Returns true once the gateway consumer has stopped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Sends `body` to `address` and waits up to the default timeout.
    pub async fn request(&self, address: Address, body: Value) -> Result<LinkReply, SendError> {
        self.request_with_timeout(address, body, self.request_timeout)
            .await
    }

    /// Sends `body` to `address` and waits up to `timeout` for the reply.
    ///
    /// The timeout covers queueing and execution. When it elapses the caller
    /// gets [`SendError::Timeout`]; the gateway still finishes the request
    /// and discards the reply.
    pub async fn request_with_timeout(
        &self,
        address: Address,
        body: Value,
        timeout: Duration,
    ) -> Result<LinkReply, SendError> {
        tokio::time::timeout(timeout, self.send(address, body))
            .await
            .map_err(|_| SendError::Timeout(timeout))?
    }

    async fn send(&self, address: Address, body: Value) -> Result<LinkReply, SendError> {
        let (reply_to, reply) = oneshot::channel();

        self.tx
            .send(Envelope {
                address,
                body,
                reply_to,
            })
            .await
            .map_err(|_| SendError::Closed)?;

        // A dropped sender means the handler task died before replying.
        Ok(reply.await.map_err(|_| SendError::Closed)??)
    }

    /// Looks up the ShortLink with `id`.
    pub async fn find_by_id(&self, id: u64) -> Result<LinkReply, SendError> {
        self.request(Address::FindById, json!({ "id": id })).await
    }

    /// Returns the ShortLink for `url`, creating it on first use.
    pub async fn find_or_create(&self, url: &str) -> Result<LinkReply, SendError> {
        self.request(Address::FindOrCreate, json!({ "url": url }))
            .await
    }
}
