//! Request/reply gateway in front of the dedup store.
//!
//! # Request Lifecycle
//!
//! 1. **received** - an [`Envelope`] arrives on the gateway channel
//! 2. **validated** - the payload is parsed; bad shapes fail with code 2
//!    before any pooled connection is touched
//! 3. **executing** - one store operation runs under one pooled connection
//! 4. **replied / failed** - the outcome is sent on the envelope's oneshot
//!    channel, so each request is answered exactly once
//!
//! Every envelope is handled on its own task; concurrency is bounded by the
//! store's pool, not by the consumer loop.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::application::services::DedupStore;
use crate::domain::repositories::LinkStore;
use crate::error::StoreError;
use crate::messaging::client::GatewayClient;
use crate::messaging::message::{Address, Command, Envelope, Failure, LinkReply, ReplyResult};

/// Translates gateway requests into dedup store operations.
pub struct Gateway<S: LinkStore> {
    store: DedupStore<S>,
}

impl<S: LinkStore> Gateway<S> {
    /// Creates a gateway over a dedup store.
    pub fn new(store: DedupStore<S>) -> Self {
        Self { store }
    }

    /// Handles a single request and produces its reply or failure.
    pub async fn handle(&self, address: Address, body: &Value) -> ReplyResult {
        debug!(%address, %body, "incoming request");

        match Command::parse(address, body)? {
            Command::FindById(id) => match self.store.find_by_id(id).await {
                Ok(Some(link)) => Ok(LinkReply::from(link)),
                Ok(None) => {
                    debug!(id, "url not found");
                    Err(Failure::not_found("url not found"))
                }
                Err(err) => Err(Self::fail(address, err)),
            },
            Command::FindOrCreate(url) => match self.store.find_or_create(&url).await {
                Ok(outcome) => {
                    debug!(url = %url, id = outcome.link.id, created = outcome.created, "url stored");
                    Ok(LinkReply::from(outcome))
                }
                Err(err) => Err(Self::fail(address, err)),
            },
        }
    }

    fn fail(address: Address, err: StoreError) -> Failure {
        if err.is_transient() {
            warn!(%address, error = %err, "unable to obtain a database connection");
        } else {
            error!(%address, error = %err, "internal database error");
        }
        Failure::from(err)
    }

    /// Starts the consumer loop and returns a client bound to it.
    ///
    /// `capacity` bounds the number of queued, not yet dispatched requests;
    /// `request_timeout` is the client's default wait for a reply.
    pub fn spawn(
        self,
        capacity: usize,
        request_timeout: Duration,
    ) -> (GatewayClient, JoinHandle<()>) {
        let (tx, rx) = mpsc::channel(capacity);
        let handle = tokio::spawn(run_gateway(Arc::new(self), rx));
        (GatewayClient::new(tx, request_timeout), handle)
    }
}

/// Consumes envelopes until every sender is dropped.
pub async fn run_gateway<S: LinkStore>(gateway: Arc<Gateway<S>>, mut rx: mpsc::Receiver<Envelope>) {
    info!("gateway consumer started");

    while let Some(envelope) = rx.recv().await {
        let gateway = gateway.clone();

        // In-flight work is not cancelled when the caller stops waiting.
        tokio::spawn(async move {
            let Envelope {
                address,
                body,
                reply_to,
            } = envelope;

            let outcome = gateway.handle(address, &body).await;

            if reply_to.send(outcome).is_err() {
                debug!(%address, "caller stopped waiting, reply dropped");
            }
        });
    }

    info!("gateway channel closed, consumer stopped");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ShortLink;
    use crate::domain::repositories::{LinkConnection, MockLinkConnection, MockLinkStore};
    use crate::messaging::message::FailureCode;
    use serde_json::json;

    fn gateway(store: MockLinkStore) -> Gateway<MockLinkStore> {
        Gateway::new(DedupStore::new(Arc::new(store)))
    }

    fn store_with(conn: MockLinkConnection) -> MockLinkStore {
        let mut store = MockLinkStore::new();
        store
            .expect_acquire()
            .times(1)
            .return_once(move || Ok(Box::new(conn) as Box<dyn LinkConnection>));
        store
    }

    #[tokio::test]
    async fn test_missing_url_never_acquires() {
        let mut store = MockLinkStore::new();
        store.expect_acquire().times(0);

        let failure = gateway(store)
            .handle(Address::FindOrCreate, &json!({}))
            .await
            .unwrap_err();

        assert_eq!(failure.code, FailureCode::InvalidRequest);
    }

    #[tokio::test]
    async fn test_missing_id_never_acquires() {
        let mut store = MockLinkStore::new();
        store.expect_acquire().times(0);

        let failure = gateway(store)
            .handle(Address::FindById, &json!({ "id": "seven" }))
            .await
            .unwrap_err();

        assert_eq!(failure.code, FailureCode::InvalidRequest);
    }

    #[tokio::test]
    async fn test_lookup_hit_replies_with_link() {
        let mut conn = MockLinkConnection::new();
        conn.expect_find_by_id()
            .returning(|id| Ok(Some(ShortLink::new(id, "http://a.example/x"))));

        let reply = gateway(store_with(conn))
            .handle(Address::FindById, &json!({ "id": 7 }))
            .await
            .unwrap();

        assert_eq!(reply.id, 7);
        assert_eq!(reply.url, "http://a.example/x");
        assert_eq!(reply.created, None);
    }

    #[tokio::test]
    async fn test_lookup_miss_is_not_found() {
        let mut conn = MockLinkConnection::new();
        conn.expect_find_by_id().returning(|_| Ok(None));

        let failure = gateway(store_with(conn))
            .handle(Address::FindById, &json!({ "id": 12 }))
            .await
            .unwrap_err();

        assert_eq!(failure.code, FailureCode::NotFound);
    }

    #[tokio::test]
    async fn test_get_or_create_reports_creation() {
        let mut conn = MockLinkConnection::new();
        conn.expect_find_by_url().returning(|_| Ok(None));
        conn.expect_insert().returning(|url| Ok(ShortLink::new(1, url)));

        let reply = gateway(store_with(conn))
            .handle(Address::FindOrCreate, &json!({ "url": "https://example.com" }))
            .await
            .unwrap();

        assert_eq!(reply.id, 1);
        assert_eq!(reply.created, Some(true));
    }

    #[tokio::test]
    async fn test_pool_exhaustion_is_resource_unavailable() {
        let mut store = MockLinkStore::new();
        store
            .expect_acquire()
            .returning(|| Err(StoreError::Unavailable("pool timed out".to_string())));

        let failure = gateway(store)
            .handle(Address::FindOrCreate, &json!({ "url": "https://example.com" }))
            .await
            .unwrap_err();

        assert_eq!(failure.code, FailureCode::ResourceUnavailable);
    }

    #[tokio::test]
    async fn test_query_fault_is_internal() {
        let mut conn = MockLinkConnection::new();
        conn.expect_find_by_id()
            .returning(|_| Err(StoreError::Query("relation \"urls\" does not exist".to_string())));

        let failure = gateway(store_with(conn))
            .handle(Address::FindById, &json!({ "id": 1 }))
            .await
            .unwrap_err();

        assert_eq!(failure.code, FailureCode::Internal);
    }
}
