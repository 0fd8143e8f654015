// Fetching chain snapshots from peers

use crate::error::{LedgerError, Result};
use crate::network::ChainSnapshot;
use async_trait::async_trait;
use reqwest::Client;
use std::collections::HashMap;
use std::sync::RwLock;
use std::time::Duration;
use thiserror::Error;

/// Outcome of a failed peer fetch
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FetchError {
    /// Peer could not be reached or answered with an error status; skipped
    #[error("peer unavailable: {0}")]
    Unavailable(String),
    /// Peer answered but the payload is not a chain; aborts reconciliation
    #[error("malformed chain payload: {0}")]
    Malformed(String),
}

/// Source of remote chain snapshots
#[async_trait]
pub trait ChainSource: Send + Sync {
    /// Fetch the chain currently held by `peer` (`host[:port]`)
    async fn fetch_chain(&self, peer: &str) -> std::result::Result<ChainSnapshot, FetchError>;
}

/// Fetches `GET http://{peer}/chain` over HTTP
pub struct HttpChainSource {
    client: Client,
}

impl HttpChainSource {
    /// Create a source with the given request and connect timeouts
    pub fn new(request_timeout: Duration, connect_timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(request_timeout)
            .connect_timeout(connect_timeout)
            .build()
            .map_err(|e| LedgerError::Network(e.to_string()))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl ChainSource for HttpChainSource {
    async fn fetch_chain(&self, peer: &str) -> std::result::Result<ChainSnapshot, FetchError> {
        let url = format!("http://{}/chain", peer);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Unavailable(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Unavailable(format!("{} answered {}", url, status)));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FetchError::Unavailable(e.to_string()))?;

        serde_json::from_slice(&body).map_err(|e| FetchError::Malformed(e.to_string()))
    }
}

/// In-memory source with canned responses per peer (for testing)
#[derive(Default)]
pub struct StaticChainSource {
    responses: RwLock<HashMap<String, std::result::Result<ChainSnapshot, FetchError>>>,
}

impl StaticChainSource {
    /// Create a source with no canned responses
    pub fn new() -> Self {
        Self::default()
    }

    /// Serve `snapshot` to requests for `peer`
    pub fn serve(&self, peer: &str, snapshot: ChainSnapshot) {
        self.set(peer, Ok(snapshot));
    }

    /// Answer requests for `peer` with `error`
    pub fn fail(&self, peer: &str, error: FetchError) {
        self.set(peer, Err(error));
    }

    fn set(&self, peer: &str, response: std::result::Result<ChainSnapshot, FetchError>) {
        self.responses
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .insert(peer.to_string(), response);
    }
}

#[async_trait]
impl ChainSource for StaticChainSource {
    async fn fetch_chain(&self, peer: &str) -> std::result::Result<ChainSnapshot, FetchError> {
        self.responses
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(peer)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::Unavailable(format!("no route to {}", peer))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Block;

    #[tokio::test]
    async fn test_static_source_responses() {
        let source = StaticChainSource::new();
        let snapshot = ChainSnapshot::new(vec![Block::genesis()]);
        source.serve("a.com", snapshot.clone());
        source.fail("b.com", FetchError::Malformed("bad".to_string()));

        assert_eq!(source.fetch_chain("a.com").await, Ok(snapshot));
        assert_eq!(
            source.fetch_chain("b.com").await,
            Err(FetchError::Malformed("bad".to_string()))
        );
        assert!(matches!(
            source.fetch_chain("c.com").await,
            Err(FetchError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_peer_is_unavailable() {
        let source =
            HttpChainSource::new(Duration::from_millis(500), Duration::from_millis(200)).unwrap();

        // Port 9 (discard) on localhost is not expected to run an HTTP server
        let outcome = source.fetch_chain("127.0.0.1:9").await;
        assert!(matches!(outcome, Err(FetchError::Unavailable(_))));
    }
}
