// Peer addressing and the chain snapshot exchanged with peers

use crate::core::Block;
use crate::error::{LedgerError, Result};
use serde::{Deserialize, Serialize};
use url::Url;

/// Chain as served by a node's `/chain` endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChainSnapshot {
    pub chain: Vec<Block>,
    /// Length the node reports; compared during reconciliation
    pub length: u64,
}

impl ChainSnapshot {
    /// Snapshot of a local chain
    pub fn new(chain: Vec<Block>) -> Self {
        let length = chain.len() as u64;
        Self { chain, length }
    }
}

/// Reduce a URL-like peer address to its `host[:port]` part.
///
/// `http://a.com/x` and `https://a.com` both become `a.com`. A bare
/// `host:port` without a scheme is accepted as well.
pub fn normalize_address(address: &str) -> Result<String> {
    let trimmed = address.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::InvalidPeerAddress("empty address".to_string()));
    }

    let parsed = if trimmed.contains("://") {
        Url::parse(trimmed)
    } else {
        Url::parse(&format!("http://{}", trimmed))
    }
    .map_err(|e| LedgerError::InvalidPeerAddress(format!("{}: {}", address, e)))?;

    let host = parsed
        .host_str()
        .filter(|host| !host.is_empty())
        .ok_or_else(|| LedgerError::InvalidPeerAddress(format!("{}: no host", address)))?;

    Ok(match parsed.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}
