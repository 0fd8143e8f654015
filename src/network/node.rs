// Network node - shared handle around one ledger and its peer transport

use crate::config::Config;
use crate::consensus::{Miner, valid_chain};
use crate::core::{Block, Transaction};
use crate::error::{LedgerError, Result};
use crate::ledger::Blockchain;
use crate::network::{ChainSnapshot, ChainSource, FetchError, HttpChainSource, normalize_address};
use futures::stream::{self, StreamExt};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

/// Default bound on concurrent peer fetches during reconciliation
pub const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 8;

/// Cloneable handle to a ledger node.
///
/// Chain, pending pool and peers sit behind one lock. Proof search and peer
/// fetches run without holding it; only the final append or swap does.
#[derive(Clone)]
pub struct Node {
    identifier: Arc<str>,
    ledger: Arc<RwLock<Blockchain>>,
    source: Arc<dyn ChainSource>,
    max_concurrent_fetches: usize,
    shutdown: Arc<AtomicBool>,
}

impl Node {
    /// Create a node with a fresh ledger
    pub fn new(identifier: impl Into<String>, source: Arc<dyn ChainSource>) -> Self {
        let identifier: String = identifier.into();
        Self {
            identifier: Arc::from(identifier),
            ledger: Arc::new(RwLock::new(Blockchain::new())),
            source,
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
            shutdown: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Build a node from configuration with an HTTP peer transport and the
    /// configured bootstrap peers registered
    pub async fn from_config(config: &Config) -> Result<Self> {
        let source = HttpChainSource::new(config.request_timeout(), config.connect_timeout())?;
        let node = Self::new(config.node_identifier(), Arc::new(source))
            .with_max_concurrent_fetches(config.network.max_concurrent_fetches);

        node.register_nodes(&config.network.peers).await?;
        Ok(node)
    }

    /// Bound the number of peer fetches in flight
    pub fn with_max_concurrent_fetches(mut self, max_concurrent_fetches: usize) -> Self {
        self.max_concurrent_fetches = max_concurrent_fetches.max(1);
        self
    }

    /// Identifier credited by mining rewards
    pub fn identifier(&self) -> &str {
        &self.identifier
    }

    /// Copy of the chain
    pub async fn chain(&self) -> Vec<Block> {
        self.ledger.read().await.chain().to_vec()
    }

    /// Copy of the chain with its length
    pub async fn snapshot(&self) -> ChainSnapshot {
        ChainSnapshot::new(self.chain().await)
    }

    /// Copy of the tip
    pub async fn last_block(&self) -> Block {
        self.ledger.read().await.last_block().clone()
    }

    /// Copy of the pending pool
    pub async fn pending_transactions(&self) -> Vec<Transaction> {
        self.ledger.read().await.pending_transactions().to_vec()
    }

    /// Known peers, sorted
    pub async fn nodes(&self) -> Vec<String> {
        self.ledger.read().await.sorted_nodes()
    }

    /// Queue a transaction; returns the index of the block it will land in
    pub async fn new_transaction(&self, sender: &str, recipient: &str, amount: u64) -> Result<u64> {
        self.ledger.write().await.new_transaction(sender, recipient, amount)
    }

    /// Register one peer
    pub async fn register_node(&self, address: &str) -> Result<()> {
        self.ledger.write().await.register_node(address)
    }

    /// Register several peers; nothing is registered if any address is invalid
    pub async fn register_nodes(&self, addresses: &[String]) -> Result<()> {
        for address in addresses {
            normalize_address(address)?;
        }

        let mut ledger = self.ledger.write().await;
        for address in addresses {
            ledger.register_node(address)?;
        }
        Ok(())
    }

    /// Find the next proof, credit this node and append the block.
    ///
    /// The search runs on the blocking pool against a snapshot of the tip.
    /// If another block lands first the seal fails with `InvalidBlock`.
    pub async fn mine(&self) -> Result<Block> {
        let (tip, last_proof) = {
            let ledger = self.ledger.read().await;
            let last = ledger.last_block();
            (last.hash(), last.proof)
        };

        let cancel = Arc::clone(&self.shutdown);
        let result =
            tokio::task::spawn_blocking(move || Miner::new().mine_until(last_proof, &cancel))
                .await?;

        if !result.success {
            return Err(LedgerError::MiningCancelled);
        }

        log::debug!(
            "Found proof {} after {} attempts in {:?} ({:.0} H/s)",
            result.proof,
            result.attempts,
            result.duration,
            result.hash_rate()
        );

        let block = self
            .ledger
            .write()
            .await
            .seal_mined_block(&tip, result.proof, &self.identifier)?;

        log::info!("Forged block {} with proof {}", block.index, block.proof);
        Ok(block)
    }

    /// Ask every known peer for its chain and adopt the longest valid one.
    ///
    /// Unreachable peers are skipped. A peer serving an undecodable chain
    /// aborts the whole call. Among peers tied at the maximum length the
    /// winner depends on which answers first.
    pub async fn resolve_conflicts(&self) -> Result<bool> {
        let (peers, local_length) = {
            let ledger = self.ledger.read().await;
            (ledger.sorted_nodes(), ledger.len() as u64)
        };

        let source = Arc::clone(&self.source);
        let mut fetches = stream::iter(peers)
            .map(move |peer| {
                let source = Arc::clone(&source);
                async move {
                    let outcome = source.fetch_chain(&peer).await;
                    (peer, outcome)
                }
            })
            .buffer_unordered(self.max_concurrent_fetches);

        let mut max_length = local_length;
        let mut best: Option<ChainSnapshot> = None;

        while let Some((peer, outcome)) = fetches.next().await {
            match outcome {
                Ok(snapshot) => {
                    if snapshot.length > max_length && valid_chain(&snapshot.chain) {
                        log::debug!("Peer {} offers a valid chain of length {}", peer, snapshot.length);
                        max_length = snapshot.length;
                        best = Some(snapshot);
                    } else {
                        log::debug!("Peer {} chain of length {} not adopted", peer, snapshot.length);
                    }
                }
                Err(FetchError::Unavailable(reason)) => {
                    log::warn!("Skipping peer {}: {}", peer, reason);
                }
                Err(FetchError::Malformed(reason)) => {
                    log::warn!("Aborting reconciliation: peer {} sent a malformed chain", peer);
                    return Err(LedgerError::MalformedPeerChain { peer, reason });
                }
            }
        }

        let Some(snapshot) = best else {
            return Ok(false);
        };

        Ok(self
            .ledger
            .write()
            .await
            .replace_chain(snapshot.chain, snapshot.length))
    }

    /// Cancel any in-flight proof search; later searches stop immediately
    pub fn shutdown(&self) {
        self.shutdown.store(true, Ordering::Relaxed);
    }

    /// Whether shutdown was requested
    pub fn is_shutting_down(&self) -> bool {
        self.shutdown.load(Ordering::Relaxed)
    }
}
