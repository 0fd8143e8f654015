// Proof-of-work ledger node
// Append-only chain, pending pool, and longest-valid-chain reconciliation

pub mod core;
pub mod consensus;
pub mod ledger;
pub mod network;
pub mod api;
pub mod cli;
pub mod config;
pub mod error;

// Re-exports for convenience
pub use crate::core::{Block, PreviousHash, Transaction};
pub use consensus::{Miner, MiningResult, ValidationError, pow, valid_chain, valid_proof};
pub use ledger::Blockchain;
pub use network::{ChainSnapshot, ChainSource, FetchError, HttpChainSource, Node, StaticChainSource};
pub use cli::Cli;
pub use config::Config;
pub use error::{LedgerError, Result};
