// Error types for the ledger node

use crate::consensus::ValidationError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LedgerError {
    /// Pending-pool ordering rule violated
    #[error("Invalid transaction: {0}")]
    InvalidTransaction(String),

    /// Hash link or proof rule violated on append
    #[error("Invalid block: {0}")]
    InvalidBlock(String),

    #[error("Invalid peer address: {0}")]
    InvalidPeerAddress(String),

    /// A reachable peer served a chain that does not decode into blocks
    #[error("Peer {peer} served a malformed chain: {reason}")]
    MalformedPeerChain { peer: String, reason: String },

    #[error("Proof search was cancelled")]
    MiningCancelled,

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Background task failed: {0}")]
    Task(#[from] tokio::task::JoinError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<toml::de::Error> for LedgerError {
    fn from(err: toml::de::Error) -> Self {
        LedgerError::Config(err.to_string())
    }
}

impl From<ValidationError> for LedgerError {
    fn from(err: ValidationError) -> Self {
        match err {
            ValidationError::OutOfOrder { .. } => LedgerError::InvalidTransaction(err.to_string()),
            _ => LedgerError::InvalidBlock(err.to_string()),
        }
    }
}

/// Convenience alias used across the crate
pub type Result<T> = std::result::Result<T, LedgerError>;
