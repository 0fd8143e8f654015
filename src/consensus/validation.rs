// Chain, block and pending-transaction validation

use crate::consensus::pow::valid_proof;
use crate::core::{Block, Timestamp, Transaction};
use thiserror::Error;

/// Validation error types
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    /// A chain must start with a genesis block
    #[error("chain is empty")]
    EmptyChain,
    /// `previous_hash` does not match the digest of the preceding block
    #[error("block {index} does not link to the block before it")]
    BrokenLink { index: u64 },
    /// The proof pair fails the work predicate
    #[error("proof {proof} of block {index} is not valid after proof {last_proof}")]
    InvalidProof { index: u64, last_proof: u64, proof: u64 },
    /// Pending transaction is older than the last accepted one
    #[error("transaction timestamp {timestamp} is earlier than the last pending timestamp {last_timestamp}")]
    OutOfOrder {
        timestamp: Timestamp,
        last_timestamp: Timestamp,
    },
}

/// Check that `block` correctly follows `previous`
pub fn validate_link(previous: &Block, block: &Block) -> Result<(), ValidationError> {
    if !block.previous_hash.links_to(&previous.hash()) {
        return Err(ValidationError::BrokenLink { index: block.index });
    }

    if !valid_proof(previous.proof, block.proof) {
        return Err(ValidationError::InvalidProof {
            index: block.index,
            last_proof: previous.proof,
            proof: block.proof,
        });
    }

    Ok(())
}

/// Walk a chain from its first block and check every adjacent pair
pub fn validate_chain(chain: &[Block]) -> Result<(), ValidationError> {
    if chain.is_empty() {
        return Err(ValidationError::EmptyChain);
    }

    for pair in chain.windows(2) {
        validate_link(&pair[0], &pair[1])?;
    }

    Ok(())
}

/// Check a whole chain, reporting only whether it holds
pub fn valid_chain(chain: &[Block]) -> bool {
    match validate_chain(chain) {
        Ok(()) => true,
        Err(e) => {
            log::debug!("Rejected chain of {} blocks: {}", chain.len(), e);
            false
        }
    }
}

/// Check the ordering rule for a transaction joining the pending pool
pub fn validate_pending_order(
    last_pending: Option<&Transaction>,
    candidate: &Transaction,
) -> Result<(), ValidationError> {
    let Some(last) = last_pending else {
        return Ok(());
    };

    // Resubmitting the last transaction is allowed
    if last == candidate || candidate.timestamp >= last.timestamp {
        return Ok(());
    }

    Err(ValidationError::OutOfOrder {
        timestamp: candidate.timestamp,
        last_timestamp: last.timestamp,
    })
}
