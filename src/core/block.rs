// Block data structures

use crate::core::{PreviousHash, Timestamp, Transaction, canonical_json, now, sha256_hex};
use serde::{Deserialize, Serialize};

/// Proof carried by the genesis block
pub const GENESIS_PROOF: u64 = 100;

/// A sealed unit of the chain
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Block {
    /// 1-based position in the chain
    pub index: u64,
    /// Creation time
    pub timestamp: Timestamp,
    /// Transactions sealed into this block, in submission order
    pub transactions: Vec<Transaction>,
    /// Nonce satisfying the work predicate against the previous proof
    pub proof: u64,
    /// Digest of the preceding block, or the genesis marker
    pub previous_hash: PreviousHash,
}

impl Block {
    /// Create a block stamped with the current time
    pub fn new(
        index: u64,
        transactions: Vec<Transaction>,
        proof: u64,
        previous_hash: PreviousHash,
    ) -> Self {
        Self {
            index,
            timestamp: now(),
            transactions,
            proof,
            previous_hash,
        }
    }

    /// Create the genesis block
    pub fn genesis() -> Self {
        Self::new(1, Vec::new(), GENESIS_PROOF, PreviousHash::genesis())
    }

    /// Digest of the full block content.
    ///
    /// Fields are encoded as JSON with sorted keys, so the digest depends
    /// only on the values, including transaction order.
    pub fn hash(&self) -> String {
        let encoded = canonical_json(self).expect("block fields always encode as JSON");
        sha256_hex(encoded.as_bytes())
    }

    /// Check if this is the genesis block
    pub fn is_genesis(&self) -> bool {
        self.index == 1 && self.previous_hash == PreviousHash::genesis()
    }
}
