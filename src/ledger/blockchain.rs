// Ledger engine - chain, pending pool and known peers

use crate::consensus::{pow, valid_chain, valid_proof, validate_link, validate_pending_order};
use crate::core::{Block, PreviousHash, Transaction};
use crate::error::{LedgerError, Result};
use crate::network::normalize_address;
use std::collections::HashSet;

/// Single-node ledger.
///
/// Owns the chain, the pending transactions and the known peers. Every
/// append goes through [`Blockchain::new_block`]; the only other way the
/// chain changes is a whole-chain swap in [`Blockchain::replace_chain`].
#[derive(Debug, Clone)]
pub struct Blockchain {
    chain: Vec<Block>,
    pending: Vec<Transaction>,
    nodes: HashSet<String>,
}

impl Default for Blockchain {
    fn default() -> Self {
        Self::new()
    }
}

impl Blockchain {
    /// Create a ledger holding only the genesis block
    pub fn new() -> Self {
        Self {
            chain: vec![Block::genesis()],
            pending: Vec::new(),
            nodes: HashSet::new(),
        }
    }

    /// Blocks from genesis to tip
    pub fn chain(&self) -> &[Block] {
        &self.chain
    }

    /// Number of blocks in the chain
    pub fn len(&self) -> usize {
        self.chain.len()
    }

    /// Always false: the chain holds at least the genesis block
    pub fn is_empty(&self) -> bool {
        self.chain.is_empty()
    }

    /// Most recent block
    pub fn last_block(&self) -> &Block {
        self.chain.last().expect("chain always holds the genesis block")
    }

    /// Transactions accepted but not yet sealed
    pub fn pending_transactions(&self) -> &[Transaction] {
        &self.pending
    }

    /// Known peers as `host[:port]`
    pub fn nodes(&self) -> &HashSet<String> {
        &self.nodes
    }

    /// Known peers in sorted order
    pub fn sorted_nodes(&self) -> Vec<String> {
        let mut nodes: Vec<String> = self.nodes.iter().cloned().collect();
        nodes.sort();
        nodes
    }

    /// Check the ordering rule for a candidate pending transaction
    pub fn valid_transaction(&self, candidate: &Transaction) -> bool {
        validate_pending_order(self.pending.last(), candidate).is_ok()
    }

    /// Queue a transaction stamped with the current time.
    ///
    /// Returns the index of the block the transaction will be sealed into.
    pub fn new_transaction(
        &mut self,
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: u64,
    ) -> Result<u64> {
        self.submit_transaction(Transaction::new(sender, recipient, amount))
    }

    /// Queue an already built transaction
    pub fn submit_transaction(&mut self, transaction: Transaction) -> Result<u64> {
        validate_pending_order(self.pending.last(), &transaction)?;

        log::debug!(
            "Queued transaction {} -> {} ({})",
            transaction.sender, transaction.recipient, transaction.amount
        );
        self.pending.push(transaction);

        Ok(self.last_block().index + 1)
    }

    /// Check whether `candidate` may be appended to the current chain
    pub fn valid_block(&self, candidate: &Block) -> bool {
        self.check_block(candidate).is_ok()
    }

    fn check_block(&self, candidate: &Block) -> Result<()> {
        match self.chain.last() {
            None => Ok(()),
            Some(last) => Ok(validate_link(last, candidate)?),
        }
    }

    /// Seal every pending transaction into a new block and append it.
    ///
    /// `previous_hash` defaults to the digest of the current tip when it is
    /// `None` or unset (`0` / empty string). On failure the chain and the
    /// pending pool are left as they were.
    pub fn new_block(&mut self, proof: u64, previous_hash: Option<PreviousHash>) -> Result<Block> {
        let previous_hash = match previous_hash {
            Some(link) if !link.is_unset() => link,
            _ => PreviousHash::from(self.last_block().hash()),
        };

        let candidate = Block::new(
            self.chain.len() as u64 + 1,
            std::mem::take(&mut self.pending),
            proof,
            previous_hash,
        );

        if let Err(e) = self.check_block(&candidate) {
            self.pending = candidate.transactions;
            return Err(e);
        }

        log::info!(
            "Appended block {} with {} transactions (proof {})",
            candidate.index,
            candidate.transactions.len(),
            candidate.proof
        );
        self.chain.push(candidate.clone());

        Ok(candidate)
    }

    /// Seal a block for a proof found against the tip `mined_on`.
    ///
    /// Fails without touching the pool if the tip moved or the proof does not
    /// hold, so a stale proof never leaves a stray reward behind.
    pub fn seal_mined_block(&mut self, mined_on: &str, proof: u64, beneficiary: &str) -> Result<Block> {
        let last = self.last_block();
        if last.hash() != mined_on {
            return Err(LedgerError::InvalidBlock(format!(
                "chain tip moved to block {} while mining",
                last.index
            )));
        }
        if !valid_proof(last.proof, proof) {
            return Err(LedgerError::InvalidBlock(format!(
                "proof {} is not valid after proof {}",
                proof, last.proof
            )));
        }

        self.submit_transaction(Transaction::reward(beneficiary))?;
        self.new_block(proof, Some(PreviousHash::from(mined_on)))
    }

    /// Find the next proof, credit `beneficiary` and append the block
    pub fn mine(&mut self, beneficiary: &str) -> Result<Block> {
        let last = self.last_block();
        let proof = pow(last.proof);
        let tip = last.hash();

        self.seal_mined_block(&tip, proof, beneficiary)
    }

    /// Remember a peer by the `host[:port]` part of its address
    pub fn register_node(&mut self, address: &str) -> Result<()> {
        let node = normalize_address(address)?;
        if self.nodes.insert(node.clone()) {
            log::info!("Registered peer {}", node);
        }
        Ok(())
    }

    /// Check a whole chain
    pub fn valid_chain(&self, chain: &[Block]) -> bool {
        valid_chain(chain)
    }

    /// Adopt `candidate` if its reported length beats the local chain and it
    /// is valid. Returns whether the chain was replaced.
    pub fn replace_chain(&mut self, candidate: Vec<Block>, reported_length: u64) -> bool {
        let local_length = self.chain.len() as u64;
        if reported_length <= local_length {
            log::debug!(
                "Kept local chain: candidate length {} does not exceed {}",
                reported_length, local_length
            );
            return false;
        }
        if !valid_chain(&candidate) {
            return false;
        }

        log::info!(
            "Replaced local chain of {} blocks with peer chain of {} blocks",
            local_length,
            candidate.len()
        );
        self.chain = candidate;
        true
    }
}
