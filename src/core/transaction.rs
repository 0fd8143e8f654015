// Transaction data structures

use crate::core::{Timestamp, now};
use serde::{Deserialize, Serialize};

/// A value transfer waiting to be sealed into a block
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Transaction {
    /// Paying party; `"0"` marks a system-minted reward
    pub sender: String,
    /// Receiving party
    pub recipient: String,
    /// Amount transferred
    pub amount: u64,
    /// Creation time
    pub timestamp: Timestamp,
}

impl Transaction {
    /// Sender used for mining rewards
    pub const REWARD_SENDER: &'static str = "0";

    /// Amount credited to a miner for each sealed block
    pub const REWARD_AMOUNT: u64 = 1;

    /// Create a transaction stamped with the current time
    pub fn new(sender: impl Into<String>, recipient: impl Into<String>, amount: u64) -> Self {
        Self::with_timestamp(sender, recipient, amount, now())
    }

    /// Create a transaction with an explicit creation time
    pub fn with_timestamp(
        sender: impl Into<String>,
        recipient: impl Into<String>,
        amount: u64,
        timestamp: Timestamp,
    ) -> Self {
        Self {
            sender: sender.into(),
            recipient: recipient.into(),
            amount,
            timestamp,
        }
    }

    /// Create the reward credited to the node that sealed a block
    pub fn reward(recipient: impl Into<String>) -> Self {
        Self::new(Self::REWARD_SENDER, recipient, Self::REWARD_AMOUNT)
    }

    /// Check if this is a system-minted reward
    pub fn is_reward(&self) -> bool {
        self.sender == Self::REWARD_SENDER
    }
}
