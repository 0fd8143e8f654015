// Basic types shared by blocks and transactions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

/// Wall-clock time in seconds since the Unix epoch
pub type Timestamp = f64;

/// Current wall-clock time
pub fn now() -> Timestamp {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs_f64())
        .unwrap_or_default()
}

/// Link from a block to its predecessor.
///
/// On the wire the genesis marker is a JSON integer and a real link is a
/// JSON string, so both shapes must deserialize.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PreviousHash {
    /// Fixed marker carried by the genesis block
    Sentinel(u64),
    /// Hex digest of the preceding block
    Digest(String),
}

impl PreviousHash {
    /// Marker used by the genesis block
    pub fn genesis() -> Self {
        PreviousHash::Sentinel(1)
    }

    /// `0` and the empty string mean "link to the current tip"
    pub fn is_unset(&self) -> bool {
        match self {
            PreviousHash::Sentinel(value) => *value == 0,
            PreviousHash::Digest(digest) => digest.is_empty(),
        }
    }

    /// Check whether this link points at the given block digest
    pub fn links_to(&self, digest: &str) -> bool {
        matches!(self, PreviousHash::Digest(d) if d == digest)
    }
}

impl From<String> for PreviousHash {
    fn from(digest: String) -> Self {
        PreviousHash::Digest(digest)
    }
}

impl From<&str> for PreviousHash {
    fn from(digest: &str) -> Self {
        PreviousHash::Digest(digest.to_string())
    }
}

impl From<u64> for PreviousHash {
    fn from(value: u64) -> Self {
        PreviousHash::Sentinel(value)
    }
}

impl fmt::Display for PreviousHash {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PreviousHash::Sentinel(value) => write!(f, "{}", value),
            PreviousHash::Digest(digest) => write!(f, "{}", digest),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_previous_hash_wire_shapes() {
        let sentinel: PreviousHash = serde_json::from_str("1").unwrap();
        assert_eq!(sentinel, PreviousHash::genesis());

        let digest: PreviousHash = serde_json::from_str("\"abc\"").unwrap();
        assert_eq!(digest, PreviousHash::Digest("abc".to_string()));

        assert_eq!(serde_json::to_string(&PreviousHash::genesis()).unwrap(), "1");
        assert_eq!(serde_json::to_string(&digest).unwrap(), "\"abc\"");
    }

    #[test]
    fn test_previous_hash_unset() {
        assert!(PreviousHash::from(0).is_unset());
        assert!(PreviousHash::from("").is_unset());
        assert!(!PreviousHash::genesis().is_unset());
        assert!(!PreviousHash::from("00ff").is_unset());
    }

    #[test]
    fn test_previous_hash_links_to() {
        let link = PreviousHash::from("00ff");
        assert!(link.links_to("00ff"));
        assert!(!link.links_to("ff00"));
        assert!(!PreviousHash::genesis().links_to("1"));
    }

    #[test]
    fn test_now_is_after_epoch() {
        assert!(now() > 0.0);
    }
}
