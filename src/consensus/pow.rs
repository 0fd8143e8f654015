// Proof of Work implementation

use crate::core::sha256_hex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

/// Hex prefix a proof digest must start with
pub const DIFFICULTY_PREFIX: &str = "0000";

/// Digest of the `(last_proof, proof)` pair
pub fn proof_digest(last_proof: u64, proof: u64) -> String {
    sha256_hex(format!("{}{}", last_proof, proof).as_bytes())
}

/// Check whether `proof` satisfies the work predicate after `last_proof`
pub fn valid_proof(last_proof: u64, proof: u64) -> bool {
    proof_digest(last_proof, proof).starts_with(DIFFICULTY_PREFIX)
}

/// Smallest proof that satisfies the work predicate after `last_proof`
pub fn pow(last_proof: u64) -> u64 {
    let mut proof = 0;
    while !valid_proof(last_proof, proof) {
        proof += 1;
    }
    proof
}

/// Proof of Work miner with progress reporting and cancellation
pub struct Miner {
    /// How many attempts between cancellation checks and progress logs
    check_interval: u64,
}

impl Default for Miner {
    fn default() -> Self {
        Self::new()
    }
}

impl Miner {
    /// Create a miner with the default check interval
    pub fn new() -> Self {
        Self {
            check_interval: 10_000,
        }
    }

    /// Create a miner that checks for cancellation every `check_interval` attempts
    pub fn with_check_interval(check_interval: u64) -> Self {
        Self {
            check_interval: check_interval.max(1),
        }
    }

    /// Search for the proof following `last_proof`
    pub fn mine(&self, last_proof: u64) -> MiningResult {
        self.mine_until(last_proof, &AtomicBool::new(false))
    }

    /// Search for the proof following `last_proof`, stopping once `cancel` is set
    pub fn mine_until(&self, last_proof: u64, cancel: &AtomicBool) -> MiningResult {
        let start_time = Instant::now();
        let mut attempts = 0u64;

        for proof in 0..=u64::MAX {
            let digest = proof_digest(last_proof, proof);
            attempts += 1;

            if digest.starts_with(DIFFICULTY_PREFIX) {
                return MiningResult {
                    success: true,
                    proof,
                    digest,
                    attempts,
                    duration: start_time.elapsed(),
                };
            }

            if attempts % self.check_interval == 0 {
                if cancel.load(Ordering::Relaxed) {
                    log::info!("Proof search after {} cancelled at {} attempts", last_proof, attempts);
                    break;
                }

                let elapsed = start_time.elapsed();
                log::debug!("Mining attempts: {} ({:.1} KH/s)",
                    attempts,
                    attempts as f64 / elapsed.as_secs_f64() / 1000.0
                );
            }
        }

        MiningResult {
            success: false,
            proof: 0,
            digest: String::new(),
            attempts,
            duration: start_time.elapsed(),
        }
    }
}

/// Mining result
#[derive(Debug)]
pub struct MiningResult {
    /// Whether a proof was found before cancellation
    pub success: bool,
    /// The proof that was found
    pub proof: u64,
    /// Digest of the winning `(last_proof, proof)` pair
    pub digest: String,
    /// Number of attempts
    pub attempts: u64,
    /// Time taken
    pub duration: Duration,
}

impl MiningResult {
    /// Calculate hash rate (hashes per second)
    pub fn hash_rate(&self) -> f64 {
        self.attempts as f64 / self.duration.as_secs_f64().max(f64::EPSILON)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_proof_matches_digest_prefix() {
        for proof in 0..2_000 {
            let digest = proof_digest(100, proof);
            assert_eq!(valid_proof(100, proof), digest.starts_with("0000"));
        }
    }

    #[test]
    fn test_pow_is_minimal() {
        let proof = pow(100);
        assert!(valid_proof(100, proof));
        assert!(proof_digest(100, proof).starts_with("0000"));
        assert!((0..proof).all(|candidate| !valid_proof(100, candidate)));
    }

    #[test]
    fn test_pow_is_deterministic() {
        assert_eq!(pow(100), 35293);
        assert_eq!(pow(100), pow(100));
        assert_eq!(pow(35293), 35089);
    }

    #[test]
    fn test_miner_agrees_with_pow() {
        let result = Miner::new().mine(100);
        assert!(result.success);
        assert_eq!(result.proof, pow(100));
        assert_eq!(result.attempts, result.proof + 1);
        assert_eq!(result.digest, proof_digest(100, result.proof));
    }

    #[test]
    fn test_miner_stops_when_cancelled() {
        let cancel = AtomicBool::new(true);
        let result = Miner::with_check_interval(1).mine_until(100, &cancel);

        // The first attempt runs before the flag is polled
        assert!(!result.success);
        assert_eq!(result.attempts, 1);
    }

    #[test]
    fn test_hash_rate_is_finite() {
        let result = Miner::new().mine(100);
        assert!(result.hash_rate().is_finite());
    }
}
