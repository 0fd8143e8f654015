// Consensus and validation logic

pub mod pow;
pub mod validation;

pub use pow::{DIFFICULTY_PREFIX, Miner, MiningResult, pow, proof_digest, valid_proof};
pub use validation::{
    ValidationError, valid_chain, validate_chain, validate_link, validate_pending_order,
};
