// Ledger engine

mod blockchain;

pub use blockchain::Blockchain;
