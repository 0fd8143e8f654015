// Peer networking

mod peer;
mod source;
mod node;

pub use peer::{ChainSnapshot, normalize_address};
pub use source::{ChainSource, FetchError, HttpChainSource, StaticChainSource};
pub use node::{DEFAULT_MAX_CONCURRENT_FETCHES, Node};
