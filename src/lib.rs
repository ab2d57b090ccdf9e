//! Handshake relayer - cross-chain path status and transaction authorization
//!
//! Tracks the client → connection → channel handshake between two ledgers
//! and provides the signing authorities used to submit handshake
//! transactions.

pub mod chain;
pub mod config;
pub mod error;
pub mod metrics;
pub mod path;
pub mod tx;

pub use chain::{ChainCapability, Height, QueryContext, QueryScope};
pub use error::{PathError, RelayerError, RelayerResult};
pub use path::{gen_path, query_path_status, Order, Path, PathEnd, PathStatus, PathWithStatus, Paths};
pub use tx::{Authority, EthereumAuthority, ReadAuthority, WriteAuthority};
