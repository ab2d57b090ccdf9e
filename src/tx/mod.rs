//! Transaction authorization: read identities and guarded transaction signing

pub mod authority;
pub mod ethereum;

pub use authority::{Authority, ReadAuthority, WriteAuthority};
pub use ethereum::{parse_chain_id, EthereumAuthority, SignedTransaction, DEFAULT_GAS_LIMIT};
