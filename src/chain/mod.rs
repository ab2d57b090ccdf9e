//! Chain module - the capability interface every ledger backend provides
//!
//! This module provides:
//! - `ChainCapability`, the height-scoped queries the status check needs
//! - Query scopes and contexts that bind a fixed height to a cancellable operation
//! - Client, connection and channel query results with their lifecycle states

pub mod query;
pub mod types;

pub use query::{QueryContext, QueryScope};
pub use types::{
    ChannelResult, ChannelState, ClientStateResult, ConnectionResult, ConnectionState, Height,
};

use crate::error::RelayerResult;

use async_trait::async_trait;

/// Operations a ledger client must offer for the path status check.
///
/// An implementation is bound to one end of a path, so the queries take only
/// a context: the client, connection and channel identifiers come from the
/// end the chain was configured with. Every failure is reported as
/// `RelayerError::Query`.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ChainCapability: Send + Sync {
    /// Most recent height the backend can produce proofs for
    async fn latest_height(&self) -> RelayerResult<Height>;

    /// Client state at the context height, `None` if the client does not exist
    async fn query_client_state(
        &self,
        ctx: &QueryContext,
    ) -> RelayerResult<Option<ClientStateResult>>;

    async fn query_connection(&self, ctx: &QueryContext) -> RelayerResult<ConnectionResult>;

    async fn query_channel(&self, ctx: &QueryContext) -> RelayerResult<ChannelResult>;
}
