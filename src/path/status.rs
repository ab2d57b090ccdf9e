//! Staged path status check
//!
//! Determines how far the handshake of a path has progressed without touching
//! chain state. The check runs four stages in order:
//!
//! 1. Chains: latest height on both sides. These heights are fixed for the
//!    rest of the check.
//! 2. Clients: client state on both sides, both must exist.
//! 3. Connection: both connections must be OPEN.
//! 4. Channel: both channels must be OPEN.
//!
//! Each stage issues one query per side concurrently and waits for both.
//! A stage only starts once the previous one succeeded. Query failures end
//! the check and are never returned to the caller.

use super::Path;
use crate::chain::{ChainCapability, QueryContext, QueryScope};
use crate::error::RelayerResult;
use crate::metrics;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::future::Future;
use tracing::{debug, info, warn};

const CHECK: &str = "✔";
const X_ICON: &str = "✘";

/// Furthest point a status check reached
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Unstarted,
    ChainsReachable,
    ClientsExist,
    ConnectionOpen,
    ChannelOpen,
}

impl Stage {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Unstarted => "unstarted",
            Self::ChainsReachable => "chains",
            Self::ClientsExist => "clients",
            Self::ConnectionOpen => "connection",
            Self::ChannelOpen => "channel",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Status of the primitives in the path. Each flag implies the one before it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathStatus {
    pub chains: bool,
    pub clients: bool,
    pub connection: bool,
    pub channel: bool,
}

impl PathStatus {
    pub fn stage(&self) -> Stage {
        if self.channel {
            Stage::ChannelOpen
        } else if self.connection {
            Stage::ConnectionOpen
        } else if self.clients {
            Stage::ClientsExist
        } else if self.chains {
            Stage::ChainsReachable
        } else {
            Stage::Unstarted
        }
    }

    fn advance(&mut self, stage: Stage) {
        match stage {
            Stage::Unstarted => {}
            Stage::ChainsReachable => self.chains = true,
            Stage::ClientsExist => self.clients = true,
            Stage::ConnectionOpen => self.connection = true,
            Stage::ChannelOpen => self.channel = true,
        }
    }
}

/// Snapshot of a path and its status, produced fresh by each check
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PathWithStatus {
    path: Path,
    status: PathStatus,
    #[serde(rename = "last-error", skip_serializing_if = "Option::is_none")]
    last_error: Option<String>,
}

impl PathWithStatus {
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn status(&self) -> PathStatus {
        self.status
    }

    /// Query error that ended the check, if one did
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn to_yaml(&self) -> RelayerResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn to_json(&self) -> RelayerResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Multi-line human readable report of the path and its status
    pub fn render(&self, name: &str) -> String {
        let pth = &self.path;
        format!(
            "Path \"{}\" strategy({}):
  SRC({})
    ClientID:     {}
    ConnectionID: {}
    ChannelID:    {}
    PortID:       {}
  DST({})
    ClientID:     {}
    ConnectionID: {}
    ChannelID:    {}
    PortID:       {}
  STATUS:
    Chains:       {}
    Clients:      {}
    Connection:   {}
    Channel:      {}",
            name,
            pth.strategy.kind,
            pth.src.chain_id,
            pth.src.client_id,
            pth.src.connection_id,
            pth.src.channel_id,
            pth.src.port_id,
            pth.dst.chain_id,
            pth.dst.client_id,
            pth.dst.connection_id,
            pth.dst.channel_id,
            pth.dst.port_id,
            checkmark(self.status.chains),
            checkmark(self.status.clients),
            checkmark(self.status.connection),
            checkmark(self.status.channel),
        )
    }
}

fn checkmark(status: bool) -> &'static str {
    if status {
        CHECK
    } else {
        X_ICON
    }
}

/// Check how far the handshake of `path` has progressed on `src` and `dst`.
///
/// Always returns a snapshot: a stage that could not be evaluated reads as
/// not reached.
pub async fn query_path_status<S, D>(
    path: &Path,
    src: &S,
    dst: &D,
    scope: &QueryScope,
) -> PathWithStatus
where
    S: ChainCapability + ?Sized,
    D: ChainCapability + ?Sized,
{
    let mut status = PathStatus::default();
    let last_error = match run_stages(path, src, dst, scope, &mut status).await {
        Ok(()) => None,
        Err(e) => {
            warn!(
                "Path {} <-> {} status check stopped after stage '{}': {}",
                path.src.chain_id,
                path.dst.chain_id,
                status.stage(),
                e
            );
            Some(e.to_string())
        }
    };

    info!(
        "Path {} <-> {} reached stage '{}'",
        path.src.chain_id,
        path.dst.chain_id,
        status.stage()
    );
    metrics::record_path_status(status.stage());

    PathWithStatus {
        path: path.clone(),
        status,
        last_error,
    }
}

async fn run_stages<S, D>(
    path: &Path,
    src: &S,
    dst: &D,
    scope: &QueryScope,
    status: &mut PathStatus,
) -> RelayerResult<()>
where
    S: ChainCapability + ?Sized,
    D: ChainCapability + ?Sized,
{
    let src_id = path.src.chain_id.as_str();
    let dst_id = path.dst.chain_id.as_str();

    let (src_height, dst_height) = join_stage(
        Stage::ChainsReachable,
        (src_id, scope.run(src_id, src.latest_height())),
        (dst_id, scope.run(dst_id, dst.latest_height())),
    )
    .await?;
    status.advance(Stage::ChainsReachable);
    debug!(
        "Chains reachable: {} at {}, {} at {}",
        src_id, src_height, dst_id, dst_height
    );

    let src_ctx = QueryContext::new(scope.clone(), src_height);
    let dst_ctx = QueryContext::new(scope.clone(), dst_height);

    let (src_cs, dst_cs) = join_stage(
        Stage::ClientsExist,
        (src_id, scope.run(src_id, src.query_client_state(&src_ctx))),
        (dst_id, scope.run(dst_id, dst.query_client_state(&dst_ctx))),
    )
    .await?;
    if src_cs.is_none() || dst_cs.is_none() {
        debug!(
            "Client missing (src: {}, dst: {})",
            src_cs.is_some(),
            dst_cs.is_some()
        );
        return Ok(());
    }
    status.advance(Stage::ClientsExist);

    let (src_conn, dst_conn) = join_stage(
        Stage::ConnectionOpen,
        (src_id, scope.run(src_id, src.query_connection(&src_ctx))),
        (dst_id, scope.run(dst_id, dst.query_connection(&dst_ctx))),
    )
    .await?;
    if !src_conn.state.is_open() || !dst_conn.state.is_open() {
        debug!(
            "Connection not open (src: {}, dst: {})",
            src_conn.state, dst_conn.state
        );
        return Ok(());
    }
    status.advance(Stage::ConnectionOpen);

    let (src_chan, dst_chan) = join_stage(
        Stage::ChannelOpen,
        (src_id, scope.run(src_id, src.query_channel(&src_ctx))),
        (dst_id, scope.run(dst_id, dst.query_channel(&dst_ctx))),
    )
    .await?;
    if !src_chan.state.is_open() || !dst_chan.state.is_open() {
        debug!(
            "Channel not open (src: {}, dst: {})",
            src_chan.state, dst_chan.state
        );
        return Ok(());
    }
    status.advance(Stage::ChannelOpen);

    Ok(())
}

/// Run both side queries to completion, then fail with the src error first
async fn join_stage<A, B, FA, FB>(
    stage: Stage,
    (src_id, src): (&str, FA),
    (dst_id, dst): (&str, FB),
) -> RelayerResult<(A, B)>
where
    FA: Future<Output = RelayerResult<A>>,
    FB: Future<Output = RelayerResult<B>>,
{
    let (src, dst) = tokio::join!(src, dst);

    if src.is_err() {
        metrics::record_query_failure(src_id, stage);
    }
    if dst.is_err() {
        metrics::record_query_failure(dst_id, stage);
    }

    Ok((src?, dst?))
}
