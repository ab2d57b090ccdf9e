//! Query result types returned by chain backends

use crate::error::{RelayerError, RelayerResult};

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Ledger height at which state can be queried and proven
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct Height {
    pub revision_number: u64,
    pub revision_height: u64,
}

impl Height {
    pub fn new(revision_number: u64, revision_height: u64) -> Self {
        Self {
            revision_number,
            revision_height,
        }
    }
}

impl fmt::Display for Height {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.revision_number, self.revision_height)
    }
}

/// Lifecycle of a connection handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConnectionState {
    Uninitialized,
    Init,
    TryOpen,
    Open,
}

impl ConnectionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "UNINITIALIZED",
            Self::Init => "INIT",
            Self::TryOpen => "TRYOPEN",
            Self::Open => "OPEN",
        }
    }

    pub fn is_open(&self) -> bool {
        *self == Self::Open
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConnectionState {
    type Err = RelayerError;

    fn from_str(s: &str) -> RelayerResult<Self> {
        match s.to_uppercase().trim_start_matches("STATE_") {
            "UNINITIALIZED" | "UNINITIALIZED_UNSPECIFIED" => Ok(Self::Uninitialized),
            "INIT" => Ok(Self::Init),
            "TRYOPEN" => Ok(Self::TryOpen),
            "OPEN" => Ok(Self::Open),
            _ => Err(RelayerError::Internal(format!(
                "unknown connection state: {}",
                s
            ))),
        }
    }
}

/// Lifecycle of a channel handshake
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ChannelState {
    Uninitialized,
    Init,
    TryOpen,
    Open,
    Closed,
}

impl ChannelState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Uninitialized => "UNINITIALIZED",
            Self::Init => "INIT",
            Self::TryOpen => "TRYOPEN",
            Self::Open => "OPEN",
            Self::Closed => "CLOSED",
        }
    }

    pub fn is_open(&self) -> bool {
        *self == Self::Open
    }
}

impl fmt::Display for ChannelState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChannelState {
    type Err = RelayerError;

    fn from_str(s: &str) -> RelayerResult<Self> {
        match s.to_uppercase().trim_start_matches("STATE_") {
            "UNINITIALIZED" | "UNINITIALIZED_UNSPECIFIED" => Ok(Self::Uninitialized),
            "INIT" => Ok(Self::Init),
            "TRYOPEN" => Ok(Self::TryOpen),
            "OPEN" => Ok(Self::Open),
            "CLOSED" => Ok(Self::Closed),
            _ => Err(RelayerError::Internal(format!("unknown channel state: {}", s))),
        }
    }
}

/// Client state as read from a chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientStateResult {
    pub client_id: String,
    /// Client type tag, e.g. `07-tendermint`
    pub client_type: String,
    /// Latest counterparty height the client has verified
    pub latest_height: Height,
    /// Height the query was answered at
    pub proof_height: Height,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionResult {
    pub connection_id: String,
    pub client_id: String,
    pub state: ConnectionState,
    pub proof_height: Height,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChannelResult {
    pub channel_id: String,
    pub port_id: String,
    pub state: ChannelState,
    pub proof_height: Height,
}
