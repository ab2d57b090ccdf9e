//! One side of a cross-chain path

use super::ident;
use crate::error::PathError;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Channel ordering. Both ends of a path must agree on it.
///
/// Encoded as `ORDERED`/`UNORDERED`; decoding goes through `FromStr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Order {
    Ordered,
    #[default]
    Unordered,
}

impl Order {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Ordered => "ORDERED",
            Self::Unordered => "UNORDERED",
        }
    }
}

impl fmt::Display for Order {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<String> for Order {
    type Error = PathError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

impl From<Order> for String {
    fn from(order: Order) -> Self {
        order.as_str().to_string()
    }
}

impl FromStr for Order {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().trim_start_matches("ORDER_") {
            "ORDERED" => Ok(Self::Ordered),
            "UNORDERED" => Ok(Self::Unordered),
            _ => Err(PathError::UnknownOrder(s.to_string())),
        }
    }
}

/// Identifiers and channel configuration for one chain of a path
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathEnd {
    #[serde(rename = "chain-id")]
    pub chain_id: String,
    #[serde(rename = "client-id", default)]
    pub client_id: String,
    #[serde(rename = "connection-id", default)]
    pub connection_id: String,
    #[serde(rename = "channel-id", default)]
    pub channel_id: String,
    #[serde(rename = "port-id")]
    pub port_id: String,
    pub order: Order,
    #[serde(default)]
    pub version: String,
}

impl PathEnd {
    /// Check the end's identifiers. Handshake identifiers that have not been
    /// assigned yet are allowed to be empty.
    pub fn validate(&self) -> Result<(), PathError> {
        if self.chain_id.is_empty() {
            return Err(PathError::InvalidPathEnd {
                chain_id: String::new(),
                reason: "chain-id must not be empty".to_string(),
            });
        }

        let wrap = |e: PathError| PathError::InvalidPathEnd {
            chain_id: self.chain_id.clone(),
            reason: e.to_string(),
        };

        if !self.client_id.is_empty() {
            ident::validate_client_id(&self.client_id).map_err(wrap)?;
        }
        if !self.connection_id.is_empty() {
            ident::validate_connection_id(&self.connection_id).map_err(wrap)?;
        }
        if !self.channel_id.is_empty() {
            ident::validate_channel_id(&self.channel_id).map_err(wrap)?;
        }
        ident::validate_port_id(&self.port_id).map_err(wrap)?;

        Ok(())
    }

    /// True once client, connection and channel identifiers are all assigned
    pub fn is_handshake_ready(&self) -> bool {
        !self.client_id.is_empty() && !self.connection_id.is_empty() && !self.channel_id.is_empty()
    }

    pub fn is_ordered(&self) -> bool {
        self.order == Order::Ordered
    }
}

impl fmt::Display for PathEnd {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:cl({}):co({}):ch({}):pt({})",
            self.chain_id, self.client_id, self.connection_id, self.channel_id, self.port_id
        )
    }
}
