//! Error types for the handshake relayer

use crate::path::Order;
use thiserror::Error;

/// Structural problems with a path or one of its ends
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PathError {
    #[error("invalid path end for chain '{chain_id}': {reason}")]
    InvalidPathEnd { chain_id: String, reason: String },

    #[error("{side} must specify a version")]
    MissingVersion { side: &'static str },

    #[error("invalid strategy: {0}")]
    InvalidStrategy(String),

    #[error(
        "both sides must have same order ('ORDERED' or 'UNORDERED'), got src({src}) and dst({dst})"
    )]
    OrderMismatch { src: Order, dst: Order },

    #[error("channel must be either 'ORDERED' or 'UNORDERED', got '{0}'")]
    UnknownOrder(String),

    #[error("identifier {id:?} is not a valid {kind} identifier: {reason}")]
    InvalidIdentifier {
        kind: &'static str,
        id: String,
        reason: String,
    },
}

/// Main error type for the relayer
#[derive(Error, Debug)]
pub enum RelayerError {
    #[error("Validation error: {0}")]
    Validation(#[from] PathError),

    #[error("path with name {name} already exists")]
    DuplicateName { name: String },

    #[error("path with name {name} does not exist")]
    PathNotFound { name: String },

    #[error("failed to find path in config between chains {src} and {dst}")]
    NoMatchingPath { src: String, dst: String },

    #[error("Query error on chain {chain_id}: {message}")]
    Query { chain_id: String, message: String },

    #[error("not authorized to sign for account {requested} (authority holds {expected})")]
    UnauthorizedSigner { expected: String, requested: String },

    #[error("Signing error on chain {chain_id}: {message}")]
    Signing { chain_id: String, message: String },

    #[error("Invalid private key: {0}")]
    InvalidKey(String),

    #[error("the chainID is invalid format: {0}")]
    InvalidChainId(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl RelayerError {
    /// Build a query error for a chain
    pub fn query(chain_id: impl Into<String>, message: impl ToString) -> Self {
        RelayerError::Query {
            chain_id: chain_id.into(),
            message: message.to_string(),
        }
    }

    /// Check if error is retryable
    pub fn is_retryable(&self) -> bool {
        matches!(self, RelayerError::Query { .. })
    }

    /// Check if error should trigger an alert
    pub fn should_alert(&self) -> bool {
        matches!(
            self,
            RelayerError::UnauthorizedSigner { .. } | RelayerError::Signing { .. }
        )
    }
}

impl From<serde_yaml::Error> for RelayerError {
    fn from(e: serde_yaml::Error) -> Self {
        RelayerError::Serialization(e.to_string())
    }
}

impl From<serde_json::Error> for RelayerError {
    fn from(e: serde_json::Error) -> Self {
        RelayerError::Serialization(e.to_string())
    }
}

/// Result type for relayer operations
pub type RelayerResult<T> = Result<T, RelayerError>;
