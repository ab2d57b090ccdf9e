//! Path model - the pair of chain ends that form a cross-chain link
//!
//! This module provides:
//! - `PathEnd` and `Path` with structural validation
//! - Identifier generation from an injected random source
//! - The `Paths` registry
//! - The staged path status check

pub mod end;
pub mod ident;
pub mod registry;
pub mod status;

pub use end::{Order, PathEnd};
pub use registry::Paths;
pub use status::{query_path_status, PathStatus, PathWithStatus};

use crate::chain::{ChainCapability, QueryScope};
use crate::error::{PathError, RelayerResult};

use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Strategy used when none is configured
pub const DEFAULT_STRATEGY: &str = "naive";

/// Policy tag describing how the path is driven once open
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StrategyConfig {
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub params: BTreeMap<String, String>,
}

impl StrategyConfig {
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            params: BTreeMap::new(),
        }
    }

    pub fn validate(&self) -> Result<(), PathError> {
        if self.kind.trim().is_empty() {
            return Err(PathError::InvalidStrategy(
                "strategy type must not be empty".to_string(),
            ));
        }
        Ok(())
    }
}

impl Default for StrategyConfig {
    fn default() -> Self {
        Self::new(DEFAULT_STRATEGY)
    }
}

/// A pair of chains and the identifiers needed to relay over them
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Path {
    pub src: PathEnd,
    pub dst: PathEnd,
    #[serde(default)]
    pub strategy: StrategyConfig,
}

impl Path {
    pub fn new(src: PathEnd, dst: PathEnd) -> Self {
        Self {
            src,
            dst,
            strategy: StrategyConfig::default(),
        }
    }

    pub fn gen_src_client_id<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.src.client_id = ident::generate_id(rng);
    }

    pub fn gen_dst_client_id<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.dst.client_id = ident::generate_id(rng);
    }

    pub fn gen_src_conn_id<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.src.connection_id = ident::generate_id(rng);
    }

    pub fn gen_dst_conn_id<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.dst.connection_id = ident::generate_id(rng);
    }

    pub fn gen_src_chan_id<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.src.channel_id = ident::generate_id(rng);
    }

    pub fn gen_dst_chan_id<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        self.dst.channel_id = ident::generate_id(rng);
    }

    /// True if the path is ordered
    pub fn ordered(&self) -> bool {
        self.src.is_ordered()
    }

    /// Check that a path is valid. Checks run in a fixed sequence and the
    /// first failure is returned.
    pub fn validate(&self) -> Result<(), PathError> {
        self.src.validate()?;
        if self.src.version.is_empty() {
            return Err(PathError::MissingVersion { side: "source" });
        }
        self.dst.validate()?;
        if self.dst.version.is_empty() {
            return Err(PathError::MissingVersion {
                side: "destination",
            });
        }
        self.strategy.validate()?;
        if self.src.order != self.dst.order {
            return Err(PathError::OrderMismatch {
                src: self.src.order,
                dst: self.dst.order,
            });
        }
        Ok(())
    }

    /// Returns the end matching `chain_id`, or an empty end (empty port id)
    /// when neither side matches
    pub fn end(&self, chain_id: &str) -> &PathEnd {
        static NO_MATCH: PathEnd = PathEnd {
            chain_id: String::new(),
            client_id: String::new(),
            connection_id: String::new(),
            channel_id: String::new(),
            port_id: String::new(),
            order: Order::Unordered,
            version: String::new(),
        };

        if self.dst.chain_id == chain_id {
            &self.dst
        } else if self.src.chain_id == chain_id {
            &self.src
        } else {
            &NO_MATCH
        }
    }

    /// True when the path links exactly the chains `a` and `b`, in either direction
    pub fn connects(&self, a: &str, b: &str) -> bool {
        (self.src.chain_id == a && self.dst.chain_id == b)
            || (self.src.chain_id == b && self.dst.chain_id == a)
    }

    /// Run the staged status check against the two chains of this path
    pub async fn query_status<S, D>(&self, src: &S, dst: &D, scope: &QueryScope) -> PathWithStatus
    where
        S: ChainCapability + ?Sized,
        D: ChainCapability + ?Sized,
    {
        query_path_status(self, src, dst, scope).await
    }

    pub fn to_yaml(&self) -> RelayerResult<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    pub fn to_json(&self) -> RelayerResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn from_yaml(yaml: &str) -> RelayerResult<Self> {
        Ok(serde_yaml::from_str(yaml)?)
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[ ] {} ->\n {}", self.src, self.dst)
    }
}

/// Generate a path with random client, connection and channel identifiers
/// given chain ids and port ids
pub fn gen_path<R: Rng + ?Sized>(
    rng: &mut R,
    src_chain_id: &str,
    dst_chain_id: &str,
    src_port_id: &str,
    dst_port_id: &str,
    order: Order,
    version: &str,
) -> Path {
    let mut gen_end = |chain_id: &str, port_id: &str| PathEnd {
        chain_id: chain_id.to_string(),
        client_id: ident::generate_id(rng),
        connection_id: ident::generate_id(rng),
        channel_id: ident::generate_id(rng),
        port_id: port_id.to_string(),
        order,
        version: version.to_string(),
    };

    let src = gen_end(src_chain_id, src_port_id);
    let dst = gen_end(dst_chain_id, dst_port_id);
    Path::new(src, dst)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn sample_path() -> Path {
        gen_path(
            &mut StdRng::seed_from_u64(3),
            "ibc-0",
            "ibc-1",
            "transfer",
            "transfer",
            Order::Unordered,
            "ics20-1",
        )
    }

    #[test]
    fn test_gen_path_is_valid() {
        let mut rng = StdRng::seed_from_u64(11);
        for order in [Order::Ordered, Order::Unordered] {
            let path = gen_path(&mut rng, "ibc-0", "ibc-1", "transfer", "transfer", order, "ics20-1");
            assert!(path.validate().is_ok());
            assert!(path.src.is_handshake_ready());
            assert!(path.dst.is_handshake_ready());
            assert_eq!(path.strategy.kind, DEFAULT_STRATEGY);
            assert_eq!(path.ordered(), order == Order::Ordered);
        }
    }

    #[test]
    fn test_gen_path_assigns_distinct_ids() {
        let path = sample_path();
        assert_ne!(path.src.client_id, path.dst.client_id);
        assert_ne!(path.src.connection_id, path.src.channel_id);
    }

    #[test]
    fn test_regenerate_overwrites_identifier() {
        let mut path = sample_path();
        let mut rng = StdRng::seed_from_u64(99);

        let before = path.src.client_id.clone();
        path.gen_src_client_id(&mut rng);
        assert_ne!(path.src.client_id, before);
        assert_eq!(path.src.client_id.len(), ident::GENERATED_ID_LEN);

        let before = path.dst.channel_id.clone();
        path.gen_dst_chan_id(&mut rng);
        assert_ne!(path.dst.channel_id, before);

        path.gen_dst_client_id(&mut rng);
        path.gen_src_conn_id(&mut rng);
        path.gen_dst_conn_id(&mut rng);
        path.gen_src_chan_id(&mut rng);
        assert!(path.validate().is_ok());
    }

    #[test]
    fn test_order_mismatch_fails() {
        let mut path = sample_path();
        path.dst.order = Order::Ordered;
        assert_eq!(
            path.validate(),
            Err(PathError::OrderMismatch {
                src: Order::Unordered,
                dst: Order::Ordered,
            })
        );
    }

    #[test]
    fn test_missing_versions() {
        let mut path = sample_path();
        path.src.version.clear();
        assert_eq!(
            path.validate(),
            Err(PathError::MissingVersion { side: "source" })
        );

        let mut path = sample_path();
        path.dst.version.clear();
        assert_eq!(
            path.validate(),
            Err(PathError::MissingVersion {
                side: "destination"
            })
        );
    }

    #[test]
    fn test_first_violation_wins() {
        // src version is checked before the order comparison
        let mut path = sample_path();
        path.src.version.clear();
        path.dst.order = Order::Ordered;
        assert_eq!(
            path.validate(),
            Err(PathError::MissingVersion { side: "source" })
        );
    }

    #[test]
    fn test_empty_strategy_rejected() {
        let mut path = sample_path();
        path.strategy.kind.clear();
        assert!(matches!(path.validate(), Err(PathError::InvalidStrategy(_))));
    }

    #[test]
    fn test_end_lookup() {
        let path = sample_path();
        assert_eq!(path.end("ibc-0"), &path.src);
        assert_eq!(path.end("ibc-1"), &path.dst);

        let missing = path.end("ibc-9");
        assert!(missing.port_id.is_empty());
        assert!(missing.chain_id.is_empty());
    }

    #[test]
    fn test_yaml_round_trip() {
        let path = sample_path();
        let yaml = path.to_yaml().unwrap();
        assert!(yaml.contains("chain-id: ibc-0"));
        assert!(yaml.contains("order: UNORDERED"));
        assert!(yaml.contains("type: naive"));
        assert_eq!(Path::from_yaml(&yaml).unwrap(), path);
    }

    #[test]
    fn test_display() {
        let out = sample_path().to_string();
        assert!(out.starts_with("[ ] ibc-0:cl("));
        assert!(out.contains("->\n ibc-1:cl("));
    }
}
