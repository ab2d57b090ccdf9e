//! Configuration management for the handshake relayer
//!
//! Loads configuration from TOML files with environment variable substitution.

use crate::path::{Path, Paths};
use crate::tx::{EthereumAuthority, DEFAULT_GAS_LIMIT};

use anyhow::{Context, Result};
use lazy_static::lazy_static;
use regex::Regex;
use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::env;
use std::path::PathBuf;

/// Environment variable naming the config file
pub const CONFIG_ENV: &str = "HANDSHAKE_RELAYER_CONFIG";

lazy_static! {
    static ref ENV_VAR: Regex = Regex::new(r"\$\{([A-Z_][A-Z0-9_]*)\}").unwrap();
}

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub relayer: RelayerConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
    pub chains: HashMap<String, ChainConfig>,
    #[serde(default)]
    pub paths: BTreeMap<String, Path>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RelayerConfig {
    pub instance_id: String,
    #[serde(default = "default_gas_limit")]
    pub default_gas_limit: u64,
}

fn default_gas_limit() -> u64 {
    DEFAULT_GAS_LIMIT
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct MetricsConfig {
    pub enabled: bool,
    #[serde(default = "default_metrics_port")]
    pub port: u16,
}

fn default_metrics_port() -> u16 {
    9090
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChainConfig {
    pub chain_id: String,
    pub rpc_urls: Vec<String>,
    /// Environment variable holding the hex private key of the relayer account
    pub private_key_env: Option<String>,
    pub gas_limit: Option<u64>,
    pub enabled: bool,
}

impl ChainConfig {
    /// Build the signing authority for this chain, if a key is available
    pub fn authority(&self, default_gas_limit: u64) -> Result<Option<EthereumAuthority>> {
        let Some(var) = &self.private_key_env else {
            return Ok(None);
        };
        let Ok(key) = env::var(var) else {
            tracing::warn!("Chain {}: {} is not set, no signer", self.chain_id, var);
            return Ok(None);
        };

        let authority = EthereumAuthority::from_private_key(&key, &self.chain_id)
            .with_context(|| format!("Failed to load signing key for chain {}", self.chain_id))?
            .with_gas_limit(self.gas_limit.unwrap_or(default_gas_limit));
        Ok(Some(authority))
    }
}

impl Settings {
    /// Load settings from the file named by `HANDSHAKE_RELAYER_CONFIG`
    pub fn load() -> Result<Self> {
        let config_path = env::var(CONFIG_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("config/default.toml"));
        Self::load_from(&config_path)
    }

    pub fn load_from(config_path: &std::path::Path) -> Result<Self> {
        let config_str = std::fs::read_to_string(config_path)
            .with_context(|| format!("Failed to read config file: {:?}", config_path))?;
        Self::from_toml_str(&config_str)
    }

    pub fn from_toml_str(config_str: &str) -> Result<Self> {
        // Substitute environment variables
        let config_str = substitute_env_vars(config_str);

        let settings: Settings =
            toml::from_str(&config_str).with_context(|| "Failed to parse configuration")?;

        settings.validate()?;

        Ok(settings)
    }

    /// Validate configuration
    fn validate(&self) -> Result<()> {
        // At least one chain must be enabled
        if self.enabled_chains().is_empty() {
            anyhow::bail!("At least one chain must be enabled");
        }

        for (name, chain) in &self.chains {
            if chain.enabled && chain.rpc_urls.is_empty() {
                anyhow::bail!("Chain {} has no RPC URLs configured", name);
            }
        }

        for (name, path) in &self.paths {
            for end in [&path.src, &path.dst] {
                if self.get_chain_by_id(&end.chain_id).is_none() {
                    anyhow::bail!(
                        "Path {} references unknown chain {}",
                        name,
                        end.chain_id
                    );
                }
            }
        }

        // Surfaces path validation errors with the path name attached
        self.registry()?;

        Ok(())
    }

    /// Build the path registry from the configured paths
    pub fn registry(&self) -> Result<Paths> {
        let mut paths = Paths::new();
        for (name, path) in &self.paths {
            paths
                .add(name, path.clone())
                .with_context(|| format!("Invalid path {}", name))?;
        }
        Ok(paths)
    }

    /// Get list of enabled chains
    pub fn enabled_chains(&self) -> Vec<(&String, &ChainConfig)> {
        self.chains.iter().filter(|(_, c)| c.enabled).collect()
    }

    /// Get chain config by chain ID
    pub fn get_chain_by_id(&self, chain_id: &str) -> Option<&ChainConfig> {
        self.chains.values().find(|c| c.chain_id == chain_id)
    }
}

/// Substitute environment variables in the format ${VAR_NAME}
fn substitute_env_vars(input: &str) -> String {
    let mut result = input.to_string();

    for cap in ENV_VAR.captures_iter(input) {
        let var_name = &cap[1];
        let var_value = env::var(var_name).unwrap_or_default();
        result = result.replace(&cap[0], &var_value);
    }

    result
}
