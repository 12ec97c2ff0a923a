//! Application configuration.
//!
//! Sources are layered: built-in defaults, then an optional TOML file, then
//! `TRADEBOOK__`-prefixed environment variables (`__` separates nested keys,
//! e.g. `TRADEBOOK__STORE__KEYSPACE=demo`). Command-line flags are applied on
//! top by the binary, which then calls [`AppConfig::validate`].

use ::config::{Config, Environment, File};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// File picked up from the working directory when no path is given.
pub const DEFAULT_CONFIG_FILE: &str = "tradebook.toml";

const ENV_PREFIX: &str = "TRADEBOOK";

pub const SUPPORTED_PROTOCOL_VERSIONS: std::ops::RangeInclusive<u8> = 3..=5;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(#[from] ::config::ConfigError),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// How the position counter is bumped after a trade is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PositionUpdateMode {
    /// Read the row, add one, write it back. Concurrent writers to the same
    /// pair can lose increments.
    #[default]
    ReadModifyWrite,
    /// Lightweight transactions: create with IF NOT EXISTS, bump with
    /// `IF quantity = <read value>`. A lost race is reported as a conflict.
    CompareAndSet,
}

/// Connection parameters for the store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Contact points, `host` or `host:port`.
    pub hosts: Vec<String>,
    pub keyspace: String,
    pub protocol_version: u8,
    pub replication_factor: u32,
    /// Where the embedded store keeps its data between runs. `None` keeps
    /// everything in memory only.
    pub snapshot_path: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            hosts: vec!["127.0.0.1:9042".to_string()],
            keyspace: "tradebook".to_string(),
            protocol_version: 3,
            replication_factor: 1,
            snapshot_path: Some(PathBuf::from("./data/tradebook.json")),
        }
    }
}

/// Bounds for the synthetic data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratorConfig {
    /// Upper bound (inclusive) for the share count of a trade.
    pub max_shares: i64,
    pub min_price: f64,
    /// Upper bound (exclusive) for the unit price of a trade.
    pub max_price: f64,
    pub max_cash_balance: f64,
    pub accounts_per_user_max: u32,
    pub transactions_per_account_max: u32,
    /// Fixed seed for reproducible data sets.
    pub seed: Option<u64>,
    pub position_updates: PositionUpdateMode,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            max_shares: 10_000_000,
            min_price: 0.1,
            max_price: 3000.0,
            max_cash_balance: 10_000_000.0,
            accounts_per_user_max: 3,
            transactions_per_account_max: 10,
            seed: None,
            position_updates: PositionUpdateMode::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Rows fetched per round trip.
    pub page_size: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self { page_size: 10 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Default log filter, overridden by `RUST_LOG`.
    pub log_level: String,
    pub store: StoreConfig,
    pub generator: GeneratorConfig,
    pub query: QueryConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            store: StoreConfig::default(),
            generator: GeneratorConfig::default(),
            query: QueryConfig::default(),
        }
    }
}

impl AppConfig {
    /// Loads the layered configuration.
    ///
    /// # Arguments
    ///
    /// * `path` - Explicit configuration file. When `None`, `tradebook.toml`
    ///   in the working directory is used if it exists.
    ///
    /// # Returns
    ///
    /// * `Ok(AppConfig)` with every source merged and validated.
    /// * `Err(ConfigError)` if a source cannot be read or a value is invalid.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::load_with_prefix(path, ENV_PREFIX)
    }

    fn load_with_prefix(path: Option<&Path>, env_prefix: &str) -> Result<Self, ConfigError> {
        let file = match path {
            Some(path) => File::from(path).required(true),
            None => File::with_name(DEFAULT_CONFIG_FILE).required(false),
        };

        let settings = Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix(env_prefix).separator("__"))
            .build()?;

        let config: AppConfig = settings.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Rejects values the rest of the system cannot work with.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: &str| Err(ConfigError::Invalid(msg.to_string()));

        if self.store.hosts.is_empty() || self.store.hosts.iter().any(|h| h.trim().is_empty()) {
            return invalid("store.hosts must list at least one non-empty host");
        }
        if self.store.keyspace.trim().is_empty() {
            return invalid("store.keyspace must not be empty");
        }
        if !SUPPORTED_PROTOCOL_VERSIONS.contains(&self.store.protocol_version) {
            return Err(ConfigError::Invalid(format!(
                "store.protocol_version {} is not supported (expected {}..={})",
                self.store.protocol_version,
                SUPPORTED_PROTOCOL_VERSIONS.start(),
                SUPPORTED_PROTOCOL_VERSIONS.end()
            )));
        }
        if self.store.replication_factor == 0 {
            return invalid("store.replication_factor must be at least 1");
        }

        let generator = &self.generator;
        if generator.max_shares < 1 {
            return invalid("generator.max_shares must be at least 1");
        }
        if !(generator.min_price > 0.0 && generator.min_price < generator.max_price) {
            return invalid("generator prices must satisfy 0 < min_price < max_price");
        }
        if !(generator.max_cash_balance > 0.0) {
            return invalid("generator.max_cash_balance must be positive");
        }
        if generator.accounts_per_user_max == 0 || generator.transactions_per_account_max == 0 {
            return invalid("generator per-user and per-account maxima must be at least 1");
        }

        if self.query.page_size == 0 {
            return invalid("query.page_size must be at least 1");
        }
        Ok(())
    }
}
