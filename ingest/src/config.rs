//! Ingestion configuration with TOML file support.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::IngestError;

/// Configuration for one ingestion pipeline.
///
/// Can be loaded from a TOML file via [`IngestConfig::from_toml_file`] or
/// built programmatically (e.g. for tests). The chain-source credential is
/// deliberately excluded from serialisation — it arrives via CLI flag or
/// environment variable only.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Identifier of the chain being ingested; the checkpoint key.
    #[serde(default = "default_chain_id")]
    pub chain_id: String,

    /// JSON-RPC endpoint of the chain data source.
    #[serde(default = "default_rpc_url")]
    pub rpc_url: String,

    /// Access credential for the chain data source (flag/env only).
    #[serde(skip)]
    pub api_key: String,

    /// Data directory for ledger storage.
    #[serde(default = "default_data_dir")]
    pub data_dir: PathBuf,

    /// Height the checkpoint is initialised to on first run; ingestion
    /// begins at `start_height + 1`.
    #[serde(default)]
    pub start_height: u64,

    /// Number of consecutive blocks fetched concurrently per batch.
    #[serde(default = "default_batch_size")]
    pub batch_size: u64,

    /// Seconds between tip re-polls once ingestion has caught up.
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// Log a progress line every this many blocks.
    #[serde(default = "default_progress_log_interval")]
    pub progress_log_interval: u64,

    /// Log format: "human" or "json".
    #[serde(default = "default_log_format")]
    pub log_format: String,

    /// Log level filter: "trace", "debug", "info", "warn", "error".
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

// ── Serde default helpers ──────────────────────────────────────────────

fn default_chain_id() -> String {
    "mainnet".to_string()
}

fn default_rpc_url() -> String {
    "http://localhost:8545".to_string()
}

fn default_data_dir() -> PathBuf {
    PathBuf::from("./tally_data")
}

fn default_batch_size() -> u64 {
    10
}

fn default_poll_interval_secs() -> u64 {
    5
}

fn default_progress_log_interval() -> u64 {
    100
}

fn default_log_format() -> String {
    "human".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

// ── Impl ───────────────────────────────────────────────────────────────

impl IngestConfig {
    /// Load configuration from a TOML file.
    pub fn from_toml_file(path: &str) -> Result<Self, IngestError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| IngestError::Config(e.to_string()))?;
        Self::from_toml_str(&content)
    }

    /// Parse configuration from a TOML string.
    pub fn from_toml_str(s: &str) -> Result<Self, IngestError> {
        toml::from_str(s).map_err(|e| IngestError::Config(e.to_string()))
    }

    /// Serialize the configuration to a TOML string.
    pub fn to_toml_string(&self) -> String {
        toml::to_string_pretty(self).expect("IngestConfig is always serializable to TOML")
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            chain_id: default_chain_id(),
            rpc_url: default_rpc_url(),
            api_key: String::new(),
            data_dir: default_data_dir(),
            start_height: 0,
            batch_size: default_batch_size(),
            poll_interval_secs: default_poll_interval_secs(),
            progress_log_interval: default_progress_log_interval(),
            log_format: default_log_format(),
            log_level: default_log_level(),
        }
    }
}
