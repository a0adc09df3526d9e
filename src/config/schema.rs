//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the wallet.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};

/// Root configuration for the wallet.
#[derive(Debug, Clone, Deserialize, Serialize, Default, PartialEq)]
#[serde(default)]
pub struct AppConfig {
    /// Node and indexer endpoints.
    pub node: NodeConfig,

    /// Transaction building and confirmation settings.
    pub transactions: TransactionConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Node and indexer connection settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct NodeConfig {
    /// algod REST endpoint (e.g., "https://testnet-api.algonode.cloud").
    pub algod_url: String,

    /// Failover algod endpoints, used for reads only.
    pub failover_urls: Vec<String>,

    /// Indexer REST endpoint.
    pub indexer_url: String,

    /// Name of the header carrying the API key.
    pub api_key_header: String,

    /// API key sent with every request. Overridden by `ALGO_API_KEY`.
    pub api_key: String,

    /// Timeout for ordinary requests in seconds.
    ///
    /// The round-advance wait is not subject to this timeout.
    pub request_timeout_secs: u64,
}

impl Default for NodeConfig {
    fn default() -> Self {
        Self {
            algod_url: "https://testnet-algorand.api.purestake.io/ps2".to_string(),
            failover_urls: Vec::new(),
            indexer_url: "https://testnet-algorand.api.purestake.io/idx2".to_string(),
            api_key_header: "X-API-Key".to_string(),
            api_key: String::new(),
            request_timeout_secs: 10,
        }
    }
}

/// Transaction building and confirmation settings.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct TransactionConfig {
    /// Maximum number of rounds to wait for a confirmation.
    pub confirmation_rounds: u64,

    /// Width of the validity window (last valid - first valid).
    pub validity_rounds: u64,

    /// Maximum note length in bytes.
    pub max_note_bytes: usize,

    /// Flat fee in microalgos. When unset, the fee is derived from the
    /// node's suggested parameters.
    pub flat_fee: Option<u64>,
}

impl Default for TransactionConfig {
    fn default() -> Self {
        Self {
            confirmation_rounds: 4,
            validity_rounds: 1000,
            max_note_bytes: 1024,
            flat_fee: None,
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Log output format ("pretty" or "json").
    pub log_format: String,

    /// Enable the Prometheus metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            metrics_enabled: false,
            metrics_address: "127.0.0.1:9090".to_string(),
        }
    }
}
