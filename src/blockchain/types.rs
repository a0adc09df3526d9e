//! Node API types and error definitions.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

pub use crate::config::schema::NodeConfig;

/// Number of microalgos in one algo.
pub const MICROALGOS_PER_ALGO: u64 = 1_000_000;

/// Errors that can occur while talking to the node or indexer.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum NodeError {
    /// Connection failed or the response body could not be read.
    #[error("Transport error: {0}")]
    Transport(String),

    /// Request exceeded its deadline.
    #[error("Request timed out after {0} seconds")]
    Timeout(u64),

    /// The service answered with a non-success status.
    #[error("Node returned status {status}: {message}")]
    Status { status: u16, message: String },

    /// Response body did not match the expected shape.
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Client could not be constructed from configuration.
    #[error("Invalid client configuration: {0}")]
    Config(String),
}

/// Result type for node operations.
pub type NodeResult<T> = Result<T, NodeError>;

/// Identifier of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TransactionId(String);

impl TransactionId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TransactionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TransactionId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// `GET /v2/status`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NodeStatus {
    pub last_round: u64,
    #[serde(default)]
    pub time_since_last_round: u64,
    #[serde(default)]
    pub catchup_time: u64,
    #[serde(default)]
    pub last_version: String,
}

/// `GET /v2/transactions/params`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct SuggestedParams {
    #[serde(default)]
    pub consensus_version: String,
    /// Fee per byte in microalgos.
    pub fee: u64,
    pub min_fee: u64,
    pub genesis_id: String,
    /// Base64-encoded genesis hash.
    pub genesis_hash: String,
    pub last_round: u64,
}

impl SuggestedParams {
    /// Decode the genesis hash.
    pub fn genesis_hash_bytes(&self) -> NodeResult<Vec<u8>> {
        STANDARD
            .decode(&self.genesis_hash)
            .map_err(|e| NodeError::Decode(format!("genesis hash: {}", e)))
    }
}

/// `GET /v2/accounts/{address}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AccountInfo {
    pub address: String,
    /// Balance in microalgos.
    pub amount: u64,
    #[serde(default)]
    pub min_balance: u64,
    #[serde(default)]
    pub round: u64,
    #[serde(default)]
    pub status: String,
}

/// `GET /v2/transactions/pending/{id}`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PendingTransaction {
    /// Round of inclusion, 0 while pending.
    #[serde(default)]
    pub confirmed_round: u64,
    /// Non-empty when the pool dropped the transaction.
    #[serde(default)]
    pub pool_error: String,
    /// The signed transaction as reported by the node.
    #[serde(default)]
    pub txn: serde_json::Value,
}

impl PendingTransaction {
    pub fn is_confirmed(&self) -> bool {
        self.confirmed_round > 0
    }

    /// Decoded note field of the reported transaction.
    pub fn note(&self) -> Option<Vec<u8>> {
        self.txn
            .pointer("/txn/note")
            .and_then(|v| v.as_str())
            .and_then(|s| STANDARD.decode(s).ok())
    }
}

/// `POST /v2/transactions` success body.
#[derive(Debug, Deserialize)]
pub(crate) struct SubmitResponse {
    #[serde(rename = "txId")]
    pub tx_id: String,
}

/// Error body returned by both algod and the indexer.
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    pub message: String,
}
