//! Indexer client for transaction history.

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Deserialize, Serialize};

use crate::blockchain::address::Address;
use crate::blockchain::transport::ApiTransport;
use crate::blockchain::types::{NodeConfig, NodeResult};

/// Payment fields of an indexed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct PaymentDetails {
    pub receiver: String,
    pub amount: u64,
    #[serde(default)]
    pub close_amount: u64,
}

/// Asset transfer fields of an indexed transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AssetTransferDetails {
    pub asset_id: u64,
    pub receiver: String,
    pub amount: u64,
}

/// A historical transaction as reported by the indexer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct IndexedTransaction {
    pub id: String,
    pub sender: String,
    #[serde(default)]
    pub fee: u64,
    #[serde(default)]
    pub confirmed_round: u64,
    #[serde(default)]
    pub round_time: u64,
    pub tx_type: String,
    /// Base64-encoded note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_transaction: Option<PaymentDetails>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub asset_transfer_transaction: Option<AssetTransferDetails>,
}

impl IndexedTransaction {
    pub fn receiver(&self) -> Option<&str> {
        self.payment_transaction
            .as_ref()
            .map(|p| p.receiver.as_str())
            .or_else(|| {
                self.asset_transfer_transaction
                    .as_ref()
                    .map(|a| a.receiver.as_str())
            })
    }

    /// Amount moved, in microalgos or asset base units.
    pub fn amount(&self) -> u64 {
        self.payment_transaction
            .as_ref()
            .map(|p| p.amount)
            .or_else(|| self.asset_transfer_transaction.as_ref().map(|a| a.amount))
            .unwrap_or(0)
    }

    pub fn asset_id(&self) -> Option<u64> {
        self.asset_transfer_transaction.as_ref().map(|a| a.asset_id)
    }

    pub fn decoded_note(&self) -> Option<Vec<u8>> {
        self.note.as_ref().and_then(|n| STANDARD.decode(n).ok())
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "kebab-case")]
struct SearchResponse {
    #[serde(default)]
    transactions: Vec<IndexedTransaction>,
}

/// Indexer REST client.
#[derive(Clone)]
pub struct IndexerClient {
    transport: ApiTransport,
}

impl IndexerClient {
    pub fn new(config: &NodeConfig) -> NodeResult<Self> {
        let transport = ApiTransport::new(
            &config.indexer_url,
            &[],
            &config.api_key_header,
            &config.api_key,
            config.request_timeout_secs,
        )?;
        Ok(Self { transport })
    }

    /// Transactions sent or received by `address`, newest first.
    pub async fn search_transactions(&self, address: &Address) -> NodeResult<Vec<IndexedTransaction>> {
        let response: SearchResponse = self
            .transport
            .get(&format!("v2/transactions?address={}", address))
            .await?;

        tracing::debug!(
            address = %address,
            count = response.transactions.len(),
            "Fetched transaction history"
        );
        Ok(response.transactions)
    }
}

impl std::fmt::Debug for IndexerClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IndexerClient")
            .field("indexer_url", &self.transport.primary().as_str())
            .finish()
    }
}
