//! algod REST client.
//!
//! # Responsibilities
//! - Query chain state (status, suggested params, accounts, pending pool)
//! - Submit signed transactions
//! - Block on round advances for the confirmation poller
//! - Provide health check for node connectivity

use async_trait::async_trait;

use crate::blockchain::address::Address;
use crate::blockchain::transport::ApiTransport;
use crate::blockchain::types::{
    AccountInfo, NodeConfig, NodeResult, NodeStatus, PendingTransaction, SubmitResponse,
    SuggestedParams, TransactionId,
};
use crate::observability::metrics;
use crate::payments::types::SignedTransaction;

/// The node operations the payment pipeline depends on.
#[async_trait]
pub trait NodeApi: Send + Sync {
    /// Current status, including the last committed round.
    async fn status(&self) -> NodeResult<NodeStatus>;

    /// Fee and validity parameters for a new transaction.
    async fn suggested_params(&self) -> NodeResult<SuggestedParams>;

    /// Balance and status of an account.
    async fn account_info(&self, address: &Address) -> NodeResult<AccountInfo>;

    /// Submit a signed transaction. Never retried.
    async fn send_raw_transaction(&self, signed: &SignedTransaction) -> NodeResult<TransactionId>;

    /// Pool status of a transaction.
    async fn pending_transaction(&self, tx_id: &TransactionId) -> NodeResult<PendingTransaction>;

    /// Block until the node has seen the round after `round`.
    async fn wait_for_block_after(&self, round: u64) -> NodeResult<NodeStatus>;
}

/// algod client with read failover.
#[derive(Clone)]
pub struct AlgodClient {
    transport: ApiTransport,
    config: NodeConfig,
}

impl AlgodClient {
    /// Create a new client. No request is made until the first call.
    pub fn new(config: NodeConfig) -> NodeResult<Self> {
        let transport = ApiTransport::new(
            &config.algod_url,
            &config.failover_urls,
            &config.api_key_header,
            &config.api_key,
            config.request_timeout_secs,
        )?;

        tracing::debug!(algod_url = %config.algod_url, "algod client initialized");
        Ok(Self { transport, config })
    }

    /// Check if the node is reachable.
    pub async fn is_healthy(&self) -> bool {
        let healthy = self.status().await.is_ok();
        metrics::record_node_health(self.transport.primary().as_str(), healthy);
        healthy
    }

    pub fn config(&self) -> &NodeConfig {
        &self.config
    }
}

#[async_trait]
impl NodeApi for AlgodClient {
    async fn status(&self) -> NodeResult<NodeStatus> {
        self.transport.get("v2/status").await
    }

    async fn suggested_params(&self) -> NodeResult<SuggestedParams> {
        self.transport.get("v2/transactions/params").await
    }

    async fn account_info(&self, address: &Address) -> NodeResult<AccountInfo> {
        self.transport.get(&format!("v2/accounts/{}", address)).await
    }

    async fn send_raw_transaction(&self, signed: &SignedTransaction) -> NodeResult<TransactionId> {
        let response: SubmitResponse = self
            .transport
            .post_bytes("v2/transactions", "application/x-binary", signed.to_bytes().to_vec())
            .await?;
        Ok(TransactionId::new(response.tx_id))
    }

    async fn pending_transaction(&self, tx_id: &TransactionId) -> NodeResult<PendingTransaction> {
        self.transport
            .get(&format!("v2/transactions/pending/{}", tx_id))
            .await
    }

    async fn wait_for_block_after(&self, round: u64) -> NodeResult<NodeStatus> {
        self.transport
            .get_blocking(&format!("v2/status/wait-for-block-after/{}", round))
            .await
    }
}

impl std::fmt::Debug for AlgodClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AlgodClient")
            .field("algod_url", &self.config.algod_url)
            .field("failover_urls", &self.config.failover_urls)
            .field("timeout_secs", &self.config.request_timeout_secs)
            .finish()
    }
}
