//! The send pipeline and account reads.

use std::sync::Arc;
use tokio::sync::broadcast;

use crate::blockchain::address::Address;
use crate::blockchain::client::NodeApi;
use crate::blockchain::indexer::{IndexedTransaction, IndexerClient};
use crate::blockchain::types::{NodeError, NodeResult, TransactionId};
use crate::blockchain::wallet::Account;
use crate::config::TransactionConfig;
use crate::payments::builder::TxBuilder;
use crate::payments::monitor::ConfirmationMonitor;
use crate::payments::submitter::Submitter;
use crate::payments::types::{
    AccountBalance, ConfirmationOutcome, SendError, SendOptions, SendReport,
};

/// Build → sign → submit → poll, strictly in sequence.
///
/// Holds no mutable state, so one processor can serve concurrent sends.
#[derive(Clone)]
pub struct PaymentProcessor {
    node: Arc<dyn NodeApi>,
    indexer: Option<IndexerClient>,
    builder: TxBuilder,
    submitter: Submitter,
    monitor: ConfirmationMonitor,
    config: TransactionConfig,
}

impl PaymentProcessor {
    pub fn new(node: Arc<dyn NodeApi>, config: TransactionConfig) -> Self {
        Self {
            builder: TxBuilder::new(node.clone(), &config),
            submitter: Submitter::new(node.clone()),
            monitor: ConfirmationMonitor::new(node.clone()),
            indexer: None,
            node,
            config,
        }
    }

    /// Attach an indexer for `history`.
    pub fn with_indexer(mut self, indexer: IndexerClient) -> Self {
        self.indexer = Some(indexer);
        self
    }

    /// Send `amount` microalgos from `account` to `receiver` using the
    /// configured fee policy and round budget.
    pub async fn send(
        &self,
        account: &Account,
        amount: i64,
        receiver: &str,
        note: &str,
    ) -> Result<SendReport, SendError> {
        let options = SendOptions::from(&self.config);
        self.send_with(account, amount, receiver, note.as_bytes(), &options, None)
            .await
    }

    /// `send` with explicit options and an optional cancellation signal for
    /// the confirmation wait.
    pub async fn send_with(
        &self,
        account: &Account,
        amount: i64,
        receiver: &str,
        note: &[u8],
        options: &SendOptions,
        cancel: Option<&mut broadcast::Receiver<()>>,
    ) -> Result<SendReport, SendError> {
        let request = self
            .builder
            .build(account.address(), amount, receiver, note, options.fee)
            .await?;
        let signed = self.builder.sign(account, request)?;
        let tx_id = self.submitter.submit(&signed).await?;

        let outcome = self
            .monitor
            .wait_for_confirmation(&tx_id, options.confirmation_rounds, cancel)
            .await;
        Ok(SendReport { tx_id, outcome })
    }

    /// Poll an already submitted transaction.
    pub async fn wait(
        &self,
        tx_id: &TransactionId,
        rounds: u64,
        cancel: Option<&mut broadcast::Receiver<()>>,
    ) -> ConfirmationOutcome {
        self.monitor.wait_for_confirmation(tx_id, rounds, cancel).await
    }

    pub async fn balance(&self, address: &Address) -> NodeResult<AccountBalance> {
        let info = self.node.account_info(address).await?;
        Ok(AccountBalance {
            address: info.address,
            microalgos: info.amount,
            min_balance: info.min_balance,
            round: info.round,
        })
    }

    /// Past transactions of `address`, from the indexer.
    pub async fn history(&self, address: &Address) -> NodeResult<Vec<IndexedTransaction>> {
        match &self.indexer {
            Some(indexer) => indexer.search_transactions(address).await,
            None => Err(NodeError::Config("No indexer configured".to_string())),
        }
    }

    pub fn config(&self) -> &TransactionConfig {
        &self.config
    }
}
