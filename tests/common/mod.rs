//! Shared utilities for integration tests.
#![allow(dead_code)]

use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde_json::json;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::sync::Mutex;

use algo_wallet::blockchain::types::{
    AccountInfo, NodeError, NodeResult, NodeStatus, PendingTransaction, SuggestedParams,
    TransactionId,
};
use algo_wallet::blockchain::{Account, Address, NodeApi, Passphrase};
use algo_wallet::payments::SignedTransaction;

/// TestNet dispenser; any valid address works as a receiver.
pub const RECEIVER: &str = "GD64YIY3TWGDMCNPP553DZPPR6LDUSFQOIJVFDPPXWEG3FVOJCCDBBHU5A";

pub const START_LAST_ROUND: u64 = 100;
pub const MIN_FEE: u64 = 1000;

pub fn test_account() -> Account {
    Account::from_passphrase(Passphrase::from_seed(&[11u8; 32])).unwrap()
}

/// Scripted node. Every trait call is counted.
pub struct MockNode {
    calls: AtomicUsize,
    waits: AtomicUsize,
    pending_queries: AtomicUsize,
    last_round: AtomicU64,
    balance: AtomicU64,
    confirmed_round: Mutex<Option<u64>>,
    submitted: Mutex<Vec<SignedTransaction>>,
    confirm_after: Option<usize>,
    already_confirmed: Option<u64>,
    pool_error: Option<String>,
    fail_pending: bool,
    fail_waits: bool,
    hang_waits: bool,
    submit_error: Option<NodeError>,
    genesis_hash: String,
}

impl MockNode {
    /// A node that accepts everything and never confirms.
    pub fn new() -> Self {
        Self {
            calls: AtomicUsize::new(0),
            waits: AtomicUsize::new(0),
            pending_queries: AtomicUsize::new(0),
            last_round: AtomicU64::new(START_LAST_ROUND),
            balance: AtomicU64::new(0),
            confirmed_round: Mutex::new(None),
            submitted: Mutex::new(Vec::new()),
            confirm_after: None,
            already_confirmed: None,
            pool_error: None,
            fail_pending: false,
            fail_waits: false,
            hang_waits: false,
            submit_error: None,
            genesis_hash: "SGO1GKSzyE7IEPItTxCByw9x8FmnrCDexi9/cOUJOiI=".to_string(),
        }
    }

    pub fn with_balance(self, microalgos: u64) -> Self {
        self.balance.store(microalgos, Ordering::SeqCst);
        self
    }

    /// Confirm once `waits` round advances have happened.
    pub fn confirm_after(mut self, waits: usize) -> Self {
        self.confirm_after = Some(waits);
        self
    }

    /// Report the transaction as confirmed in `round` from the start.
    pub fn already_confirmed(mut self, round: u64) -> Self {
        self.already_confirmed = Some(round);
        self
    }

    pub fn pool_error(mut self, reason: &str) -> Self {
        self.pool_error = Some(reason.to_string());
        self
    }

    pub fn fail_pending(mut self) -> Self {
        self.fail_pending = true;
        self
    }

    pub fn fail_waits(mut self) -> Self {
        self.fail_waits = true;
        self
    }

    /// Round waits never return.
    pub fn hang_waits(mut self) -> Self {
        self.hang_waits = true;
        self
    }

    /// Serve this genesis hash in the suggested parameters.
    pub fn genesis_hash(mut self, hash: &str) -> Self {
        self.genesis_hash = hash.to_string();
        self
    }

    pub fn reject_submission(mut self, status: u16, message: &str) -> Self {
        self.submit_error = Some(NodeError::Status {
            status,
            message: message.to_string(),
        });
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn waits(&self) -> usize {
        self.waits.load(Ordering::SeqCst)
    }

    pub fn pending_queries(&self) -> usize {
        self.pending_queries.load(Ordering::SeqCst)
    }

    pub fn submitted(&self) -> Vec<SignedTransaction> {
        self.submitted.lock().unwrap().clone()
    }

    fn hit(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }

    fn current_round(&self) -> u64 {
        self.last_round.load(Ordering::SeqCst)
    }

    /// Round the transaction is confirmed in, if it is by now. The balance
    /// is debited the first time.
    fn confirmation(&self) -> Option<u64> {
        let mut confirmed = self.confirmed_round.lock().unwrap();
        if confirmed.is_none() {
            let due = match (self.already_confirmed, self.confirm_after) {
                (Some(round), _) => Some(round),
                (None, Some(after)) if self.waits() >= after => Some(self.current_round()),
                _ => None,
            };
            if let Some(round) = due {
                if let Some(signed) = self.submitted.lock().unwrap().last() {
                    let txn = signed.transaction();
                    self.balance.fetch_sub(txn.amount + txn.fee, Ordering::SeqCst);
                }
                *confirmed = Some(round);
            }
        }
        *confirmed
    }

    fn payload(&self) -> serde_json::Value {
        match self.submitted.lock().unwrap().last() {
            Some(signed) => {
                let txn = signed.transaction();
                json!({
                    "sig": STANDARD.encode(signed.signature()),
                    "txn": {
                        "amt": txn.amount,
                        "fee": txn.fee,
                        "fv": txn.first_valid,
                        "lv": txn.last_valid,
                        "note": STANDARD.encode(&txn.note),
                        "rcv": txn.receiver.to_string(),
                        "snd": txn.sender.to_string(),
                        "type": "pay",
                    }
                })
            }
            None => json!({}),
        }
    }
}

#[async_trait]
impl NodeApi for MockNode {
    async fn status(&self) -> NodeResult<NodeStatus> {
        self.hit();
        Ok(NodeStatus {
            last_round: self.current_round(),
            ..NodeStatus::default()
        })
    }

    async fn suggested_params(&self) -> NodeResult<SuggestedParams> {
        self.hit();
        Ok(SuggestedParams {
            consensus_version: "v38".to_string(),
            fee: 0,
            min_fee: MIN_FEE,
            genesis_id: "testnet-v1.0".to_string(),
            genesis_hash: self.genesis_hash.clone(),
            last_round: self.current_round(),
        })
    }

    async fn account_info(&self, address: &Address) -> NodeResult<AccountInfo> {
        self.hit();
        Ok(AccountInfo {
            address: address.to_string(),
            amount: self.balance.load(Ordering::SeqCst),
            min_balance: 100_000,
            round: self.current_round(),
            status: "Offline".to_string(),
        })
    }

    async fn send_raw_transaction(&self, signed: &SignedTransaction) -> NodeResult<TransactionId> {
        self.hit();
        if let Some(err) = &self.submit_error {
            return Err(err.clone());
        }
        self.submitted.lock().unwrap().push(signed.clone());
        Ok(signed.id().clone())
    }

    async fn pending_transaction(&self, _tx_id: &TransactionId) -> NodeResult<PendingTransaction> {
        self.hit();
        self.pending_queries.fetch_add(1, Ordering::SeqCst);

        if self.fail_pending {
            return Err(NodeError::Transport("connection refused".to_string()));
        }
        if let Some(reason) = &self.pool_error {
            return Ok(PendingTransaction {
                pool_error: reason.clone(),
                txn: self.payload(),
                ..PendingTransaction::default()
            });
        }

        Ok(PendingTransaction {
            confirmed_round: self.confirmation().unwrap_or(0),
            pool_error: String::new(),
            txn: self.payload(),
        })
    }

    async fn wait_for_block_after(&self, round: u64) -> NodeResult<NodeStatus> {
        self.hit();
        self.waits.fetch_add(1, Ordering::SeqCst);

        if self.hang_waits {
            std::future::pending::<()>().await;
        }
        if self.fail_waits {
            return Err(NodeError::Timeout(10));
        }

        self.last_round.fetch_max(round + 1, Ordering::SeqCst);
        Ok(NodeStatus {
            last_round: self.current_round(),
            ..NodeStatus::default()
        })
    }
}
