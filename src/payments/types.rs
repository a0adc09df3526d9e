//! Payment pipeline types and error definitions.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;
use std::str::FromStr;
use thiserror::Error;

use crate::blockchain::address::{Address, AddressError};
use crate::blockchain::types::{NodeError, PendingTransaction, TransactionId, MICROALGOS_PER_ALGO};
use crate::blockchain::wallet::WalletError;
use crate::config::TransactionConfig;

/// Decimal places between algos and microalgos.
const ALGO_SCALE: u32 = 6;

/// How the fee of a new transaction is chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeePolicy {
    /// Use this many microalgos verbatim.
    Flat(u64),
    /// Fee per byte from the node's suggested parameters, at least the
    /// network minimum.
    Suggested,
}

impl FeePolicy {
    pub fn from_config(flat_fee: Option<u64>) -> Self {
        match flat_fee {
            Some(fee) => FeePolicy::Flat(fee),
            None => FeePolicy::Suggested,
        }
    }
}

/// A fully specified payment, ready to be signed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransactionRequest {
    pub sender: Address,
    pub receiver: Address,
    /// Microalgos.
    pub amount: u64,
    pub note: Vec<u8>,
    /// Microalgos.
    pub fee: u64,
    pub first_valid: u64,
    pub last_valid: u64,
    pub genesis_id: String,
    pub genesis_hash: Vec<u8>,
}

/// A signed payment together with its wire bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignedTransaction {
    transaction: TransactionRequest,
    signature: [u8; 64],
    id: TransactionId,
    encoded: Vec<u8>,
}

impl SignedTransaction {
    pub(crate) fn new(
        transaction: TransactionRequest,
        signature: [u8; 64],
        id: TransactionId,
        encoded: Vec<u8>,
    ) -> Self {
        Self {
            transaction,
            signature,
            id,
            encoded,
        }
    }

    pub fn transaction(&self) -> &TransactionRequest {
        &self.transaction
    }

    pub fn signature(&self) -> &[u8; 64] {
        &self.signature
    }

    /// Locally computed transaction id.
    pub fn id(&self) -> &TransactionId {
        &self.id
    }

    /// Canonical msgpack encoding, as submitted to the node.
    pub fn to_bytes(&self) -> &[u8] {
        &self.encoded
    }
}

/// A send request failed local validation. Nothing was sent.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BuildError {
    #[error("Amount must not be negative, got {0}")]
    NegativeAmount(i64),

    #[error("Invalid receiver address '{address}': {reason}")]
    InvalidReceiver {
        address: String,
        reason: AddressError,
    },

    #[error("Note is {len} bytes, maximum is {max}")]
    NoteTooLong { len: usize, max: usize },

    #[error("Invalid amount '{0}'")]
    InvalidAmount(String),

    #[error("Signing failed: {0}")]
    Signing(#[from] WalletError),

    #[error("Failed to encode transaction: {0}")]
    Encoding(String),
}

/// The node refused the transaction, or could not be reached.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SubmissionError {
    /// Reason as reported by the node.
    #[error("Transaction rejected: {0}")]
    Rejected(String),

    #[error(transparent)]
    Node(#[from] NodeError),
}

/// The pending pool could not be queried. The transaction may still land.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("Failed to query status of {tx_id}: {source}")]
pub struct PollQueryError {
    pub tx_id: TransactionId,
    pub source: NodeError,
}

/// Final state of one confirmation poll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfirmationOutcome {
    /// Included in `round`.
    Confirmed {
        round: u64,
        transaction: PendingTransaction,
    },
    /// Dropped from the pool.
    Rejected { reason: String },
    /// Round budget spent without a decision. The transaction may still
    /// confirm later.
    TimedOut { rounds: u64 },
    /// Status unknown.
    QueryFailed(PollQueryError),
    Cancelled,
}

impl ConfirmationOutcome {
    /// Label used for metrics and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            ConfirmationOutcome::Confirmed { .. } => "confirmed",
            ConfirmationOutcome::Rejected { .. } => "rejected",
            ConfirmationOutcome::TimedOut { .. } => "timed_out",
            ConfirmationOutcome::QueryFailed(_) => "query_failed",
            ConfirmationOutcome::Cancelled => "cancelled",
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, ConfirmationOutcome::Confirmed { .. })
    }
}

/// Errors returned by `PaymentProcessor::send`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum SendError {
    #[error(transparent)]
    Build(#[from] BuildError),

    #[error(transparent)]
    Submission(#[from] SubmissionError),
}

/// Result of a completed send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SendReport {
    pub tx_id: TransactionId,
    pub outcome: ConfirmationOutcome,
}

/// Per-send overrides of the configured defaults.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SendOptions {
    pub fee: FeePolicy,
    pub confirmation_rounds: u64,
}

impl From<&TransactionConfig> for SendOptions {
    fn from(config: &TransactionConfig) -> Self {
        Self {
            fee: FeePolicy::from_config(config.flat_fee),
            confirmation_rounds: config.confirmation_rounds,
        }
    }
}

/// Spendable state of an account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccountBalance {
    pub address: String,
    pub microalgos: u64,
    pub min_balance: u64,
    pub round: u64,
}

impl AccountBalance {
    pub fn algos(&self) -> Decimal {
        to_algos(self.microalgos)
    }
}

fn to_algos(microalgos: u64) -> Decimal {
    Decimal::from_i128_with_scale(microalgos as i128, ALGO_SCALE)
}

/// Parse a user-entered algo amount ("1.5") into microalgos.
///
/// Negative amounts parse successfully; the builder rejects them.
pub fn parse_algos(input: &str) -> Result<i64, BuildError> {
    let invalid = || BuildError::InvalidAmount(input.to_string());

    let algos = Decimal::from_str(input.trim()).map_err(|_| invalid())?;
    let micro = algos
        .checked_mul(Decimal::from(MICROALGOS_PER_ALGO))
        .ok_or_else(invalid)?;
    if !micro.fract().is_zero() {
        return Err(invalid());
    }
    micro.to_i64().ok_or_else(invalid)
}

/// Render microalgos as algos with six decimals.
pub fn format_algos(microalgos: u64) -> String {
    to_algos(microalgos).to_string()
}
