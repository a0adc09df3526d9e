//! Transaction submission.

use std::sync::Arc;

use crate::blockchain::client::NodeApi;
use crate::blockchain::types::{NodeError, TransactionId};
use crate::observability::metrics;
use crate::payments::types::{SignedTransaction, SubmissionError};

/// Sends signed transactions to the node, once each.
///
/// A failed submission is never repeated here: the original may still land,
/// so the caller has to rebuild with a fresh validity window instead.
#[derive(Clone)]
pub struct Submitter {
    node: Arc<dyn NodeApi>,
}

impl Submitter {
    pub fn new(node: Arc<dyn NodeApi>) -> Self {
        Self { node }
    }

    pub async fn submit(&self, signed: &SignedTransaction) -> Result<TransactionId, SubmissionError> {
        match self.node.send_raw_transaction(signed).await {
            Ok(tx_id) => {
                if &tx_id != signed.id() {
                    tracing::warn!(
                        tx_id = %tx_id,
                        local_id = %signed.id(),
                        "Node reported a different transaction id"
                    );
                }
                metrics::record_submission("accepted");
                tracing::info!(tx_id = %tx_id, "Transaction submitted");
                Ok(tx_id)
            }
            Err(NodeError::Status { status, message }) if (400..500).contains(&status) => {
                metrics::record_submission("rejected");
                tracing::warn!(tx_id = %signed.id(), status, reason = %message, "Transaction rejected");
                Err(SubmissionError::Rejected(message))
            }
            Err(e) => {
                metrics::record_submission("unavailable");
                tracing::error!(tx_id = %signed.id(), error = %e, "Submission failed");
                Err(SubmissionError::Node(e))
            }
        }
    }
}
