//! Confirmation polling.
//!
//! # Algorithm
//! ```text
//! start = last_round + 1
//! for round in start..start + budget:
//!     pending(tx_id) → confirmed?  Confirmed
//!                    → pool error? Rejected
//!     wait_for_block_after(round)   (raced against cancellation)
//! TimedOut
//! ```
//! The round wait is the only suspension point. It blocks on the node and
//! has no deadline of its own; the round budget bounds the whole poll.

use std::sync::Arc;
use tokio::sync::broadcast::{self, error::RecvError};

use crate::blockchain::client::NodeApi;
use crate::blockchain::types::{NodeError, TransactionId};
use crate::observability::metrics;
use crate::payments::types::{ConfirmationOutcome, PollQueryError};

/// Watches a submitted transaction until it reaches a terminal state.
#[derive(Clone)]
pub struct ConfirmationMonitor {
    node: Arc<dyn NodeApi>,
}

impl ConfirmationMonitor {
    pub fn new(node: Arc<dyn NodeApi>) -> Self {
        Self { node }
    }

    /// Poll `tx_id` for at most `rounds` rounds.
    ///
    /// Safe to call again for the same id, e.g. after `TimedOut` or
    /// `QueryFailed`.
    pub async fn wait_for_confirmation(
        &self,
        tx_id: &TransactionId,
        rounds: u64,
        cancel: Option<&mut broadcast::Receiver<()>>,
    ) -> ConfirmationOutcome {
        let mut waits = 0u64;
        let outcome = self.poll(tx_id, rounds, cancel, &mut waits).await;

        metrics::record_confirmation(outcome.kind(), waits);
        match &outcome {
            ConfirmationOutcome::Confirmed { round, .. } => {
                tracing::info!(tx_id = %tx_id, round, waits, "Transaction confirmed")
            }
            ConfirmationOutcome::Rejected { reason } => {
                tracing::warn!(tx_id = %tx_id, reason = %reason, "Transaction dropped from pool")
            }
            ConfirmationOutcome::TimedOut { rounds } => {
                tracing::warn!(tx_id = %tx_id, rounds, "Transaction not confirmed in time")
            }
            ConfirmationOutcome::QueryFailed(e) => {
                tracing::error!(tx_id = %tx_id, error = %e.source, "Confirmation status unknown")
            }
            ConfirmationOutcome::Cancelled => {
                tracing::info!(tx_id = %tx_id, waits, "Confirmation wait cancelled")
            }
        }
        outcome
    }

    async fn poll(
        &self,
        tx_id: &TransactionId,
        rounds: u64,
        mut cancel: Option<&mut broadcast::Receiver<()>>,
        waits: &mut u64,
    ) -> ConfirmationOutcome {
        let query_failed = |source: NodeError| {
            ConfirmationOutcome::QueryFailed(PollQueryError {
                tx_id: tx_id.clone(),
                source,
            })
        };

        let start_round = match self.node.status().await {
            Ok(status) => status.last_round.saturating_add(1),
            Err(e) => return query_failed(e),
        };
        let deadline = start_round.saturating_add(rounds);
        let mut current_round = start_round;
        tracing::debug!(tx_id = %tx_id, start_round, rounds, "Polling for confirmation");

        while current_round < deadline {
            let pending = match self.node.pending_transaction(tx_id).await {
                Ok(pending) => pending,
                Err(e) => return query_failed(e),
            };

            if pending.confirmed_round > 0 {
                return ConfirmationOutcome::Confirmed {
                    round: pending.confirmed_round,
                    transaction: pending,
                };
            }
            if !pending.pool_error.is_empty() {
                return ConfirmationOutcome::Rejected {
                    reason: pending.pool_error,
                };
            }

            tokio::select! {
                result = self.node.wait_for_block_after(current_round) => {
                    if let Err(e) = result {
                        return query_failed(e);
                    }
                }
                _ = cancelled(cancel.as_deref_mut()) => {
                    return ConfirmationOutcome::Cancelled;
                }
            }

            *waits += 1;
            current_round += 1;
            tracing::trace!(tx_id = %tx_id, round = current_round, "Round advanced");
        }

        ConfirmationOutcome::TimedOut { rounds }
    }
}

/// Resolves when cancellation is requested. Never resolves without a
/// receiver or once every sender is gone.
async fn cancelled(cancel: Option<&mut broadcast::Receiver<()>>) {
    match cancel {
        Some(rx) => match rx.recv().await {
            Ok(()) | Err(RecvError::Lagged(_)) => {}
            Err(RecvError::Closed) => std::future::pending().await,
        },
        None => std::future::pending().await,
    }
}
