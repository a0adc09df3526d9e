//! Confirmation poller behavior.

use std::sync::Arc;
use std::time::Duration;

use algo_wallet::blockchain::types::{NodeError, TransactionId};
use algo_wallet::lifecycle::Shutdown;
use algo_wallet::payments::{ConfirmationMonitor, ConfirmationOutcome, PollQueryError};

mod common;
use common::{MockNode, START_LAST_ROUND};

fn tx_id() -> TransactionId {
    TransactionId::from("7FHQKJSZ6IT5XBYRCJXOVNVPBWJEFLWUJ7VGPQJNEKHKNIVX4BIA")
}

#[tokio::test]
async fn test_never_confirming_node_spends_exact_budget() {
    for rounds in [1u64, 4, 7] {
        let node = Arc::new(MockNode::new());
        let monitor = ConfirmationMonitor::new(node.clone());

        let outcome = monitor.wait_for_confirmation(&tx_id(), rounds, None).await;

        assert_eq!(outcome, ConfirmationOutcome::TimedOut { rounds });
        assert_eq!(node.waits(), rounds as usize);
        assert_eq!(node.pending_queries(), rounds as usize);
    }
}

#[tokio::test]
async fn test_zero_budget_times_out_without_querying() {
    let node = Arc::new(MockNode::new());
    let outcome = ConfirmationMonitor::new(node.clone())
        .wait_for_confirmation(&tx_id(), 0, None)
        .await;

    assert_eq!(outcome, ConfirmationOutcome::TimedOut { rounds: 0 });
    assert_eq!(node.pending_queries(), 0);
    assert_eq!(node.waits(), 0);
}

#[tokio::test]
async fn test_unbounded_budget_still_polls() {
    let node = Arc::new(MockNode::new().already_confirmed(101));
    let outcome = ConfirmationMonitor::new(node.clone())
        .wait_for_confirmation(&tx_id(), u64::MAX, None)
        .await;

    match outcome {
        ConfirmationOutcome::Confirmed { round, .. } => assert_eq!(round, 101),
        other => panic!("expected confirmation, got {:?}", other),
    }
    assert_eq!(node.pending_queries(), 1);
    assert_eq!(node.waits(), 0);
}

#[tokio::test]
async fn test_pool_error_rejects_without_waiting() {
    let node = Arc::new(MockNode::new().pool_error("transaction already in ledger"));
    let outcome = ConfirmationMonitor::new(node.clone())
        .wait_for_confirmation(&tx_id(), 4, None)
        .await;

    assert_eq!(
        outcome,
        ConfirmationOutcome::Rejected {
            reason: "transaction already in ledger".to_string()
        }
    );
    assert_eq!(node.waits(), 0);
    assert_eq!(node.pending_queries(), 1);
}

#[tokio::test]
async fn test_confirmation_after_rounds() {
    let node = Arc::new(MockNode::new().confirm_after(3));
    let outcome = ConfirmationMonitor::new(node.clone())
        .wait_for_confirmation(&tx_id(), 4, None)
        .await;

    match outcome {
        ConfirmationOutcome::Confirmed { round, .. } => {
            assert_eq!(round, START_LAST_ROUND + 1 + 3)
        }
        other => panic!("expected confirmation, got {:?}", other),
    }
    assert_eq!(node.waits(), 3);
}

#[tokio::test]
async fn test_polling_confirmed_transaction_is_idempotent() {
    let node = Arc::new(MockNode::new().confirm_after(1));
    let monitor = ConfirmationMonitor::new(node.clone());

    let first = monitor.wait_for_confirmation(&tx_id(), 4, None).await;
    let second = monitor.wait_for_confirmation(&tx_id(), 4, None).await;

    assert!(first.is_confirmed());
    assert_eq!(first, second);
    // The second poll finds it on the first query.
    assert_eq!(node.waits(), 1);
}

#[tokio::test]
async fn test_query_failure_is_reported_not_guessed() {
    let node = Arc::new(MockNode::new().fail_pending());
    let outcome = ConfirmationMonitor::new(node.clone())
        .wait_for_confirmation(&tx_id(), 4, None)
        .await;

    assert_eq!(
        outcome,
        ConfirmationOutcome::QueryFailed(PollQueryError {
            tx_id: tx_id(),
            source: NodeError::Transport("connection refused".to_string()),
        })
    );
    assert_eq!(node.waits(), 0);
}

#[tokio::test]
async fn test_round_wait_failure_is_query_failure() {
    let node = Arc::new(MockNode::new().fail_waits());
    let outcome = ConfirmationMonitor::new(node.clone())
        .wait_for_confirmation(&tx_id(), 4, None)
        .await;

    assert!(matches!(
        outcome,
        ConfirmationOutcome::QueryFailed(PollQueryError {
            source: NodeError::Timeout(10),
            ..
        })
    ));
    assert_eq!(node.waits(), 1);
}

#[tokio::test]
async fn test_cancellation_interrupts_round_wait() {
    let node = Arc::new(MockNode::new().hang_waits());
    let monitor = ConfirmationMonitor::new(node.clone());
    let shutdown = Shutdown::new();
    let mut cancel = shutdown.subscribe();

    let trigger = shutdown.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.trigger();
    });

    let outcome = tokio::time::timeout(
        Duration::from_secs(5),
        monitor.wait_for_confirmation(&tx_id(), 4, Some(&mut cancel)),
    )
    .await
    .expect("cancellation should end the wait");

    assert_eq!(outcome, ConfirmationOutcome::Cancelled);
    assert_eq!(node.pending_queries(), 1);
}

#[tokio::test]
async fn test_dropped_shutdown_does_not_cancel() {
    let node = Arc::new(MockNode::new());
    let shutdown = Shutdown::new();
    let mut cancel = shutdown.subscribe();
    drop(shutdown);

    let outcome = ConfirmationMonitor::new(node.clone())
        .wait_for_confirmation(&tx_id(), 2, Some(&mut cancel))
        .await;

    assert_eq!(outcome, ConfirmationOutcome::TimedOut { rounds: 2 });
    assert_eq!(node.waits(), 2);
}
