//! Payment pipeline.
//!
//! # Data Flow
//! ```text
//! send(account, amount, receiver, note)
//!     → builder.rs (validate, suggested params, fee, sign)
//!     → encoding.rs (canonical msgpack, transaction id)
//!     → submitter.rs (single POST, never retried)
//!     → monitor.rs (round-bounded confirmation poll)
//!     → SendReport { tx_id, outcome }
//! ```

pub mod builder;
pub mod encoding;
pub mod monitor;
pub mod processor;
pub mod submitter;
pub mod types;

pub use builder::TxBuilder;
pub use monitor::ConfirmationMonitor;
pub use processor::PaymentProcessor;
pub use submitter::Submitter;
pub use types::{
    parse_algos, AccountBalance, BuildError, ConfirmationOutcome, FeePolicy, PollQueryError,
    SendError, SendOptions, SendReport, SignedTransaction, SubmissionError, TransactionRequest,
};
