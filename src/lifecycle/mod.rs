//! Lifecycle management subsystem.
//!
//! # Data Flow
//! ```text
//! Signals (signals.rs):
//!     Ctrl-C → Shutdown::trigger
//!
//! Shutdown (shutdown.rs):
//!     trigger → every subscribed confirmation wait returns Cancelled
//! ```
//!
//! # Design Decisions
//! - Cancellation only interrupts the round-advance wait; a submission in
//!   flight is never abandoned halfway
//! - A second Ctrl-C is left to the default handler (process exit)

pub mod shutdown;
pub mod signals;

pub use shutdown::Shutdown;
