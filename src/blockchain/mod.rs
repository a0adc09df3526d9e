//! Blockchain integration subsystem.
//!
//! # Data Flow
//! ```text
//! Passphrase (environment or session)
//!     → wallet.rs (passphrase decoding, scoped key derivation, signing)
//!     → address.rs (public key + checksum encoding)
//! Node / indexer endpoints (config)
//!     → transport.rs (API-key header, deadlines, read failover)
//!     → client.rs (algod: status, params, submit, pending, round wait)
//!     → indexer.rs (transaction history)
//! ```
//!
//! # Security Constraints
//! - Passphrases come from the environment or an explicit session only
//! - Never log passphrases, keys, or the API key
//! - Every call except the round-advance wait has a deadline

pub mod address;
pub mod client;
pub mod indexer;
pub(crate) mod transport;
pub mod types;
pub mod wallet;

pub use address::{Address, AddressError};
pub use client::{AlgodClient, NodeApi};
pub use indexer::{IndexedTransaction, IndexerClient};
pub use types::{NodeError, NodeResult, TransactionId};
pub use wallet::{Account, Passphrase, WalletError};
