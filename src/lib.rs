//! Algorand wallet core: accounts, payments and confirmation tracking.

pub mod blockchain;
pub mod config;
pub mod lifecycle;
pub mod observability;
pub mod payments;
pub mod session;

pub use blockchain::{Account, Address, AlgodClient, IndexerClient, NodeApi, Passphrase};
pub use config::schema::AppConfig;
pub use lifecycle::Shutdown;
pub use payments::{ConfirmationOutcome, PaymentProcessor, SendError, SendReport};
pub use session::SessionStore;
