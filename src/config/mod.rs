//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML, optional)
//!     → loader.rs (parse, deserialize, environment overrides)
//!     → validation.rs (semantic checks)
//!     → AppConfig (validated, immutable)
//!     → passed by reference to clients and the payment processor
//! ```
//!
//! # Design Decisions
//! - Config is loaded once per process; clients are built from it once
//! - All fields have defaults to allow minimal configs
//! - Secrets (API key) may come from the environment instead of the file

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, load_or_default, ConfigError};
pub use schema::AppConfig;
pub use schema::NodeConfig;
pub use schema::ObservabilityConfig;
pub use schema::TransactionConfig;
