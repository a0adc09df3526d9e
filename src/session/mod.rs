//! Logged-in accounts.
//!
//! Who is logged in is tracked here; how a transaction is signed stays with
//! `blockchain::wallet::Account`.

pub mod store;

pub use store::{SessionId, SessionStore};
