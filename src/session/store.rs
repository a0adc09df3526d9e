//! In-memory session store.

use dashmap::DashMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

use crate::blockchain::address::Address;
use crate::blockchain::wallet::{Account, Passphrase, WalletError};

/// Opaque session handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionId(Uuid);

impl SessionId {
    fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.0, f)
    }
}

impl std::str::FromStr for SessionId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s).map(Self)
    }
}

/// Thread-safe map of session id to account. Clones share the same map.
#[derive(Clone, Default)]
pub struct SessionStore {
    inner: Arc<DashMap<SessionId, Account>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a new account and log it in.
    ///
    /// The passphrase is returned once so the user can write it down.
    pub fn signup(&self) -> Result<(SessionId, Passphrase), WalletError> {
        let account = Account::generate()?;
        let passphrase = account.passphrase().clone();
        let id = self.insert(account);
        Ok((id, passphrase))
    }

    /// Log in with an existing passphrase.
    pub fn login(&self, words: &str) -> Result<SessionId, WalletError> {
        let account = Account::from_passphrase(Passphrase::parse(words)?)?;
        Ok(self.insert(account))
    }

    fn insert(&self, account: Account) -> SessionId {
        let id = SessionId::new();
        tracing::info!(session = %id, address = %account.address(), "Session started");
        self.inner.insert(id, account);
        id
    }

    pub fn account(&self, id: &SessionId) -> Option<Account> {
        self.inner.get(id).map(|account| account.clone())
    }

    pub fn address(&self, id: &SessionId) -> Option<Address> {
        self.inner.get(id).map(|account| *account.address())
    }

    /// End a session. Returns false if it did not exist.
    pub fn logout(&self, id: &SessionId) -> bool {
        let removed = self.inner.remove(id).is_some();
        if removed {
            tracing::info!(session = %id, "Session ended");
        }
        removed
    }

    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}
