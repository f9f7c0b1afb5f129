//! Admit/deny decision for a scanned card.

use modulock_core::Uid;
use modulock_storage::CredentialStore;

/// Outcome of an authorization check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decision {
    /// Registered card; carries the holder's name.
    Admit(String),
    Deny,
}

impl Decision {
    pub fn is_admit(&self) -> bool {
        matches!(self, Decision::Admit(_))
    }
}

/// Stateless lookup of a scanned identifier in the roster.
#[derive(Debug, Clone, Copy)]
pub struct AuthorizationEngine<'a> {
    store: &'a CredentialStore,
}

impl<'a> AuthorizationEngine<'a> {
    pub fn new(store: &'a CredentialStore) -> Self {
        Self { store }
    }

    /// Canonicalize raw identifier bytes and look them up.
    ///
    /// An empty identifier is never admitted.
    pub fn authorize(&self, raw: &[u8]) -> Decision {
        match Uid::from_bytes(raw) {
            Ok(uid) => self.check(&uid),
            Err(_) => Decision::Deny,
        }
    }

    /// Look up an already canonical identifier.
    pub fn check(&self, uid: &Uid) -> Decision {
        match self.store.find_by_uid(uid) {
            Some(name) => Decision::Admit(name.to_string()),
            None => Decision::Deny,
        }
    }
}
