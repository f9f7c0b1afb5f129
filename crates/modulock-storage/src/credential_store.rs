//! Authoritative roster of registered credentials.

use crate::backend::RosterBackend;
use modulock_core::{Credential, CredentialKey, Error, Ra, Result, RosterDocument, Uid};
use tracing::{info, warn};

/// Ordered collection of credentials with unique RA and unique UID.
///
/// Every successful mutation is persisted immediately. When persistence
/// fails the in-memory change is kept and `Error::Persistence` is returned,
/// so the caller learns that the roster on disk is behind.
pub struct CredentialStore {
    backend: Box<dyn RosterBackend>,
    users: Vec<Credential>,
}

impl std::fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CredentialStore")
            .field("backend", &self.backend.describe())
            .field("users", &self.users.len())
            .finish()
    }
}

impl CredentialStore {
    /// Create an empty store. Call [`load`](Self::load) to read persisted state.
    pub fn new(backend: impl RosterBackend + 'static) -> Self {
        Self {
            backend: Box::new(backend),
            users: Vec::new(),
        }
    }

    /// Create a store and load it, logging a load failure instead of returning it.
    pub fn open(backend: impl RosterBackend + 'static) -> Self {
        let mut store = Self::new(backend);
        if let Err(e) = store.load() {
            warn!(error = %e, "Starting with an empty roster");
        }
        store
    }

    /// Replace the in-memory roster with the persisted one.
    ///
    /// Nothing persisted yet yields an empty roster.
    ///
    /// # Errors
    ///
    /// Returns `Error::Persistence` if the document cannot be read or is
    /// malformed; the roster is left empty in that case.
    pub fn load(&mut self) -> Result<()> {
        match self.backend.load() {
            Ok(document) => {
                self.users = document.map(|d| d.users).unwrap_or_default();
                info!(
                    source = %self.backend.describe(),
                    count = self.users.len(),
                    "Roster loaded"
                );
                Ok(())
            }
            Err(e) => {
                self.users.clear();
                Err(e.into())
            }
        }
    }

    /// Write the full roster to the backend.
    pub fn save(&mut self) -> Result<()> {
        let document = self.snapshot();
        self.backend.save(&document).map_err(Error::from)
    }

    /// Register a new credential.
    ///
    /// # Errors
    ///
    /// - `Error::Validation` if any field is empty after trimming
    /// - `Error::Conflict` if the RA or the canonical UID is already registered
    /// - `Error::Persistence` if the addition could not be saved (it is kept in memory)
    pub fn add(&mut self, ra: &str, name: &str, uid: &str) -> Result<Credential> {
        let credential = Credential::new(ra, name, uid)?;

        if self.position_by_ra(&credential.ra).is_some() {
            return Err(Error::Conflict {
                key: CredentialKey::Ra,
                value: credential.ra.to_string(),
            });
        }
        if self.find_by_uid(&credential.uid).is_some() {
            return Err(Error::Conflict {
                key: CredentialKey::Uid,
                value: credential.uid.to_string(),
            });
        }

        self.users.push(credential.clone());
        info!(ra = %credential.ra, uid = %credential.uid, "Credential added");

        self.persist()?;
        Ok(credential)
    }

    /// Remove the credential with the given RA and return it.
    ///
    /// # Errors
    ///
    /// - `Error::Validation` if the RA is empty
    /// - `Error::NotFound` if no credential has that RA
    /// - `Error::Persistence` if the removal could not be saved (it is kept in memory)
    pub fn remove(&mut self, ra: &str) -> Result<Credential> {
        let ra = Ra::new(ra)?;
        let index = self.position_by_ra(&ra).ok_or_else(|| Error::NotFound {
            ra: ra.to_string(),
        })?;

        let removed = self.users.remove(index);
        info!(ra = %removed.ra, "Credential removed");

        self.persist()?;
        Ok(removed)
    }

    /// Name of the holder of `uid`, if registered.
    pub fn find_by_uid(&self, uid: &Uid) -> Option<&str> {
        self.users
            .iter()
            .find(|c| &c.uid == uid)
            .map(|c| c.name.as_str())
    }

    /// Credential registered under `ra`, if any.
    pub fn find_by_ra(&self, ra: &str) -> Option<&Credential> {
        let ra = ra.trim();
        self.users.iter().find(|c| c.ra.as_str() == ra)
    }

    /// All credentials in insertion order.
    pub fn list(&self) -> &[Credential] {
        &self.users
    }

    /// Owned copy of the roster, suitable for serialization.
    pub fn snapshot(&self) -> RosterDocument {
        RosterDocument::new(self.users.clone())
    }

    pub fn len(&self) -> usize {
        self.users.len()
    }

    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }

    fn position_by_ra(&self, ra: &Ra) -> Option<usize> {
        self.users.iter().position(|c| &c.ra == ra)
    }

    fn persist(&mut self) -> Result<()> {
        self.save().inspect_err(|e| {
            warn!(error = %e, source = %self.backend.describe(), "Roster change not persisted");
        })
    }
}
