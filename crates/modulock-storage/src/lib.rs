//! Roster persistence for the modulock access controller.
//!
//! The roster is a single JSON document (`{"users": [...]}`) rewritten in
//! full after every mutation. [`CredentialStore`] keeps the authoritative
//! in-memory copy and enforces RA and UID uniqueness; a [`RosterBackend`]
//! decides where the document lives.
//!
//! # Examples
//!
//! ```
//! use modulock_storage::{CredentialStore, MemoryBackend};
//! use modulock_core::Uid;
//!
//! let mut store = CredentialStore::new(MemoryBackend::new());
//! store.add("R1", "Alice", "ab12cd34").unwrap();
//!
//! let uid = Uid::parse("AB12CD34").unwrap();
//! assert_eq!(store.find_by_uid(&uid), Some("Alice"));
//! ```

pub mod backend;
pub mod credential_store;
pub mod document;
pub mod error;

pub use backend::{JsonFileBackend, MemoryBackend, RosterBackend, RosterFileConfig};
pub use credential_store::CredentialStore;
pub use error::{StorageError, StorageResult};
