//! Roster persistence backends.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use crate::document;
use crate::error::{StorageError, StorageResult};
use modulock_core::RosterDocument;
use modulock_core::constants::DEFAULT_ROSTER_PATH;
use tracing::{debug, info};

/// Durable home of the roster document.
///
/// Backends are synchronous: the controller loop owns the store and persists
/// after every mutation, so a save either completes or fails before the next
/// request is served.
pub trait RosterBackend: Send {
    /// Read the persisted roster.
    ///
    /// Returns `Ok(None)` when nothing has been persisted yet.
    fn load(&mut self) -> StorageResult<Option<RosterDocument>>;

    /// Replace the persisted roster.
    fn save(&mut self, roster: &RosterDocument) -> StorageResult<()>;

    /// Human-readable location, used in logs.
    fn describe(&self) -> String;
}

impl<T: RosterBackend + ?Sized> RosterBackend for Box<T> {
    fn load(&mut self) -> StorageResult<Option<RosterDocument>> {
        (**self).load()
    }

    fn save(&mut self, roster: &RosterDocument) -> StorageResult<()> {
        (**self).save(roster)
    }

    fn describe(&self) -> String {
        (**self).describe()
    }
}

/// Where the roster file lives.
#[derive(Debug, Clone)]
pub struct RosterFileConfig {
    pub path: PathBuf,
}

impl Default for RosterFileConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(DEFAULT_ROSTER_PATH),
        }
    }
}

impl RosterFileConfig {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn backend(&self) -> JsonFileBackend {
        JsonFileBackend::new(&self.path)
    }
}

/// JSON file on the local filesystem.
///
/// Saves write a sibling temporary file and rename it over the target, so a
/// crash mid-write leaves the previous roster intact.
#[derive(Debug, Clone)]
pub struct JsonFileBackend {
    path: PathBuf,
}

impl JsonFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn staging_path(&self) -> PathBuf {
        let mut staging = self.path.clone().into_os_string();
        staging.push(".tmp");
        PathBuf::from(staging)
    }
}

impl RosterBackend for JsonFileBackend {
    fn load(&mut self) -> StorageResult<Option<RosterDocument>> {
        let text = match std::fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                info!(path = %self.path.display(), "Roster file not found, starting empty");
                return Ok(None);
            }
            Err(e) => return Err(e.into()),
        };

        let roster = document::decode(&text)?;
        debug!(path = %self.path.display(), count = roster.users.len(), "Roster file read");
        Ok(Some(roster))
    }

    fn save(&mut self, roster: &RosterDocument) -> StorageResult<()> {
        let text = document::encode(roster)?;

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let staging = self.staging_path();
        std::fs::write(&staging, text)?;
        std::fs::rename(&staging, &self.path)?;

        debug!(path = %self.path.display(), count = roster.users.len(), "Roster file written");
        Ok(())
    }

    fn describe(&self) -> String {
        self.path.display().to_string()
    }
}

#[derive(Debug, Default)]
struct MemorySlot {
    text: Option<String>,
    fail_saves: bool,
    saves: usize,
}

/// In-memory backend holding the encoded document.
///
/// Clones share the same slot, which lets a test keep one clone to inspect
/// what was persisted or to make subsequent saves fail.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    slot: Arc<Mutex<MemorySlot>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-populated with raw document text.
    pub fn with_contents(text: impl Into<String>) -> Self {
        let backend = Self::default();
        if let Ok(mut slot) = backend.slot.lock() {
            slot.text = Some(text.into());
        }
        backend
    }

    /// Make every following save fail (or succeed again).
    pub fn set_fail_saves(&self, fail: bool) {
        if let Ok(mut slot) = self.slot.lock() {
            slot.fail_saves = fail;
        }
    }

    /// Raw text of the last successful save.
    pub fn contents(&self) -> Option<String> {
        self.slot.lock().ok().and_then(|slot| slot.text.clone())
    }

    /// Number of successful saves.
    pub fn save_count(&self) -> usize {
        self.slot.lock().map(|slot| slot.saves).unwrap_or(0)
    }

    fn slot(&self) -> StorageResult<std::sync::MutexGuard<'_, MemorySlot>> {
        self.slot
            .lock()
            .map_err(|_| StorageError::Unavailable("memory backend lock poisoned".to_string()))
    }
}

impl RosterBackend for MemoryBackend {
    fn load(&mut self) -> StorageResult<Option<RosterDocument>> {
        let slot = self.slot()?;
        slot.text.as_deref().map(document::decode).transpose()
    }

    fn save(&mut self, roster: &RosterDocument) -> StorageResult<()> {
        let text = document::encode(roster)?;
        let mut slot = self.slot()?;
        if slot.fail_saves {
            return Err(StorageError::Unavailable("saves disabled".to_string()));
        }
        slot.text = Some(text);
        slot.saves += 1;
        Ok(())
    }

    fn describe(&self) -> String {
        "memory".to_string()
    }
}
