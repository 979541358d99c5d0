//! Save/load backends for the word list
//!
//! Features:
//! - `PersistenceAdapter` contract shared by every backend
//! - In-memory storage for tests and headless use
//! - JSON file storage with atomic rename (native)
//! - Browser LocalStorage (wasm32)
//! - File export/import and remote account sync

pub mod export;
pub mod remote;

#[cfg(not(target_arch = "wasm32"))]
pub mod file;
#[cfg(target_arch = "wasm32")]
pub mod local;

#[cfg(not(target_arch = "wasm32"))]
pub use file::JsonFileStorage;
#[cfg(target_arch = "wasm32")]
pub use local::LocalStorage;

use crate::error::Result;
use crate::model::Snapshot;

/// Durable home of the word list.
///
/// The store calls `save` after every mutation and `load` once when opened.
pub trait PersistenceAdapter {
    /// Persist a full snapshot, replacing whatever was stored before
    fn save(&mut self, snapshot: &Snapshot) -> Result<()>;

    /// Load the stored snapshot, `None` if nothing has been saved yet
    fn load(&self) -> Result<Option<Snapshot>>;
}

/// Keeps the serialized snapshot in memory
#[derive(Debug, Clone, Default)]
pub struct MemoryStorage {
    data: Option<String>,
    saves: usize,
}

impl MemoryStorage {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from previously serialized snapshot text
    pub fn with_json(json: impl Into<String>) -> Self {
        Self {
            data: Some(json.into()),
            saves: 0,
        }
    }

    /// Raw text of the last save
    pub fn json(&self) -> Option<&str> {
        self.data.as_deref()
    }

    /// Number of saves performed
    pub fn save_count(&self) -> usize {
        self.saves
    }
}

impl PersistenceAdapter for MemoryStorage {
    fn save(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.data = Some(snapshot.to_json()?);
        self.saves += 1;
        Ok(())
    }

    fn load(&self) -> Result<Option<Snapshot>> {
        self.data.as_deref().map(Snapshot::from_json).transpose()
    }
}
