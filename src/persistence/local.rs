//! Browser LocalStorage backend (wasm32 only)

use web_sys::Storage;

use super::PersistenceAdapter;
use crate::error::{Result, WordlistError};
use crate::model::Snapshot;

/// Stores the snapshot as JSON under a single LocalStorage key
#[derive(Debug, Clone)]
pub struct LocalStorage {
    key: String,
}

impl LocalStorage {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    fn storage() -> Result<Storage> {
        web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| WordlistError::Storage("LocalStorage is unavailable".to_string()))
    }
}

impl PersistenceAdapter for LocalStorage {
    fn save(&mut self, snapshot: &Snapshot) -> Result<()> {
        let json = snapshot.to_json()?;
        Self::storage()?
            .set_item(&self.key, &json)
            .map_err(|e| WordlistError::Storage(format!("{:?}", e)))?;
        log::debug!("Word list saved ({} words)", snapshot.len());
        Ok(())
    }

    fn load(&self) -> Result<Option<Snapshot>> {
        let json = Self::storage()?
            .get_item(&self.key)
            .map_err(|e| WordlistError::Storage(format!("{:?}", e)))?;

        match json {
            Some(json) => {
                let snapshot = Snapshot::from_json(&json)?;
                log::info!("Loaded {} words from LocalStorage", snapshot.len());
                Ok(Some(snapshot))
            }
            None => {
                log::info!("No saved word list found, starting fresh");
                Ok(None)
            }
        }
    }
}
