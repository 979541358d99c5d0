//! File-based word list storage for native targets.

use std::fs;
use std::path::{Path, PathBuf};

use super::PersistenceAdapter;
use crate::error::Result;
use crate::model::Snapshot;

/// Stores the snapshot as `<dir>/<key>.json`.
///
/// Writes go to a `.json.tmp` sibling first and are renamed into place, so a
/// crash mid-write never leaves a truncated word list behind.
#[derive(Debug, Clone)]
pub struct JsonFileStorage {
    path: PathBuf,
}

impl JsonFileStorage {
    /// Create the storage, making `dir` if needed
    pub fn new(dir: impl AsRef<Path>, key: &str) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;
        Ok(Self {
            path: dir.join(format!("{}.json", key)),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl PersistenceAdapter for JsonFileStorage {
    fn save(&mut self, snapshot: &Snapshot) -> Result<()> {
        let temp_path = self.path.with_extension("json.tmp");
        fs::write(&temp_path, snapshot.to_json()?)?;
        fs::rename(&temp_path, &self.path)?;

        log::debug!(
            "Saved {} words to {}",
            snapshot.len(),
            self.path.display()
        );
        Ok(())
    }

    fn load(&self) -> Result<Option<Snapshot>> {
        if !self.path.exists() {
            return Ok(None);
        }

        let text = fs::read_to_string(&self.path)?;
        let snapshot = Snapshot::from_json(&text)?;
        log::info!(
            "Loaded {} words from {}",
            snapshot.len(),
            self.path.display()
        );
        Ok(Some(snapshot))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::STORAGE_KEY;
    use crate::model::WordRecord;

    #[test]
    fn test_missing_file_loads_none() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path(), STORAGE_KEY).unwrap();
        assert!(storage.load().unwrap().is_none());
        assert!(storage.path().ends_with("zh_known_wordlist.json"));
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut storage = JsonFileStorage::new(dir.path().join("nested"), STORAGE_KEY).unwrap();

        let mut snapshot = Snapshot::new();
        snapshot
            .words
            .insert("苹果".to_string(), WordRecord::new(42, "食物"));
        storage.save(&snapshot).unwrap();

        assert!(!storage.path().with_extension("json.tmp").exists());
        assert_eq!(storage.load().unwrap(), Some(snapshot));
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let storage = JsonFileStorage::new(dir.path(), STORAGE_KEY).unwrap();
        fs::write(storage.path(), "{ truncated").unwrap();
        assert!(storage.load().is_err());
    }
}
