//! Widget settings
//!
//! Natively persisted as `settings.json` next to the word list; in the
//! browser the host passes the same JSON object to the widget.

use serde::{Deserialize, Serialize};

use crate::consts::{DEFAULT_GROUP, STORAGE_KEY};

/// Word list settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Storage key (LocalStorage key, or file stem natively)
    pub storage_key: String,
    /// Group given to newly added words
    pub default_group: String,
    /// Account endpoint used when none is passed explicitly
    pub remote_endpoint: Option<String>,
    /// Override for the native data directory
    pub data_dir: Option<std::path::PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            storage_key: STORAGE_KEY.to_string(),
            default_group: DEFAULT_GROUP.to_string(),
            remote_endpoint: None,
            data_dir: None,
        }
    }
}

impl Settings {
    /// Settings file name inside the data directory
    #[cfg(not(target_arch = "wasm32"))]
    const FILE_NAME: &'static str = "settings.json";

    /// Parse settings JSON; missing fields take their defaults
    pub fn from_json(text: &str) -> crate::Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Endpoint to use for account sync: explicit argument first
    pub fn endpoint<'a>(&'a self, explicit: Option<&'a str>) -> Option<&'a str> {
        explicit
            .filter(|e| !e.trim().is_empty())
            .or(self.remote_endpoint.as_deref())
    }

    /// Load settings from `dir`, falling back to defaults
    #[cfg(not(target_arch = "wasm32"))]
    pub fn load_from(dir: &std::path::Path) -> Self {
        let path = dir.join(Self::FILE_NAME);
        match std::fs::read_to_string(&path) {
            Ok(text) => match Self::from_json(&text) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Ignoring invalid settings file {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(_) => {
                log::info!("Using default settings");
                Self::default()
            }
        }
    }

    /// Save settings into `dir`
    #[cfg(not(target_arch = "wasm32"))]
    pub fn save_to(&self, dir: &std::path::Path) -> crate::Result<()> {
        std::fs::create_dir_all(dir)?;
        std::fs::write(dir.join(Self::FILE_NAME), serde_json::to_string_pretty(self)?)?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.storage_key, "zh_known_wordlist");
        assert_eq!(settings.default_group, "default");
        assert!(settings.remote_endpoint.is_none());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings = Settings::from_json(r#"{"default_group":"hsk2"}"#).unwrap();
        assert_eq!(settings.default_group, "hsk2");
        assert_eq!(settings.storage_key, STORAGE_KEY);
    }

    #[test]
    fn test_endpoint_precedence() {
        let settings = Settings {
            remote_endpoint: Some("https://example.com/words".to_string()),
            ..Default::default()
        };
        assert_eq!(
            settings.endpoint(Some("https://other/words")),
            Some("https://other/words")
        );
        assert_eq!(settings.endpoint(Some(" ")), Some("https://example.com/words"));
        assert_eq!(settings.endpoint(None), Some("https://example.com/words"));
        assert_eq!(Settings::default().endpoint(None), None);
    }

    #[cfg(not(target_arch = "wasm32"))]
    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(Settings::load_from(dir.path()), Settings::default());

        let settings = Settings {
            default_group: "reading".to_string(),
            remote_endpoint: Some("http://localhost:8080/wordlist".to_string()),
            ..Default::default()
        };
        settings.save_to(dir.path()).unwrap();
        assert_eq!(Settings::load_from(dir.path()), settings);

        std::fs::write(dir.path().join("settings.json"), "nope").unwrap();
        assert_eq!(Settings::load_from(dir.path()), Settings::default());
    }
}
