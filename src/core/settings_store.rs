/// Settings persistence — one namespaced record in a RON file.
///
/// The file holds a map from namespace to record, e.g.
/// `{"app-settings": (apiUrl: "...", apiToken: "...", systemPrompt: "")}`.
/// Records are written back wholesale; other namespaces in the same file are
/// left untouched.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::schema::settings::Settings;

/// Namespace under which the settings record is stored.
pub const SETTINGS_KEY: &str = "app-settings";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("RON deserialization error: {0}")]
    Ron(#[from] ron::error::SpannedError),
    #[error("RON serialization error: {0}")]
    Serialize(#[from] ron::Error),
}

#[derive(Debug, Clone)]
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the record, falling back to defaults when the file or the
    /// namespace is missing.
    pub fn load(&self) -> Result<Settings, SettingsError> {
        let mut records = self.read_records()?;
        Ok(records.remove(SETTINGS_KEY).unwrap_or_default())
    }

    /// Replace the stored record with `settings`.
    pub fn save(&self, settings: &Settings) -> Result<(), SettingsError> {
        let mut records = self.read_records()?;
        records.insert(SETTINGS_KEY.to_string(), settings.clone());

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }

        let serialized = ron::ser::to_string_pretty(&records, ron::ser::PrettyConfig::default())?;
        std::fs::write(&self.path, serialized)?;
        debug!(path = %self.path.display(), "settings saved");
        Ok(())
    }

    fn read_records(&self) -> Result<BTreeMap<String, Settings>, SettingsError> {
        if !self.path.exists() {
            return Ok(BTreeMap::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        if contents.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        Ok(ron::from_str(&contents)?)
    }
}
