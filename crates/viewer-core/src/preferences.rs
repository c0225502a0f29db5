//! Viewer preferences persisted between runs.
//!
//! Stored as `preferences.json` in the viewer's config directory.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

pub const PREFERENCES_FILE: &str = "preferences.json";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Preferences {
    /// Poll the browsed directory and report changes
    #[serde(default, rename = "notificationsEnabled")]
    pub notifications_enabled: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum PreferencesError {
    #[error("Failed to access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Preferences file inside a config directory.
#[derive(Debug, Clone)]
pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn new(config_dir: &Path) -> Self {
        Self {
            path: config_dir.join(PREFERENCES_FILE),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read preferences; a missing file yields the defaults.
    pub fn load(&self) -> Result<Preferences, PreferencesError> {
        if !self.path.exists() {
            return Ok(Preferences::default());
        }

        let contents = fs::read_to_string(&self.path).map_err(|source| PreferencesError::Io {
            path: self.path.clone(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| PreferencesError::Parse {
            path: self.path.clone(),
            source,
        })
    }

    pub fn save(&self, preferences: &Preferences) -> Result<(), PreferencesError> {
        let io_error = |source| PreferencesError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(io_error)?;
        }

        let contents =
            serde_json::to_string_pretty(preferences).map_err(|source| PreferencesError::Parse {
                path: self.path.clone(),
                source,
            })?;
        fs::write(&self.path, contents).map_err(io_error)
    }

    /// Load, apply `change`, save. Returns the stored preferences.
    pub fn update(
        &self,
        change: impl FnOnce(&mut Preferences),
    ) -> Result<Preferences, PreferencesError> {
        let mut preferences = self.load()?;
        change(&mut preferences);
        self.save(&preferences)?;
        Ok(preferences)
    }
}
