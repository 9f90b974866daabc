// SPDX-License-Identifier: GPL-3.0-only

//! Persistent user keyboard settings.
//!
//! The settings file lives in `<root>/platforminputcontexts/keyboard.json`. On
//! first use it is created from the defaults; on later runs any key missing
//! from the file is filled in from the defaults and the file is rewritten.
//! Keys this version does not know about are preserved.
//!
//! Write failures after opening are logged and do not interrupt the caller:
//! the in-memory value stays authoritative for the rest of the session.

use crate::app_settings::{SETTINGS_FILE_NAME, SETTINGS_SUB_FOLDER};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Layout related settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutSettings {
    /// Index of the selected language layout.
    pub current_index: usize,
}

/// Contents of the settings file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsData {
    pub layouts: LayoutSettings,
    /// Keys written by other versions, kept as-is.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

/// Handle to the user settings file.
#[derive(Debug, Clone)]
pub struct KeyboardSettings {
    path: PathBuf,
    data: SettingsData,
}

impl KeyboardSettings {
    /// Opens (creating or repairing as needed) the settings below `root`.
    pub fn open(root: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let dir = root.as_ref().join(SETTINGS_SUB_FOLDER);
        std::fs::create_dir_all(&dir).map_err(|source| SettingsError::io(source, &dir))?;
        let path = dir.join(SETTINGS_FILE_NAME);

        if !path.exists() {
            let settings = Self {
                path,
                data: SettingsData::default(),
            };
            settings.save()?;
            tracing::info!("Created keyboard settings at {}", settings.path.display());
            return Ok(settings);
        }

        let contents =
            std::fs::read_to_string(&path).map_err(|source| SettingsError::io(source, &path))?;
        let stored: serde_json::Value =
            serde_json::from_str(&contents).map_err(|source| SettingsError::json(source, &path))?;
        let data: SettingsData = serde_json::from_value(stored.clone())
            .map_err(|source| SettingsError::json(source, &path))?;

        let settings = Self { path, data };
        let complete = serde_json::to_value(&settings.data)
            .map_err(|source| SettingsError::json(source, &settings.path))?;
        if complete != stored {
            tracing::debug!("Filling missing keyboard settings with defaults");
            settings.save()?;
        }

        Ok(settings)
    }

    /// Index of the selected language layout.
    pub fn current_language_index(&self) -> usize {
        self.data.layouts.current_index
    }

    /// Selects a language layout and writes the file.
    pub fn set_current_language_index(&mut self, index: usize) {
        self.data.layouts.current_index = index;
        if let Err(err) = self.save() {
            tracing::warn!("Failed to write keyboard settings: {}", err);
        }
    }

    /// Location of the settings file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn data(&self) -> &SettingsData {
        &self.data
    }

    /// Writes the current settings to disk.
    pub fn save(&self) -> Result<(), SettingsError> {
        let json = serde_json::to_string_pretty(&self.data)
            .map_err(|source| SettingsError::json(source, &self.path))?;
        std::fs::write(&self.path, json).map_err(|source| SettingsError::io(source, &self.path))
    }
}

/// Errors that can occur while reading or writing settings.
#[derive(Debug)]
pub enum SettingsError {
    /// Filesystem access failed.
    Io {
        source: std::io::Error,
        file_path: String,
    },
    /// The file does not contain valid settings.
    Json {
        source: serde_json::Error,
        file_path: String,
    },
}

impl SettingsError {
    fn io(source: std::io::Error, path: &Path) -> Self {
        SettingsError::Io {
            source,
            file_path: path.display().to_string(),
        }
    }

    fn json(source: serde_json::Error, path: &Path) -> Self {
        SettingsError::Json {
            source,
            file_path: path.display().to_string(),
        }
    }
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Io { source, file_path } => {
                write!(f, "Settings I/O error for '{}': {}", file_path, source)
            }
            SettingsError::Json { source, file_path } => {
                write!(f, "Invalid settings in '{}': {}", file_path, source)
            }
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SettingsError::Io { source, .. } => Some(source),
            SettingsError::Json { source, .. } => Some(source),
        }
    }
}
