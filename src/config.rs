// SPDX-License-Identifier: GPL-3.0-only

//! Positioner configuration.
//!
//! Every field has a default, so a partial (or empty) JSON object is a valid
//! configuration file.

use crate::app_settings;
use crate::positioner::animation::Easing;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Runtime configuration of a [`Positioner`](crate::positioner::Positioner).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PositionerConfig {
    /// Scroll the content up so the focused field stays above the keyboard.
    /// When `false` the content never moves and the offset stays zero.
    pub scroll_content: bool,
    /// Animate show/hide transitions.
    pub animated: bool,
    /// Spacing between the focused field and the keyboard top.
    pub focus_margin: f64,
    /// Length of the slide animation in milliseconds.
    pub animation_duration_ms: u64,
    /// Curve of the slide animation (`"out_cubic"` or `"linear"`).
    pub easing: Easing,
    /// Show delay used right after the application was re-activated.
    pub reactivation_delay_ms: u64,
}

impl Default for PositionerConfig {
    fn default() -> Self {
        Self {
            scroll_content: true,
            animated: true,
            focus_margin: app_settings::FOCUS_MARGIN,
            animation_duration_ms: app_settings::ANIMATION_DURATION_MS,
            easing: Easing::OutCubic,
            reactivation_delay_ms: app_settings::REACTIVATION_DELAY_MS,
        }
    }
}

impl PositionerConfig {
    /// Returns the animation duration as a [`Duration`].
    pub fn animation_duration(&self) -> Duration {
        Duration::from_millis(self.animation_duration_ms)
    }

    /// Returns the re-activation show delay as a [`Duration`].
    pub fn reactivation_delay(&self) -> Duration {
        Duration::from_millis(self.reactivation_delay_ms)
    }

    /// Parses a configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(json).map_err(|source| ConfigError::Json {
            source,
            file_path: None,
        })
    }

    /// Loads a configuration file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            source,
            file_path: path.display().to_string(),
        })?;
        let config = serde_json::from_str(&contents).map_err(|source| ConfigError::Json {
            source,
            file_path: Some(path.display().to_string()),
        })?;
        tracing::debug!("Loaded positioner configuration from {}", path.display());
        Ok(config)
    }

    /// Loads a configuration file, falling back to defaults on any error.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                tracing::warn!("Using default positioner configuration: {}", err);
                Self::default()
            }
        }
    }
}

/// Errors that can occur while loading a configuration.
#[derive(Debug)]
pub enum ConfigError {
    /// The configuration file could not be read.
    Io {
        source: std::io::Error,
        file_path: String,
    },
    /// The configuration is not valid JSON for [`PositionerConfig`].
    Json {
        source: serde_json::Error,
        file_path: Option<String>,
    },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io { source, file_path } => {
                write!(f, "Failed to read configuration '{}': {}", file_path, source)
            }
            ConfigError::Json { source, file_path } => {
                write!(f, "Invalid configuration")?;
                if let Some(path) = file_path {
                    write!(f, " in file '{}'", path)?;
                }
                write!(f, " at line {}: {}", source.line(), source)
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io { source, .. } => Some(source),
            ConfigError::Json { source, .. } => Some(source),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    /// Missing fields fall back to the application defaults.
    #[test]
    fn test_partial_json_uses_defaults() {
        let config = PositionerConfig::from_json(r#"{ "scroll_content": false }"#).unwrap();

        assert!(!config.scroll_content);
        assert!(config.animated);
        assert_eq!(config.focus_margin, app_settings::FOCUS_MARGIN);
        assert_eq!(config.easing, Easing::OutCubic);
        assert_eq!(
            config.animation_duration(),
            Duration::from_millis(app_settings::ANIMATION_DURATION_MS)
        );
        assert_eq!(
            config.reactivation_delay(),
            Duration::from_millis(app_settings::REACTIVATION_DELAY_MS)
        );
    }

    #[test]
    fn test_empty_object_equals_default() {
        let config = PositionerConfig::from_json("{}").unwrap();
        assert_eq!(config, PositionerConfig::default());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{ "animated": false, "animation_duration_ms": 400, "easing": "linear" }}"#
        )
        .unwrap();

        let config = PositionerConfig::load(file.path()).unwrap();
        assert!(!config.animated);
        assert_eq!(config.animation_duration_ms, 400);
        assert_eq!(config.easing, Easing::Linear);
        assert!(config.scroll_content);
    }

    /// Broken files surface a JSON error carrying the file path.
    #[test]
    fn test_invalid_file_reports_path() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();

        let err = PositionerConfig::load(file.path()).unwrap_err();
        match &err {
            ConfigError::Json { file_path, .. } => assert!(file_path.is_some()),
            other => panic!("expected JSON error, got {:?}", other),
        }
        assert!(err.to_string().contains("Invalid configuration"));
    }

    #[test]
    fn test_missing_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let config = PositionerConfig::load_or_default(dir.path().join("missing.json"));
        assert_eq!(config, PositionerConfig::default());
    }
}
