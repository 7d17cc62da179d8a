//! Synced lyrics settings persistence
//!
//! Handles saving and loading the options the lyrics engine reads.

pub mod store;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use store::{SettingKey, SettingsStore, SyncState};

/// Placeholder content for blank lines: one string or a step sequence
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum DefaultText {
    Single(String),
    Steps(Vec<String>),
}

impl DefaultText {
    /// Placeholder states, always at least one
    pub fn states(&self) -> Vec<String> {
        match self {
            DefaultText::Single(text) => vec![text.clone()],
            DefaultText::Steps(steps) if steps.is_empty() => vec![String::new()],
            DefaultText::Steps(steps) => steps.clone(),
        }
    }
}

impl Default for DefaultText {
    fn default() -> Self {
        DefaultText::Single("♪".to_string())
    }
}

/// Synced lyrics settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    /// Use raw milliseconds for timing and seeking instead of whole seconds
    pub precise_timing: bool,
    /// Render a timestamp alongside each line
    pub show_time_codes: bool,
    /// Placeholder content for blank lines
    pub default_text_string: DefaultText,
    /// Render placeholders on non-current blank lines
    pub show_empty_line_symbols: bool,
    /// Show a romanized companion line
    pub romanization: bool,
}

impl Settings {
    /// Get the settings file path
    pub fn file_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("com", "lyricsync", "lyricsync")
            .map(|dirs| dirs.config_dir().join("settings.json"))
    }

    /// Load settings from file, or return defaults if not found
    pub fn load() -> Self {
        Self::file_path()
            .and_then(|path| Self::load_from_file(&path).ok())
            .unwrap_or_default()
    }

    /// Load settings from a specific file
    pub fn load_from_file(path: &Path) -> Result<Self, SettingsError> {
        let content =
            std::fs::read_to_string(path).map_err(|e| SettingsError::Io(e.to_string()))?;
        serde_json::from_str(&content).map_err(|e| SettingsError::Parse(e.to_string()))
    }

    /// Load from `path` when given, otherwise from the default location
    pub fn load_or_default(path: Option<&Path>) -> Self {
        match path {
            Some(path) => Self::load_from_file(path).unwrap_or_else(|e| {
                tracing::warn!("Using default settings, failed to load {:?}: {}", path, e);
                Self::default()
            }),
            None => Self::load(),
        }
    }

    /// Save settings to the default file
    pub fn save(&self) -> Result<(), SettingsError> {
        if let Some(path) = Self::file_path() {
            self.save_to_file(&path)
        } else {
            Err(SettingsError::Io(
                "Could not determine config directory".to_string(),
            ))
        }
    }

    /// Save settings to a specific file
    pub fn save_to_file(&self, path: &Path) -> Result<(), SettingsError> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| SettingsError::Io(e.to_string()))?;
        }

        let content =
            serde_json::to_string_pretty(self).map_err(|e| SettingsError::Parse(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| SettingsError::Io(e.to_string()))?;
        Ok(())
    }

    /// Placeholder states for blank lines
    pub fn placeholder_states(&self) -> Vec<String> {
        self.default_text_string.states()
    }
}

/// Errors that can occur with settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SettingsError {
    Io(String),
    Parse(String),
}

impl std::fmt::Display for SettingsError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SettingsError::Io(e) => write!(f, "IO error: {}", e),
            SettingsError::Parse(e) => write!(f, "Parse error: {}", e),
        }
    }
}

impl std::error::Error for SettingsError {}
