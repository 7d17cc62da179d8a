//! Debounced settings writes
//!
//! Every key carries its own sync state:
//! - `Clean`: in sync with the file
//! - `Pending`: changed locally, waiting for the debounce window
//! - `Writing`: included in a write that has not finished yet
//!
//! Transitions are driven explicitly with a caller-supplied `Instant`, so the
//! store has no timers of its own.

#![allow(dead_code)]

use std::collections::HashMap;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::{Duration, Instant};

use super::{DefaultText, Settings, SettingsError};

/// Default debounce window per key
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// A persisted option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SettingKey {
    PreciseTiming,
    ShowTimeCodes,
    DefaultTextString,
    ShowEmptyLineSymbols,
    Romanization,
}

impl SettingKey {
    pub fn all() -> &'static [SettingKey] {
        &[
            SettingKey::PreciseTiming,
            SettingKey::ShowTimeCodes,
            SettingKey::DefaultTextString,
            SettingKey::ShowEmptyLineSymbols,
            SettingKey::Romanization,
        ]
    }

    /// Key name as stored in the settings file
    pub fn name(&self) -> &'static str {
        match self {
            SettingKey::PreciseTiming => "preciseTiming",
            SettingKey::ShowTimeCodes => "showTimeCodes",
            SettingKey::DefaultTextString => "defaultTextString",
            SettingKey::ShowEmptyLineSymbols => "showEmptyLineSymbols",
            SettingKey::Romanization => "romanization",
        }
    }
}

impl FromStr for SettingKey {
    type Err = SettingsError;

    /// Accepts the file name (`preciseTiming`) or kebab case (`precise-timing`)
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized: String = s
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .flat_map(char::to_lowercase)
            .collect();
        SettingKey::all()
            .iter()
            .copied()
            .find(|key| key.name().to_lowercase() == normalized)
            .ok_or_else(|| SettingsError::Parse(format!("Unknown setting: {}", s)))
    }
}

impl std::fmt::Display for SettingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Per-key sync state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SyncState {
    #[default]
    Clean,
    Pending {
        since: Instant,
    },
    Writing,
}

fn parse_bool(value: &str) -> Result<bool, SettingsError> {
    match value.trim().to_lowercase().as_str() {
        "true" | "on" | "yes" | "1" => Ok(true),
        "false" | "off" | "no" | "0" => Ok(false),
        other => Err(SettingsError::Parse(format!("Expected a boolean, got {}", other))),
    }
}

/// Placeholder text: a JSON string list, or a plain string
fn parse_default_text(value: &str) -> DefaultText {
    let trimmed = value.trim();
    if trimmed.starts_with('[') {
        if let Ok(steps) = serde_json::from_str::<Vec<String>>(trimmed) {
            return DefaultText::Steps(steps);
        }
    }
    DefaultText::Single(value.to_string())
}

/// Settings with debounced, per-key persistence
#[derive(Debug)]
pub struct SettingsStore {
    settings: Settings,
    path: Option<PathBuf>,
    debounce: Duration,
    states: HashMap<SettingKey, SyncState>,
}

impl SettingsStore {
    /// Store writing to `path`, or to the default settings file when `None`
    pub fn new(settings: Settings, path: Option<PathBuf>) -> Self {
        Self {
            settings,
            path,
            debounce: DEFAULT_DEBOUNCE,
            states: HashMap::new(),
        }
    }

    pub fn with_debounce(mut self, debounce: Duration) -> Self {
        self.debounce = debounce;
        self
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn debounce(&self) -> Duration {
        self.debounce
    }

    pub fn state(&self, key: SettingKey) -> SyncState {
        self.states.get(&key).copied().unwrap_or_default()
    }

    /// Whether every key is in sync with the file
    pub fn is_clean(&self) -> bool {
        self.states.values().all(|s| *s == SyncState::Clean)
    }

    /// Apply a textual value to `key`
    ///
    /// Marks the key pending only when the value actually changed.
    pub fn set(&mut self, key: SettingKey, value: &str, now: Instant) -> Result<bool, SettingsError> {
        let changed = match key {
            SettingKey::PreciseTiming => replace(&mut self.settings.precise_timing, parse_bool(value)?),
            SettingKey::ShowTimeCodes => replace(&mut self.settings.show_time_codes, parse_bool(value)?),
            SettingKey::DefaultTextString => {
                replace(&mut self.settings.default_text_string, parse_default_text(value))
            }
            SettingKey::ShowEmptyLineSymbols => {
                replace(&mut self.settings.show_empty_line_symbols, parse_bool(value)?)
            }
            SettingKey::Romanization => replace(&mut self.settings.romanization, parse_bool(value)?),
        };

        if changed {
            tracing::debug!("Setting {} changed, write pending", key);
            self.states.insert(key, SyncState::Pending { since: now });
        }
        Ok(changed)
    }

    /// Move keys whose debounce window elapsed into `Writing`
    pub fn take_due(&mut self, now: Instant) -> Vec<SettingKey> {
        let debounce = self.debounce;
        let mut due: Vec<SettingKey> = self
            .states
            .iter_mut()
            .filter_map(|(key, state)| match *state {
                SyncState::Pending { since } if now.saturating_duration_since(since) >= debounce => {
                    *state = SyncState::Writing;
                    Some(*key)
                }
                _ => None,
            })
            .collect();
        due.sort_by_key(|key| key.name());
        due
    }

    /// Time until the earliest pending key becomes due
    pub fn next_due_in(&self, now: Instant) -> Option<Duration> {
        self.states
            .values()
            .filter_map(|state| match state {
                SyncState::Pending { since } => {
                    Some(self.debounce.saturating_sub(now.saturating_duration_since(*since)))
                }
                _ => None,
            })
            .min()
    }

    /// Resolve a write of `keys`
    ///
    /// Keys changed again while writing stay pending. Failed writes go back to
    /// pending so the next flush picks them up.
    pub fn finish(&mut self, keys: &[SettingKey], ok: bool, now: Instant) {
        for key in keys {
            let state = self.states.entry(*key).or_default();
            if *state == SyncState::Writing {
                *state = if ok {
                    SyncState::Clean
                } else {
                    SyncState::Pending { since: now }
                };
            }
        }
    }

    /// Write due keys to disk; returns how many keys were written
    pub fn flush(&mut self, now: Instant) -> Result<usize, SettingsError> {
        let due = self.take_due(now);
        self.write(due, now)
    }

    /// Write every pending key regardless of its debounce window
    pub fn flush_all(&mut self, now: Instant) -> Result<usize, SettingsError> {
        for state in self.states.values_mut() {
            if matches!(state, SyncState::Pending { .. }) {
                *state = SyncState::Writing;
            }
        }
        let writing: Vec<SettingKey> = self
            .states
            .iter()
            .filter(|(_, s)| **s == SyncState::Writing)
            .map(|(k, _)| *k)
            .collect();
        self.write(writing, now)
    }

    fn write(&mut self, keys: Vec<SettingKey>, now: Instant) -> Result<usize, SettingsError> {
        if keys.is_empty() {
            return Ok(0);
        }

        let result = match &self.path {
            Some(path) => self.settings.save_to_file(path),
            None => self.settings.save(),
        };

        match result {
            Ok(()) => {
                tracing::info!("Settings saved ({} keys)", keys.len());
                self.finish(&keys, true, now);
                Ok(keys.len())
            }
            Err(e) => {
                tracing::error!("Failed to save settings: {}", e);
                self.finish(&keys, false, now);
                Err(e)
            }
        }
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store(name: &str) -> (SettingsStore, PathBuf) {
        let path = std::env::temp_dir()
            .join(format!("lyricsync-store-{}-{}", name, std::process::id()))
            .join("settings.json");
        (
            SettingsStore::new(Settings::default(), Some(path.clone())),
            path,
        )
    }

    #[test]
    fn test_key_parsing() {
        assert_eq!("preciseTiming".parse::<SettingKey>(), Ok(SettingKey::PreciseTiming));
        assert_eq!(
            "show-empty-line-symbols".parse::<SettingKey>(),
            Ok(SettingKey::ShowEmptyLineSymbols)
        );
        assert!("volume".parse::<SettingKey>().is_err());
    }

    #[test]
    fn test_set_marks_pending_only_on_change() {
        let (mut store, _) = store("pending");
        let now = Instant::now();
        assert!(!store.set(SettingKey::PreciseTiming, "false", now).unwrap());
        assert_eq!(store.state(SettingKey::PreciseTiming), SyncState::Clean);

        assert!(store.set(SettingKey::PreciseTiming, "true", now).unwrap());
        assert_eq!(store.state(SettingKey::PreciseTiming), SyncState::Pending { since: now });
        assert!(store.settings().precise_timing);
        assert!(!store.is_clean());

        assert!(store.set(SettingKey::Romanization, "maybe", now).is_err());
    }

    #[test]
    fn test_default_text_values() {
        let (mut store, _) = store("text");
        let now = Instant::now();
        store
            .set(SettingKey::DefaultTextString, r#"["•","•","•"]"#, now)
            .unwrap();
        assert_eq!(store.settings().placeholder_states().len(), 3);
        store.set(SettingKey::DefaultTextString, "[x", now).unwrap();
        assert_eq!(store.settings().placeholder_states(), vec!["[x".to_string()]);
    }

    #[test]
    fn test_debounce_per_key() {
        let (mut store, _) = store("debounce");
        let start = Instant::now();
        store.set(SettingKey::PreciseTiming, "true", start).unwrap();
        let later = start + Duration::from_millis(300);
        store.set(SettingKey::ShowTimeCodes, "true", later).unwrap();

        assert!(store.take_due(start + Duration::from_millis(100)).is_empty());
        assert_eq!(
            store.next_due_in(start + Duration::from_millis(100)),
            Some(Duration::from_millis(400))
        );

        let due = store.take_due(start + Duration::from_millis(500));
        assert_eq!(due, vec![SettingKey::PreciseTiming]);
        assert_eq!(store.state(SettingKey::PreciseTiming), SyncState::Writing);
        assert!(matches!(
            store.state(SettingKey::ShowTimeCodes),
            SyncState::Pending { .. }
        ));
    }

    #[test]
    fn test_change_while_writing_stays_pending() {
        let (mut store, _) = store("rewrite");
        let start = Instant::now();
        store.set(SettingKey::PreciseTiming, "true", start).unwrap();
        let due = store.take_due(start + DEFAULT_DEBOUNCE);
        let mid = start + DEFAULT_DEBOUNCE + Duration::from_millis(10);
        store.set(SettingKey::PreciseTiming, "false", mid).unwrap();
        store.finish(&due, true, mid);
        assert_eq!(store.state(SettingKey::PreciseTiming), SyncState::Pending { since: mid });
    }

    #[test]
    fn test_failed_write_returns_to_pending() {
        let (mut store, _) = store("failed");
        let start = Instant::now();
        store.set(SettingKey::Romanization, "on", start).unwrap();
        let due = store.take_due(start + DEFAULT_DEBOUNCE);
        store.finish(&due, false, start);
        assert!(matches!(
            store.state(SettingKey::Romanization),
            SyncState::Pending { .. }
        ));
    }

    #[test]
    fn test_flush_writes_file() {
        let (mut store, path) = store("flush");
        let start = Instant::now();
        store.set(SettingKey::ShowTimeCodes, "yes", start).unwrap();
        assert_eq!(store.flush(start).unwrap(), 0);
        assert_eq!(store.flush(start + DEFAULT_DEBOUNCE).unwrap(), 1);
        assert!(store.is_clean());

        let loaded = Settings::load_from_file(&path).unwrap();
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
        assert!(loaded.show_time_codes);
    }

    #[test]
    fn test_flush_all_ignores_debounce() {
        let (mut store, path) = store("flush-all");
        let start = Instant::now();
        store.set(SettingKey::PreciseTiming, "1", start).unwrap();
        store.set(SettingKey::Romanization, "1", start).unwrap();
        assert_eq!(store.flush_all(start).unwrap(), 2);
        std::fs::remove_dir_all(path.parent().unwrap()).ok();
        assert!(store.is_clean());
    }
}
