use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    path::PathBuf,
    sync::{RwLock, RwLockReadGuard, RwLockWriteGuard},
};

use crate::models::{FeatureFlag, FeatureFlags, ToolHint, ToolHints};
use crate::vibe::ThemeMode;

pub const SETTINGS_FILE_NAME: &str = "settings.json";

/// User preferences that outlive a session.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct UserSettings {
    pub theme_mode: ThemeMode,
    pub feature_flags: FeatureFlags,
    pub tool_hints: ToolHints,
}

pub struct SettingsStore {
    path: PathBuf,
    data: RwLock<UserSettings>,
}

impl SettingsStore {
    /// Missing or unreadable JSON falls back to defaults; only IO errors on an
    /// existing file are reported.
    pub fn new(path: PathBuf) -> Result<Self> {
        let data = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read settings from {}", path.display()))?;
            serde_json::from_str(&contents).unwrap_or_else(|err| {
                log::warn!("Ignoring corrupt settings at {}: {}", path.display(), err);
                UserSettings::default()
            })
        } else {
            UserSettings::default()
        };

        Ok(Self {
            path,
            data: RwLock::new(data),
        })
    }

    fn read(&self) -> RwLockReadGuard<'_, UserSettings> {
        self.data.read().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, UserSettings> {
        self.data.write().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn snapshot(&self) -> UserSettings {
        *self.read()
    }

    pub fn set_theme_mode(&self, mode: ThemeMode) -> Result<()> {
        self.update(|settings| settings.theme_mode = mode)
    }

    pub fn set_feature_flag(&self, flag: FeatureFlag, value: bool) -> Result<()> {
        self.update(|settings| settings.feature_flags.set(flag, value))
    }

    pub fn dismiss_tool_hint(&self, hint: ToolHint) -> Result<()> {
        self.update(|settings| settings.tool_hints.dismiss(hint))
    }

    fn update(&self, change: impl FnOnce(&mut UserSettings)) -> Result<()> {
        let mut guard = self.write();
        change(&mut *guard);
        self.persist(&guard)
    }

    fn persist(&self, data: &UserSettings) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        let serialized = serde_json::to_string_pretty(data)?;
        fs::write(&self.path, serialized)
            .with_context(|| format!("Failed to write settings to {}", self.path.display()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn changes_survive_a_restart() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);

        let settings = SettingsStore::new(path.clone()).unwrap();
        assert_eq!(settings.snapshot(), UserSettings::default());
        settings.set_theme_mode(ThemeMode::Night).unwrap();
        settings.set_feature_flag(FeatureFlag::AnalogNoise, false).unwrap();
        settings.dismiss_tool_hint(ToolHint::Ambience).unwrap();

        let reopened = SettingsStore::new(path).unwrap().snapshot();
        assert_eq!(reopened.theme_mode, ThemeMode::Night);
        assert!(!reopened.feature_flags.get(FeatureFlag::AnalogNoise));
        assert!(reopened.tool_hints.is_dismissed(ToolHint::Ambience));
        assert!(!reopened.tool_hints.is_dismissed(ToolHint::Timer));
    }

    #[test]
    fn corrupt_file_means_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        fs::write(&path, "{not json").unwrap();
        let settings = SettingsStore::new(path.clone()).unwrap();
        assert_eq!(settings.snapshot(), UserSettings::default());

        // The next change overwrites the corrupt file
        settings.set_theme_mode(ThemeMode::Day).unwrap();
        assert_eq!(SettingsStore::new(path).unwrap().snapshot().theme_mode, ThemeMode::Day);
    }

    #[test]
    fn partial_file_fills_in_missing_fields() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        fs::write(&path, r#"{"themeMode":"day"}"#).unwrap();
        let settings = SettingsStore::new(path).unwrap().snapshot();
        assert_eq!(settings.theme_mode, ThemeMode::Day);
        assert_eq!(settings.feature_flags, FeatureFlags::default());
    }
}
