//! Durable key-value preference storage.
//!
//! Values are kept as strings in a small JSON object on disk, one file per
//! user. Reads happen once at startup; every change is written through.

use shared::settings::Preferences;
use shared::Result;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// JSON boolean (`"true"` / `"false"`)
pub const DARK_MODE_KEY: &str = "darkMode";
/// Presence marker; any non-empty value means the tour was completed
pub const TOUR_COMPLETED_KEY: &str = "tourCompleted";

pub struct PreferenceStore {
    path: PathBuf,
}

impl PreferenceStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/vizion/preferences.json`
    pub fn default_location() -> Option<PathBuf> {
        dirs::config_dir().map(|mut p| {
            p.push("vizion");
            p.push("preferences.json");
            p
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn get_item(&self, key: &str) -> Option<String> {
        self.read_all().remove(key)
    }

    pub fn set_item(&self, key: &str, value: &str) -> Result<()> {
        let mut items = self.read_all();
        items.insert(key.to_string(), value.to_string());
        self.write_all(&items)
    }

    /// Read both flags. Anything missing or unreadable counts as `false`.
    pub fn load_preferences(&self) -> Preferences {
        let items = self.read_all();

        let dark_mode = items
            .get(DARK_MODE_KEY)
            .and_then(|v| serde_json::from_str::<bool>(v).ok())
            .unwrap_or(false);
        let tour_completed = items
            .get(TOUR_COMPLETED_KEY)
            .map(|v| !v.is_empty())
            .unwrap_or(false);

        Preferences {
            dark_mode,
            tour_completed,
        }
    }

    pub fn set_dark_mode(&self, enabled: bool) -> Result<()> {
        let value = serde_json::to_string(&enabled)?;
        self.set_item(DARK_MODE_KEY, &value)
    }

    pub fn mark_tour_completed(&self) -> Result<()> {
        self.set_item(TOUR_COMPLETED_KEY, "true")
    }

    fn read_all(&self) -> BTreeMap<String, String> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(_) => return BTreeMap::new(),
        };
        match serde_json::from_str(&contents) {
            Ok(items) => items,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), "ignoring unreadable preferences: {}", e);
                BTreeMap::new()
            }
        }
    }

    fn write_all(&self, items: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(items)?;
        std::fs::write(&self.path, json)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> PreferenceStore {
        PreferenceStore::open(dir.path().join("nested").join("preferences.json"))
    }

    #[test]
    fn test_defaults_when_missing() {
        let dir = TempDir::new().unwrap();
        let prefs = store_in(&dir).load_preferences();
        assert_eq!(prefs, Preferences::default());
    }

    #[test]
    fn test_dark_mode_round_trips_through_fresh_store() {
        let dir = TempDir::new().unwrap();
        store_in(&dir).set_dark_mode(true).unwrap();
        assert!(store_in(&dir).load_preferences().dark_mode);

        store_in(&dir).set_dark_mode(false).unwrap();
        assert!(!store_in(&dir).load_preferences().dark_mode);
    }

    #[test]
    fn test_dark_mode_stored_as_json_boolean() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.set_dark_mode(true).unwrap();
        assert_eq!(store.get_item(DARK_MODE_KEY).as_deref(), Some("true"));
    }

    #[test]
    fn test_mark_tour_completed_keeps_dark_mode() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.set_dark_mode(true).unwrap();
        store.mark_tour_completed().unwrap();

        let prefs = store_in(&dir).load_preferences();
        assert!(prefs.dark_mode);
        assert!(prefs.tour_completed);
    }

    #[test]
    fn test_garbage_values_default_to_false() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);
        store.set_item(DARK_MODE_KEY, "maybe").unwrap();
        store.set_item(TOUR_COMPLETED_KEY, "").unwrap();

        assert_eq!(store.load_preferences(), Preferences::default());
    }

    #[test]
    fn test_corrupt_file_is_ignored() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("preferences.json");
        std::fs::write(&path, "{not json").unwrap();

        let store = PreferenceStore::open(&path);
        assert_eq!(store.load_preferences(), Preferences::default());
        store.mark_tour_completed().unwrap();
        assert!(store.load_preferences().tour_completed);
    }
}
