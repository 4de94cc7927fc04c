//! JSON settings file compatible with the add-on's `config.json`

use std::fs;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use thiserror::Error;

use super::models::ImportSettings;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Config directory not found")]
    ConfigDirNotFound,

    #[error("Settings file is not a JSON object: {0}")]
    NotAnObject(PathBuf),
}

pub type Result<T> = std::result::Result<T, SettingsError>;

/// Key the add-on's settings dialog used for the startup flag
const LEGACY_AUTO_IMPORT_KEY: &str = "auto_import";

/// JSON settings file with defaults for every missing key
pub struct SettingsStore {
    path: PathBuf,
}

impl SettingsStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }

    /// Get the default settings file path
    pub fn default_path() -> Result<PathBuf> {
        dirs::config_dir()
            .map(|p| p.join("lexicard").join("config.json"))
            .ok_or(SettingsError::ConfigDirNotFound)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn defaults() -> Map<String, Value> {
        match serde_json::to_value(ImportSettings::default()) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        }
    }

    /// The keys stored on disk, without defaults
    fn read_stored(&self) -> Result<Map<String, Value>> {
        if !self.path.exists() {
            return Ok(Map::new());
        }

        let content = fs::read_to_string(&self.path)?;
        let mut stored = match serde_json::from_str(&content)? {
            Value::Object(map) => map,
            _ => return Err(SettingsError::NotAnObject(self.path.clone())),
        };

        // the legacy key only counts when the current one is absent
        if let Some(value) = stored.remove(LEGACY_AUTO_IMPORT_KEY) {
            stored
                .entry("auto_import_on_startup".to_string())
                .or_insert(value);
        }
        Ok(stored)
    }

    fn write_stored(&self, map: &Map<String, Value>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&self.path, serde_json::to_string_pretty(map)?)?;
        Ok(())
    }

    /// All settings: stored values over defaults
    pub fn get(&self) -> Map<String, Value> {
        let mut settings = Self::defaults();
        match self.read_stored() {
            Ok(stored) => settings.extend(stored),
            Err(e) => log::error!(
                "Failed to read settings from {}, using defaults: {}",
                self.path.display(),
                e
            ),
        }
        settings
    }

    /// One setting, falling back to its default (`Null` for unknown keys)
    pub fn get_param(&self, key: &str) -> Value {
        self.get().remove(key).unwrap_or(Value::Null)
    }

    /// Merge `updates` into the stored settings
    pub fn update(&self, updates: Map<String, Value>) -> bool {
        let result = self.read_stored().and_then(|mut stored| {
            stored.extend(updates);
            self.write_stored(&stored)
        });

        match result {
            Ok(()) => true,
            Err(e) => {
                log::error!("Configuration update failed: {}", e);
                false
            }
        }
    }

    /// Typed view of the current settings
    ///
    /// A stored value of the wrong type falls back to that key's default only.
    pub fn load(&self) -> ImportSettings {
        let mut settings = Self::defaults();
        let stored = match self.read_stored() {
            Ok(stored) => stored,
            Err(e) => {
                log::error!(
                    "Failed to read settings from {}, using defaults: {}",
                    self.path.display(),
                    e
                );
                Map::new()
            }
        };

        for (key, value) in stored {
            let previous = settings.insert(key.clone(), value);
            if serde_json::from_value::<ImportSettings>(Value::Object(settings.clone())).is_err() {
                log::warn!(
                    "Ignoring invalid value for {} in {}",
                    key,
                    self.path.display()
                );
                match previous {
                    Some(default) => settings.insert(key, default),
                    None => settings.remove(&key),
                };
            }
        }

        match serde_json::from_value(Value::Object(settings)) {
            Ok(settings) => settings,
            Err(e) => {
                log::error!("Invalid settings in {}, using defaults: {}", self.path.display(), e);
                ImportSettings::default()
            }
        }
    }

    /// Write every typed setting
    pub fn save(&self, settings: &ImportSettings) -> Result<()> {
        match serde_json::to_value(settings)? {
            Value::Object(map) => {
                let mut stored = self.read_stored()?;
                stored.extend(map);
                self.write_stored(&stored)
            }
            _ => Err(SettingsError::NotAnObject(self.path.clone())),
        }
    }

    /// Store defaults for any key missing from the file; returns the keys added
    pub fn ensure_defaults(&self) -> Result<Vec<String>> {
        let mut stored = self.read_stored()?;
        let mut added = Vec::new();

        for (key, value) in Self::defaults() {
            if !stored.contains_key(&key) {
                stored.insert(key.clone(), value);
                added.push(key);
            }
        }

        if !added.is_empty() {
            self.write_stored(&stored)?;
            log::info!("Configuration initialized with default values for {:?}", added);
        }

        Ok(added)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::UNSET_SOURCE_PATH;
    use serde_json::json;
    use tempfile::TempDir;

    fn create_test_store() -> (SettingsStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = SettingsStore::new(temp_dir.path().join("lexicard").join("config.json"));
        (store, temp_dir)
    }

    fn updates(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => panic!("expected an object"),
        }
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let (store, _temp) = create_test_store();

        assert_eq!(store.load(), ImportSettings::default());
        assert_eq!(store.get_param("lutedb_path"), json!(UNSET_SOURCE_PATH));
        assert_eq!(store.get_param("selected_deck"), json!("Default"));
        assert_eq!(store.get_param("last_days"), Value::Null);
        assert_eq!(store.get_param("no_such_key"), Value::Null);
    }

    #[test]
    fn test_update_preserves_other_keys() {
        let (store, _temp) = create_test_store();

        assert!(store.update(updates(json!({ "selected_deck": "Spanish" }))));
        assert!(store.update(updates(json!({ "last_days": 3, "tags": ["x"] }))));

        let settings = store.load();
        assert_eq!(settings.selected_deck, "Spanish");
        assert_eq!(settings.last_days, Some(3));
        assert_eq!(settings.tags, vec!["x".to_string()]);
    }

    #[test]
    fn test_update_fails_on_corrupt_file() {
        let (store, _temp) = create_test_store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), "not json").unwrap();

        assert!(!store.update(updates(json!({ "parents_only": true }))));
        // reads still fall back to defaults
        assert_eq!(store.load(), ImportSettings::default());
    }

    #[test]
    fn test_ensure_defaults_adds_only_missing_keys() {
        let (store, _temp) = create_test_store();
        store.update(updates(json!({ "selected_deck": "German" })));

        let added = store.ensure_defaults().unwrap();
        assert!(added.contains(&"lutedb_path".to_string()));
        assert!(!added.contains(&"selected_deck".to_string()));
        assert_eq!(store.load().selected_deck, "German");

        assert!(store.ensure_defaults().unwrap().is_empty());
    }

    #[test]
    fn test_legacy_auto_import_key() {
        let (store, _temp) = create_test_store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(store.path(), r#"{ "auto_import": true }"#).unwrap();
        assert!(store.load().auto_import_on_startup);

        fs::write(
            store.path(),
            r#"{ "auto_import": true, "auto_import_on_startup": false }"#,
        )
        .unwrap();
        assert!(!store.load().auto_import_on_startup);
    }

    #[test]
    fn test_invalid_value_only_resets_its_key() {
        let (store, _temp) = create_test_store();
        fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        fs::write(
            store.path(),
            r#"{
                "lutedb_path": "/x/lute.db",
                "auto_import_on_startup": true,
                "selected_deck": "Spanish",
                "selected_lang": "",
                "last_days": "week"
            }"#,
        )
        .unwrap();

        let settings = store.load();
        assert_eq!(settings.source_path, "/x/lute.db");
        assert!(settings.auto_import_on_startup);
        assert_eq!(settings.selected_deck, "Spanish");
        assert_eq!(settings.selected_lang, None);
        assert_eq!(settings.last_days, None);
    }

    #[test]
    fn test_save_clears_optional_settings() {
        let (store, _temp) = create_test_store();
        let mut settings = ImportSettings {
            last_days: Some(7),
            selected_lang: Some(2),
            ..Default::default()
        };
        store.save(&settings).unwrap();
        assert_eq!(store.load().last_days, Some(7));

        settings.last_days = None;
        settings.selected_lang = None;
        store.save(&settings).unwrap();

        let loaded = store.load();
        assert_eq!(loaded.last_days, None);
        assert_eq!(loaded.selected_lang, None);
        assert_eq!(store.get_param("last_days"), Value::Null);
    }

    #[test]
    fn test_save_round_trips_typed_settings() {
        let (store, _temp) = create_test_store();
        let settings = ImportSettings {
            auto_import_on_startup: true,
            selected_lang: Some(4),
            ..Default::default()
        };

        store.save(&settings).unwrap();
        assert_eq!(store.load(), settings);
        assert_eq!(store.get_param("auto_import_on_startup"), json!(true));
    }
}
