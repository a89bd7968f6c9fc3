//! # Persisted Key-Value Store
//!
//! A single JSON object file holding small values by key. It backs the
//! "remember my last form" behaviour: read once at startup, written on
//! every change.
//!
//! Read failures never abort the session. A missing file, an unreadable file
//! or a value that no longer parses is logged and treated as absent, so the
//! caller falls back to its defaults.

use std::path::{Path, PathBuf};

use log::{debug, error};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::error::{ExportError, ExportResult};

/// Key under which the last-used certificate record is stored.
pub const CERTIFICATE_DATA_KEY: &str = "certificate-data";

#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load and decode the value stored under `key`.
    pub fn load<T: DeserializeOwned>(&self, key: &str) -> Option<T> {
        let entries = self.read_entries();
        let value = entries.get(key)?.clone();
        match serde_json::from_value(value) {
            Ok(v) => Some(v),
            Err(e) => {
                error!("Error reading store key \"{}\": {}", key, e);
                None
            }
        }
    }

    /// Load `key`, falling back to `default` when absent or unreadable.
    pub fn load_or<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        self.load(key).unwrap_or(default)
    }

    /// Encode `value` and write it under `key`, keeping other keys intact.
    pub fn save<T: Serialize>(&self, key: &str, value: &T) -> ExportResult<()> {
        let mut entries = self.read_entries();
        entries.insert(key.to_string(), serde_json::to_value(value)?);
        self.write_entries(&entries)
    }

    /// Remove `key`. Removing an absent key is not an error.
    pub fn remove(&self, key: &str) -> ExportResult<()> {
        let mut entries = self.read_entries();
        if entries.remove(key).is_some() {
            self.write_entries(&entries)?;
        }
        Ok(())
    }

    fn read_entries(&self) -> Map<String, Value> {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Store {} does not exist yet", self.path.display());
                return Map::new();
            }
            Err(e) => {
                error!("Error reading store {}: {}", self.path.display(), e);
                return Map::new();
            }
        };
        match serde_json::from_str::<Value>(&raw) {
            Ok(Value::Object(map)) => map,
            Ok(_) | Err(_) => {
                error!("Store {} is not a JSON object, ignoring it", self.path.display());
                Map::new()
            }
        }
    }

    fn write_entries(&self, entries: &Map<String, Value>) -> ExportResult<()> {
        let path = self.path.display().to_string();
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .map_err(|e| ExportError::io("create store directory", e).with_path(&path))?;
        }
        let body = serde_json::to_string_pretty(entries)?;
        std::fs::write(&self.path, body)
            .map_err(|e| ExportError::io("write store", e).with_path(path))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::CertificateData;

    #[test]
    fn missing_file_loads_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("state.json"));
        assert!(store.load::<CertificateData>(CERTIFICATE_DATA_KEY).is_none());
    }

    #[test]
    fn save_then_load_keeps_other_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("nested/state.json"));
        store.save("other", &42u32).unwrap();

        let record = CertificateData::default();
        store.save(CERTIFICATE_DATA_KEY, &record).unwrap();

        assert_eq!(store.load::<CertificateData>(CERTIFICATE_DATA_KEY), Some(record));
        assert_eq!(store.load::<u32>("other"), Some(42));

        store.remove("other").unwrap();
        assert_eq!(store.load::<u32>("other"), None);
        store.remove("other").unwrap();
    }

    #[test]
    fn corrupt_file_falls_back_to_default() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("state.json");
        std::fs::write(&path, "{not json").unwrap();
        let store = JsonFileStore::new(&path);
        assert_eq!(store.load_or("n", 7u32), 7);
    }

    #[test]
    fn mistyped_value_is_treated_as_absent() {
        let dir = tempfile::tempdir().unwrap();
        let store = JsonFileStore::new(dir.path().join("state.json"));
        store.save(CERTIFICATE_DATA_KEY, &"just a string").unwrap();
        assert!(store.load::<CertificateData>(CERTIFICATE_DATA_KEY).is_none());
    }
}
