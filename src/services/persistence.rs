//! Durable key/value storage for session data

use std::collections::{BTreeMap, HashMap};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

use crate::error::{FluxError, Result};

/// Key under which the last opened repository path is stored
pub const LAST_REPOSITORY_KEY: &str = "flux_last_repository";

/// String key/value store.
///
/// A missing key is `Ok(None)`, never an error. Errors mean the underlying
/// storage is unusable.
pub trait PersistenceAdapter: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
    fn remove(&self, key: &str) -> Result<()>;
}

/// Store backed by a JSON object on disk, rewritten on every change
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

    fn read(&self) -> Result<Option<String>> {
        if !self.path.exists() {
            return Ok(None);
        }

        fs::read_to_string(&self.path)
            .map(Some)
            .map_err(|e| FluxError::Storage(format!("Failed to read session file: {}", e)))
    }

    fn load(&self) -> Result<BTreeMap<String, String>> {
        match self.read()? {
            Some(content) => serde_json::from_str(&content)
                .map_err(|e| FluxError::Storage(format!("Failed to parse session file: {}", e))),
            None => Ok(BTreeMap::new()),
        }
    }

    /// Entries to rewrite, and whether the file on disk must be replaced
    /// regardless. An unparsable file is dropped so writes can recover it.
    fn load_for_update(&self) -> Result<(BTreeMap<String, String>, bool)> {
        let Some(content) = self.read()? else {
            return Ok((BTreeMap::new(), false));
        };

        match serde_json::from_str(&content) {
            Ok(entries) => Ok((entries, false)),
            Err(e) => {
                tracing::warn!(
                    "Discarding unreadable session file {}: {}",
                    self.path.display(),
                    e
                );
                Ok((BTreeMap::new(), true))
            }
        }
    }

    /// Write through a sibling temp file so a crash never leaves a torn file
    fn save(&self, entries: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).map_err(|e| {
                FluxError::Storage(format!("Failed to create session directory: {}", e))
            })?;
        }

        let content = serde_json::to_string_pretty(entries).map_err(|e| {
            FluxError::Storage(format!("Failed to serialize session: {}", e))
        })?;

        let staging = self.staging_path();
        fs::write(&staging, content)
            .map_err(|e| FluxError::Storage(format!("Failed to write session file: {}", e)))?;
        fs::rename(&staging, &self.path)
            .map_err(|e| FluxError::Storage(format!("Failed to replace session file: {}", e)))
    }

    fn staging_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl PersistenceAdapter for JsonFileStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let (mut entries, _) = self.load_for_update()?;
        entries.insert(key.to_string(), value.to_string());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> Result<()> {
        let (mut entries, discarded) = self.load_for_update()?;
        if entries.remove(key).is_some() || discarded {
            self.save(&entries)?;
        }
        Ok(())
    }
}

/// In-process store for tests and headless runs
#[derive(Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-seeded with one entry
    pub fn with_entry(key: &str, value: &str) -> Self {
        let store = Self::new();
        if let Ok(mut entries) = store.entries.lock() {
            entries.insert(key.to_string(), value.to_string());
        }
        store
    }

    fn entries(&self) -> Result<std::sync::MutexGuard<'_, HashMap<String, String>>> {
        self.entries
            .lock()
            .map_err(|_| FluxError::Storage("Lock poisoned".to_string()))
    }
}

impl PersistenceAdapter for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries()?.get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        self.entries()?.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<()> {
        self.entries()?.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_file_store_missing_file_is_empty() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = JsonFileStore::new(dir.path().join("session.json"));
        assert_eq!(store.get(LAST_REPOSITORY_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_store_set_get_remove() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = JsonFileStore::new(dir.path().join("nested").join("session.json"));

        store.set(LAST_REPOSITORY_KEY, "/home/user/repo").unwrap();
        assert_eq!(
            store.get(LAST_REPOSITORY_KEY).unwrap().as_deref(),
            Some("/home/user/repo")
        );

        // A second store over the same file sees the value
        let reopened = JsonFileStore::new(store.path().to_path_buf());
        assert_eq!(
            reopened.get(LAST_REPOSITORY_KEY).unwrap().as_deref(),
            Some("/home/user/repo")
        );

        store.remove(LAST_REPOSITORY_KEY).unwrap();
        assert_eq!(store.get(LAST_REPOSITORY_KEY).unwrap(), None);
    }

    #[test]
    fn test_file_store_remove_missing_key_is_ok() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = JsonFileStore::new(dir.path().join("session.json"));
        assert!(store.remove("nothing").is_ok());
        assert!(!store.path().exists());
    }

    #[test]
    fn test_file_store_keeps_other_keys() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = JsonFileStore::new(dir.path().join("session.json"));
        store.set("other", "value").unwrap();
        store.set(LAST_REPOSITORY_KEY, "/repo").unwrap();
        store.remove(LAST_REPOSITORY_KEY).unwrap();
        assert_eq!(store.get("other").unwrap().as_deref(), Some("value"));
    }

    #[test]
    fn test_file_store_corrupt_file_is_storage_error() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("session.json");
        fs::write(&path, "{ truncated").unwrap();

        let store = JsonFileStore::new(path);
        assert!(matches!(
            store.get(LAST_REPOSITORY_KEY),
            Err(FluxError::Storage(_))
        ));
    }

    #[test]
    fn test_file_store_remove_recovers_corrupt_file() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("session.json");
        fs::write(&path, "{ truncated").unwrap();
        let store = JsonFileStore::new(&path);

        store.remove(LAST_REPOSITORY_KEY).unwrap();

        assert_eq!(store.get(LAST_REPOSITORY_KEY).unwrap(), None);
        assert_eq!(fs::read_to_string(&path).unwrap().trim(), "{}");
    }

    #[test]
    fn test_file_store_set_over_corrupt_file() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let path = dir.path().join("session.json");
        fs::write(&path, "{ truncated").unwrap();
        let store = JsonFileStore::new(&path);

        store.set(LAST_REPOSITORY_KEY, "/repo").unwrap();

        assert_eq!(store.get(LAST_REPOSITORY_KEY).unwrap().as_deref(), Some("/repo"));
    }

    #[test]
    fn test_file_store_leaves_no_staging_file() {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let store = JsonFileStore::new(dir.path().join("session.json"));
        store.set(LAST_REPOSITORY_KEY, "/repo").unwrap();

        let names: Vec<String> = fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(names, vec!["session.json".to_string()]);
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryStore::with_entry(LAST_REPOSITORY_KEY, "/repo");
        assert_eq!(store.get(LAST_REPOSITORY_KEY).unwrap().as_deref(), Some("/repo"));
        store.remove(LAST_REPOSITORY_KEY).unwrap();
        assert_eq!(store.get(LAST_REPOSITORY_KEY).unwrap(), None);
    }
}
