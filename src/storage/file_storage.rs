use std::collections::BTreeMap;
use std::fs;
use std::io::ErrorKind;
use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::{StorageError, TokenStorage};

/// The config struct for file-backed session storage.
#[derive(Deserialize, Serialize, JsonSchema, Debug, Clone, PartialEq)]
pub struct FileStorageConfig {
    pub path: PathBuf,
}

/// Keeps all entries as one flat JSON object in a single file.
///
/// Every operation reads the file, applies the change and writes it back, so
/// two processes sharing the file see each other's writes on their next call.
pub struct FileStorage {
    path: PathBuf,
    // Serializes read-modify-write cycles within this process.
    lock: Mutex<()>,
}

impl FileStorage {
    pub fn new(config: &FileStorageConfig) -> Self {
        FileStorage {
            path: config.path.clone(),
            lock: Mutex::new(()),
        }
    }

    fn load(&self) -> Result<BTreeMap<String, String>, StorageError> {
        let raw = match fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(BTreeMap::new()),
            Err(source) => {
                return Err(StorageError::Io {
                    path: self.path.clone(),
                    source,
                })
            }
        };
        if raw.trim().is_empty() {
            return Ok(BTreeMap::new());
        }
        match serde_json::from_str(&raw) {
            Ok(entries) => Ok(entries),
            Err(e) => {
                // The next write replaces the file.
                warn!(
                    "Session file {} is not valid JSON, treating it as empty: {}",
                    self.path.display(),
                    e
                );
                Ok(BTreeMap::new())
            }
        }
    }

    fn is_present(&self) -> bool {
        self.path.exists()
    }

    fn save(&self, entries: &BTreeMap<String, String>) -> Result<(), StorageError> {
        let io_err = |source| StorageError::Io {
            path: self.path.clone(),
            source,
        };
        if entries.is_empty() {
            return match fs::remove_file(&self.path) {
                Ok(()) => Ok(()),
                Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
                Err(e) => Err(io_err(e)),
            };
        }
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_err)?;
        }
        let raw = serde_json::to_string_pretty(entries)
            .map_err(|e| io_err(std::io::Error::new(ErrorKind::InvalidData, e)))?;
        fs::write(&self.path, raw).map_err(io_err)
    }
}

impl TokenStorage for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(self.load()?.remove(key))
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.load()?;
        entries.insert(key.to_string(), value.to_string());
        debug!("Writing key '{}' to {}", key, self.path.display());
        self.save(&entries)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        let _guard = self.lock.lock().unwrap_or_else(PoisonError::into_inner);
        let mut entries = self.load()?;
        // An unreadable file left behind is rewritten (or deleted) as well.
        if entries.remove(key).is_some() || (entries.is_empty() && self.is_present()) {
            self.save(&entries)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn storage_in(dir: &tempfile::TempDir) -> FileStorage {
        FileStorage::new(&FileStorageConfig {
            path: dir.path().join("nested").join("session.json"),
        })
    }

    #[test]
    fn test_file_storage_persists_across_instances() {
        let dir = tempfile::tempdir().unwrap();
        storage_in(&dir).set("access_token", "abc").unwrap();

        let reopened = storage_in(&dir);
        assert_eq!(reopened.get("access_token").unwrap().as_deref(), Some("abc"));
        assert_eq!(reopened.get("refresh_token").unwrap(), None);
    }

    #[test]
    fn test_file_storage_removes_file_when_last_key_goes() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(&dir);
        storage.set("user", "{}").unwrap();
        assert!(storage.path.exists());

        storage.remove("user").unwrap();
        assert!(!storage.path.exists());
        // Removing from a missing file is a no-op.
        storage.remove("user").unwrap();
    }

    #[test]
    fn test_corrupt_file_reads_as_empty_and_is_cleaned_up() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(&dir);
        fs::create_dir_all(storage.path.parent().unwrap()).unwrap();
        fs::write(&storage.path, "{not json").unwrap();

        assert_eq!(storage.get("access_token").unwrap(), None);
        storage.remove("access_token").unwrap();
        assert!(!storage.path.exists());
    }

    #[test]
    fn test_corrupt_file_is_replaced_on_write() {
        let dir = tempfile::tempdir().unwrap();
        let storage = storage_in(&dir);
        fs::create_dir_all(storage.path.parent().unwrap()).unwrap();
        fs::write(&storage.path, "{not json").unwrap();

        storage.set("access_token", "abc").unwrap();
        assert_eq!(storage.get("access_token").unwrap().as_deref(), Some("abc"));
        assert!(fs::read_to_string(&storage.path).unwrap().contains("abc"));
    }
}
