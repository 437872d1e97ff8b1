use std::path::PathBuf;
use std::sync::Arc;

use thiserror::Error;
use tracing::info;

use super::{file_storage::FileStorage, memory_storage::MemoryStorage};
use crate::config::StorageConfig;

/// Key holding the bearer access token.
pub const ACCESS_TOKEN_KEY: &str = "access_token";
/// Key holding the refresh token.
pub const REFRESH_TOKEN_KEY: &str = "refresh_token";
/// Key holding the JSON-serialized user profile.
pub const USER_KEY: &str = "user";

/// Every key the session writes; logout removes all of them.
pub const SESSION_KEYS: [&str; 3] = [ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY, USER_KEY];

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("failed to access session file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode value for key '{key}': {source}")]
    Encode {
        key: String,
        #[source]
        source: serde_json::Error,
    },
}

/// The TokenStorage trait abstracts the durable key/value store that keeps the
/// session across restarts (the browser's local storage in a web client).
pub trait TokenStorage: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
    fn is_persistent(&self) -> bool {
        // Real backends survive a restart; the in-memory one reports false
        // so startup can warn about it.
        true
    }
}

/// Creates a concrete storage implementation based on the StorageConfig.
pub fn create_storage(config: &StorageConfig) -> Arc<dyn TokenStorage> {
    match config {
        StorageConfig::Memory => {
            info!("Using in-memory session storage");
            Arc::new(MemoryStorage::new())
        }
        StorageConfig::File(file_config) => {
            info!(
                "Using file session storage at '{}'",
                file_config.path.display()
            );
            Arc::new(FileStorage::new(file_config))
        }
    }
}
