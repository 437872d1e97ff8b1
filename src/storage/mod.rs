pub mod base;
pub mod file_storage;
pub mod memory_storage;

// Re-export the primary storage items so code outside can do
// "use crate::storage::{TokenStorage, create_storage};"
pub use base::{
    create_storage, StorageError, TokenStorage, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY,
    SESSION_KEYS, USER_KEY,
};
pub use file_storage::{FileStorage, FileStorageConfig};
pub use memory_storage::MemoryStorage;
