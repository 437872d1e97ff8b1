#![allow(dead_code)]

use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use bazaar::config::{from_figment, ConfigV1};
use bazaar::state::AppState;
use bazaar::startup::build_with_storage;
use bazaar::storage::{create_storage, MemoryStorage, StorageError, TokenStorage};
use figment::{
    providers::{Format, Yaml},
    Figment,
};
use mockito::{Matcher, Mock, ServerGuard};
use serde_json::json;

/// Config pointing at `base_url`, with file storage when `session_file` is set.
pub fn test_config(base_url: &str, session_file: Option<&Path>) -> ConfigV1 {
    let storage = match session_file {
        Some(path) => format!("storage:\n  type: file\n  path: \"{}\"\n", path.display()),
        None => "storage:\n  type: memory\n".to_string(),
    };
    let yaml = format!(
        "version: \"1.0.0\"\napi:\n  base_url: \"{}\"\n  timeout_in_ms: 2000\n{}logging:\n  level: debug\n",
        base_url, storage
    );
    from_figment(Figment::new().merge(Yaml::string(&yaml))).expect("test config should parse")
}

pub fn build_app(config: ConfigV1) -> (AppState, Arc<dyn TokenStorage>) {
    let storage = create_storage(&config.storage);
    build_app_with_storage(config, storage)
}

pub fn build_app_with_storage(
    config: ConfigV1,
    storage: Arc<dyn TokenStorage>,
) -> (AppState, Arc<dyn TokenStorage>) {
    let state = build_with_storage(Arc::new(config), storage.clone()).expect("app should build");
    (state, storage)
}

pub async fn mock_login(server: &mut ServerGuard, username: &str, access: &str) -> Mock {
    server
        .mock("POST", "/api/auth/login/")
        .match_body(Matcher::PartialJson(json!({ "username": username })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(json!({ "access": access, "refresh": format!("{}-refresh", access) }).to_string())
        .create_async()
        .await
}

pub async fn mock_user(server: &mut ServerGuard, access: &str, username: &str, is_admin: bool) -> Mock {
    server
        .mock("GET", "/api/auth/user/")
        .match_header("authorization", format!("Bearer {}", access).as_str())
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "id": 1,
                "username": username,
                "email": format!("{}@example.com", username),
                "isAdmin": is_admin
            })
            .to_string(),
        )
        .create_async()
        .await
}

/// Memory storage whose writes to one key can be made to fail.
#[derive(Default)]
pub struct FlakyStorage {
    inner: MemoryStorage,
    failing_key: Mutex<Option<&'static str>>,
}

impl FlakyStorage {
    pub fn fail_writes_to(&self, key: &'static str) {
        *self.failing_key.lock().unwrap() = Some(key);
    }
}

impl TokenStorage for FlakyStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        self.inner.get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        if *self.failing_key.lock().unwrap() == Some(key) {
            return Err(StorageError::Io {
                path: PathBuf::from("flaky"),
                source: io::Error::new(io::ErrorKind::Other, "disk full"),
            });
        }
        self.inner.set(key, value)
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.inner.remove(key)
    }
}
