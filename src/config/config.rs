use std::path::Path;

use figment::providers::{Env, Format, Yaml};
use figment::Figment;
use schemars::{schema_for, JsonSchema};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::api::ApiConfig;
use super::logging::LoggingConfig;
use super::storage::StorageConfig;
use crate::guard::Route;

/// Prefix for environment overrides, e.g. `BAZAAR_API__BASE_URL`.
pub const ENV_PREFIX: &str = "BAZAAR_";

/// A top-level enum for versioned configurations.
#[derive(Deserialize, Serialize, JsonSchema)]
#[serde(tag = "version")]
pub enum Config {
    #[serde(rename = "1.0.0")]
    ConfigV1(ConfigV1),
}

/// Main config for v1.0.0: backend location, session storage, logging and
/// an optional replacement for the built-in route table.
#[derive(Deserialize, Serialize, Debug, Clone, Default, JsonSchema)]
pub struct ConfigV1 {
    #[serde(default)]
    pub api: ApiConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub routes: Option<Vec<Route>>,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("error loading configuration: {0}")]
    Load(#[from] Box<figment::Error>),
}

/// Extracts a versioned config from an already assembled figment.
pub fn from_figment(figment: Figment) -> Result<ConfigV1, ConfigError> {
    let config = figment.extract::<Config>().map_err(Box::new)?;
    match config {
        Config::ConfigV1(c) => Ok(c),
    }
    // handle configuration migration between versions here when necessary
}

/// Load config from a YAML file, with `BAZAAR_`-prefixed environment variables
/// taking precedence (`__` separates nested keys).
pub fn load_config(path: &Path) -> Result<ConfigV1, ConfigError> {
    let figment = Figment::new()
        .merge(Yaml::file(path))
        .merge(Env::prefixed(ENV_PREFIX).split("__"));
    from_figment(figment)
}

/// Render the JSON schema for the configuration.
pub fn schema_json() -> Result<String, serde_json::Error> {
    let schema = schema_for!(Config);
    serde_json::to_string_pretty(&schema)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::StorageConfig;

    const TEST_CONFIG: &str = r#"
version: "1.0.0"
api:
  base_url: "http://127.0.0.1:9000"
  timeout_in_ms: 2500
storage:
  type: file
  path: /tmp/bazaar/session.json
logging:
  level: debug
  format: json
routes:
  - path: /
    name: Home
  - path: /admin
    name: Admin
    meta:
      requiresAdmin: true
"#;

    fn parse(yaml: &str) -> ConfigV1 {
        from_figment(Figment::new().merge(Yaml::string(yaml))).expect("config should parse")
    }

    #[test]
    fn test_full_config_parses() {
        let config = parse(TEST_CONFIG);

        assert_eq!(config.api.base_url, "http://127.0.0.1:9000");
        assert_eq!(config.api.timeout_in_ms, Some(2500));
        match &config.storage {
            StorageConfig::File(file) => {
                assert_eq!(file.path, Path::new("/tmp/bazaar/session.json"))
            }
            other => panic!("expected file storage, got {:?}", other),
        }
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, "json");

        let routes = config.routes.expect("routes should be present");
        assert_eq!(routes.len(), 2);
        assert!(routes[1].meta.requires_admin);
        assert!(!routes[1].meta.requires_auth);
    }

    #[test]
    fn test_malformed_route_flags_do_not_reject_config() {
        let config = parse(
            r#"
version: "1.0.0"
routes:
  - path: /reports
    meta:
      requiresAuth: "yes"
      requiresAdmin: true
"#,
        );

        let routes = config.routes.expect("routes should be present");
        assert!(!routes[0].meta.requires_auth);
        assert!(routes[0].meta.requires_admin);
    }

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = parse("version: \"1.0.0\"\n");

        assert_eq!(config.api.base_url, "http://localhost:8000");
        assert_eq!(config.api.timeout_in_ms, None);
        assert!(matches!(config.storage, StorageConfig::Memory));
        assert_eq!(config.logging.level, "info");
        assert!(config.routes.is_none());
    }

    #[test]
    fn test_unknown_version_is_rejected() {
        let result = from_figment(Figment::new().merge(Yaml::string("version: \"0.9\"\n")));
        assert!(result.is_err());
    }

    #[test]
    fn test_schema_renders() {
        let schema = schema_json().unwrap();
        assert!(schema.contains("base_url"));
    }
}
