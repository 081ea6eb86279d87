//! Configuration loading and resolution
//!
//! Every field resolves with the same priority order:
//! 1. Environment variable (highest priority)
//! 2. TOML config file
//! 3. Compiled default (required fields have none and fail resolution)

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Default remote request timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP listen port for the enrichment service
pub const DEFAULT_PORT: u16 = 5741;

/// Raw TOML configuration file contents
///
/// All fields optional; resolution into [`ServiceConfig`] decides which are
/// required.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TomlConfig {
    /// Object store URL (e.g. `s3://bucket`, `file:///data`, `memory:///`)
    pub store_url: Option<String>,
    /// Reference dataset location: local path, or `store://<key>` for a
    /// CSV held in the object store
    pub dataset_path: Option<String>,
    /// Dataset column used as the join key against object identifiers
    pub join_key_column: Option<String>,
    /// Base URL of the remote record API
    pub api_base_url: Option<String>,
    /// Remote request timeout in seconds
    pub request_timeout_secs: Option<u64>,
    /// HTTP listen port
    pub listen_port: Option<u16>,
}

/// Fully resolved service configuration
#[derive(Debug, Clone)]
pub struct ServiceConfig {
    pub store_url: String,
    pub dataset_path: String,
    pub join_key_column: String,
    pub api_base_url: String,
    pub request_timeout_secs: u64,
    pub listen_port: u16,
}

impl ServiceConfig {
    /// Resolve configuration from the environment and the config file.
    ///
    /// The config file location itself follows the same priority order:
    /// `TAGMILL_CONFIG` env var, then `~/.config/tagmill/tagmill.toml`,
    /// then `/etc/tagmill/config.toml`.
    pub fn resolve() -> Result<Self> {
        let file = match locate_config_file() {
            Some(path) => {
                info!("Loading configuration from {}", path.display());
                read_toml_config(&path)?
            }
            None => TomlConfig::default(),
        };
        Self::from_sources(file)
    }

    /// Merge environment variables over file values and validate.
    pub fn from_sources(file: TomlConfig) -> Result<Self> {
        let request_timeout_secs = resolve_field(
            "TAGMILL_REQUEST_TIMEOUT_SECS",
            file.request_timeout_secs.map(|v| v.to_string()),
        )
        .map(|v| {
            v.parse::<u64>()
                .map_err(|_| Error::Config(format!("invalid request_timeout_secs: {v}")))
        })
        .transpose()?
        .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let listen_port = resolve_field(
            "TAGMILL_LISTEN_PORT",
            file.listen_port.map(|v| v.to_string()),
        )
        .map(|v| {
            v.parse::<u16>()
                .map_err(|_| Error::Config(format!("invalid listen_port: {v}")))
        })
        .transpose()?
        .unwrap_or(DEFAULT_PORT);

        Ok(Self {
            store_url: require("store_url", "TAGMILL_STORE_URL", file.store_url)?,
            dataset_path: require("dataset_path", "TAGMILL_DATASET_PATH", file.dataset_path)?,
            join_key_column: require(
                "join_key_column",
                "TAGMILL_JOIN_KEY_COLUMN",
                file.join_key_column,
            )?,
            api_base_url: require("api_base_url", "TAGMILL_API_BASE_URL", file.api_base_url)?,
            request_timeout_secs,
            listen_port,
        })
    }
}

/// Resolve one field: environment variable first, then file value.
fn resolve_field(env_var: &str, file_value: Option<String>) -> Option<String> {
    std::env::var(env_var)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .or(file_value)
}

/// Resolve a required field, erroring with a configuration hint if absent.
fn require(field: &str, env_var: &str, file_value: Option<String>) -> Result<String> {
    resolve_field(env_var, file_value).ok_or_else(|| {
        Error::Config(format!(
            "{field} not configured (set {env_var} or {field} in tagmill.toml)"
        ))
    })
}

/// Find the configuration file for this platform, if any exists.
fn locate_config_file() -> Option<PathBuf> {
    if let Ok(path) = std::env::var("TAGMILL_CONFIG") {
        return Some(PathBuf::from(path));
    }

    if let Some(user_config) = dirs::config_dir().map(|d| d.join("tagmill").join("tagmill.toml")) {
        if user_config.exists() {
            return Some(user_config);
        }
    }

    let system_config = PathBuf::from("/etc/tagmill/config.toml");
    if system_config.exists() {
        return Some(system_config);
    }

    None
}

/// Read and parse a TOML configuration file.
pub fn read_toml_config(path: &Path) -> Result<TomlConfig> {
    let content = std::fs::read_to_string(path)?;
    toml::from_str(&content)
        .map_err(|e| Error::Config(format!("failed to parse {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;
    use std::io::Write;

    fn clear_env() {
        for var in [
            "TAGMILL_CONFIG",
            "TAGMILL_STORE_URL",
            "TAGMILL_DATASET_PATH",
            "TAGMILL_JOIN_KEY_COLUMN",
            "TAGMILL_API_BASE_URL",
            "TAGMILL_REQUEST_TIMEOUT_SECS",
            "TAGMILL_LISTEN_PORT",
        ] {
            std::env::remove_var(var);
        }
    }

    fn full_file_config() -> TomlConfig {
        TomlConfig {
            store_url: Some("memory:///".to_string()),
            dataset_path: Some("/data/reference.csv".to_string()),
            join_key_column: Some("file_id".to_string()),
            api_base_url: Some("http://localhost:9000/records".to_string()),
            request_timeout_secs: Some(5),
            listen_port: Some(6000),
        }
    }

    #[test]
    #[serial]
    fn test_file_values_resolve() {
        clear_env();
        let config = ServiceConfig::from_sources(full_file_config()).unwrap();
        assert_eq!(config.store_url, "memory:///");
        assert_eq!(config.join_key_column, "file_id");
        assert_eq!(config.request_timeout_secs, 5);
        assert_eq!(config.listen_port, 6000);
    }

    #[test]
    #[serial]
    fn test_env_overrides_file() {
        clear_env();
        std::env::set_var("TAGMILL_STORE_URL", "s3://production-bucket");
        let config = ServiceConfig::from_sources(full_file_config()).unwrap();
        assert_eq!(config.store_url, "s3://production-bucket");
        std::env::remove_var("TAGMILL_STORE_URL");
    }

    #[test]
    #[serial]
    fn test_missing_required_field() {
        clear_env();
        let mut file = full_file_config();
        file.api_base_url = None;
        let err = ServiceConfig::from_sources(file).unwrap_err();
        assert!(err.to_string().contains("api_base_url"));
    }

    #[test]
    #[serial]
    fn test_defaults_applied() {
        clear_env();
        let mut file = full_file_config();
        file.request_timeout_secs = None;
        file.listen_port = None;
        let config = ServiceConfig::from_sources(file).unwrap();
        assert_eq!(config.request_timeout_secs, DEFAULT_TIMEOUT_SECS);
        assert_eq!(config.listen_port, DEFAULT_PORT);
    }

    #[test]
    #[serial]
    fn test_invalid_timeout_rejected() {
        clear_env();
        std::env::set_var("TAGMILL_REQUEST_TIMEOUT_SECS", "not-a-number");
        let err = ServiceConfig::from_sources(full_file_config()).unwrap_err();
        assert!(err.to_string().contains("request_timeout_secs"));
        std::env::remove_var("TAGMILL_REQUEST_TIMEOUT_SECS");
    }

    #[test]
    #[serial]
    fn test_read_toml_config_roundtrip() {
        clear_env();
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("tagmill.toml");
        let mut f = std::fs::File::create(&path).unwrap();
        writeln!(f, "store_url = \"file:///var/objects\"").unwrap();
        writeln!(f, "join_key_column = \"asset_id\"").unwrap();

        let parsed = read_toml_config(&path).unwrap();
        assert_eq!(parsed.store_url.as_deref(), Some("file:///var/objects"));
        assert_eq!(parsed.join_key_column.as_deref(), Some("asset_id"));
        assert!(parsed.api_base_url.is_none());
    }
}
