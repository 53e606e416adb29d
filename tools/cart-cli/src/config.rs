//! CLI configuration.

use anyhow::{Context, Result};
use cart_kv::DEFAULT_QUOTA_BYTES;
use cart_store::StoreConfig;
use serde::{Deserialize, Serialize};

/// Config file names searched for, in order.
pub const CONFIG_NAMES: [&str; 3] = ["cart.toml", ".cart.toml", "cart.json"];

/// CLI configuration file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CliConfig {
    /// Cart record settings.
    #[serde(default)]
    pub store: StoreConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl CliConfig {
    /// Load config from a file.
    pub fn load(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path))?;

        if path.ends_with(".json") {
            serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse JSON config: {}", path))
        } else {
            toml::from_str(&content)
                .with_context(|| format!("Failed to parse TOML config: {}", path))
        }
    }
}

/// Storage backend configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Storage file, relative to the working directory unless absolute.
    #[serde(default = "default_storage_path")]
    pub path: String,

    /// Byte quota for the storage file; 0 means unlimited.
    #[serde(default = "default_quota")]
    pub quota_bytes: usize,
}

fn default_storage_path() -> String {
    ".cart/local-storage.json".to_string()
}

fn default_quota() -> usize {
    DEFAULT_QUOTA_BYTES
}

impl StorageConfig {
    /// Effective quota, `None` when unlimited.
    pub fn quota(&self) -> Option<usize> {
        (self.quota_bytes > 0).then_some(self.quota_bytes)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            path: default_storage_path(),
            quota_bytes: default_quota(),
        }
    }
}

/// Log output format.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable format (for development).
    #[default]
    Human,
    /// JSON format (for log aggregation).
    Json,
}

/// Logging configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Default filter when `RUST_LOG` is unset.
    #[serde(default = "default_level")]
    pub level: String,

    /// Output format.
    #[serde(default)]
    pub format: LogFormat,
}

fn default_level() -> String {
    "warn".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            format: LogFormat::default(),
        }
    }
}

/// Generate a default cart.toml config file.
pub fn generate_default_config() -> String {
    format!(
        r#"# Storefront cart configuration

[store]
key = "cart"
# namespace = "shop"
read_legacy_keys = true

[storage]
path = "{path}"
quota_bytes = {quota}

[logging]
level = "warn"
format = "human"
"#,
        path = default_storage_path(),
        quota = DEFAULT_QUOTA_BYTES
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_file_parses_to_defaults() {
        let config: CliConfig = toml::from_str(&generate_default_config()).unwrap();
        assert_eq!(config, CliConfig::default());
    }

    #[test]
    fn test_partial_toml() {
        let config: CliConfig = toml::from_str(
            r#"
[store]
namespace = "shop"

[logging]
format = "json"
"#,
        )
        .unwrap();
        assert_eq!(config.store.record_key(), "shop:cart");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.logging.level, "warn");
        assert_eq!(config.storage, StorageConfig::default());
    }

    #[test]
    fn test_load_json_and_toml() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("cart.json");
        std::fs::write(&json_path, r#"{"storage":{"path":"/tmp/s.json"}}"#).unwrap();
        let config = CliConfig::load(json_path.to_str().unwrap()).unwrap();
        assert_eq!(config.storage.path, "/tmp/s.json");

        let toml_path = dir.path().join("cart.toml");
        std::fs::write(&toml_path, "[store]\nkey = \"basket\"\n").unwrap();
        let config = CliConfig::load(toml_path.to_str().unwrap()).unwrap();
        assert_eq!(config.store.key, "basket");
    }

    #[test]
    fn test_zero_quota_is_unlimited() {
        let config: StorageConfig = toml::from_str("quota_bytes = 0").unwrap();
        assert_eq!(config.quota(), None);
        assert_eq!(StorageConfig::default().quota(), Some(DEFAULT_QUOTA_BYTES));
    }

    #[test]
    fn test_toml_round_trip() {
        let config = CliConfig::default();
        let rendered = toml::to_string_pretty(&config).unwrap();
        let back: CliConfig = toml::from_str(&rendered).unwrap();
        assert_eq!(back, config);
    }
}
