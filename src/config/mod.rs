//! Application configuration.
//!
//! Aggregates configuration from all modules into a single Config struct
//! that can be loaded from YAML files or environment variables.

mod http;

pub use http::HttpConfig;

/// Default configuration file name.
pub const DEFAULT_CONFIG_FILE: &str = "config.yaml";
/// Environment variable for configuration file path.
pub const CONFIG_ENV_VAR: &str = "STOCKROOM_CONFIG";
/// Prefix for configuration environment variables.
pub const CONFIG_ENV_PREFIX: &str = "STOCKROOM";
/// Environment variable for logging configuration.
pub const LOG_ENV_VAR: &str = "STOCKROOM_LOG";

use serde::Deserialize;

use crate::bus::MessagingConfig;
use crate::store::StorageConfig;

/// Main application configuration.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    /// HTTP server configuration.
    pub http: HttpConfig,
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Messaging configuration.
    pub messaging: MessagingConfig,
}

impl Config {
    /// Load configuration from file and environment.
    ///
    /// Configuration sources (in order of priority, later overrides earlier):
    /// 1. `config.yaml` in current directory (if exists)
    /// 2. File specified by `path` argument (if provided)
    /// 3. File specified by `CONFIG_ENV_VAR` environment variable (if set)
    /// 4. Environment variables with `CONFIG_ENV_PREFIX` prefix
    pub fn load(path: Option<&str>) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        use ::config::{Config as ConfigLib, Environment, File, FileFormat};

        let mut builder = ConfigLib::builder()
            .add_source(File::new(DEFAULT_CONFIG_FILE, FileFormat::Yaml).required(false));

        // Add config file from path argument if provided
        if let Some(config_path) = path {
            builder = builder.add_source(File::new(config_path, FileFormat::Yaml).required(true));
        }

        // Add config file from CONFIG_ENV_VAR env var if set
        if let Ok(config_path) = std::env::var(CONFIG_ENV_VAR) {
            builder = builder.add_source(File::new(&config_path, FileFormat::Yaml).required(true));
        }

        let config = builder
            // Environment variables with CONFIG_ENV_PREFIX prefix
            .add_source(
                Environment::with_prefix(CONFIG_ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Config = config.try_deserialize()?;
        Ok(config)
    }

    /// Create config for testing.
    pub fn for_test() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default() {
        let config = Config::default();
        assert_eq!(config.http.port, 8080);
        assert_eq!(config.http.host, "0.0.0.0");
        assert!(!config.http.order_endpoint);
        assert_eq!(config.messaging.orders_topic, "orders");
        assert_eq!(config.messaging.inventory_topic, "inventory");
    }

    #[test]
    fn test_bind_addr() {
        let config = Config::for_test();
        assert_eq!(config.http.bind_addr(), "0.0.0.0:8080");
    }

    #[test]
    #[serial_test::serial]
    fn test_env_override() {
        std::env::set_var("STOCKROOM__HTTP__PORT", "9090");
        std::env::set_var("STOCKROOM__MESSAGING__ORDERS_TOPIC", "orders.test");

        let config = Config::load(None).expect("load config");
        assert_eq!(config.http.port, 9090);
        assert_eq!(config.messaging.orders_topic, "orders.test");

        std::env::remove_var("STOCKROOM__HTTP__PORT");
        std::env::remove_var("STOCKROOM__MESSAGING__ORDERS_TOPIC");
    }
}
