//! Client configuration
//!
//! Values come from an optional config file layered under `HOSTDECK_*`
//! environment variables, e.g. `HOSTDECK_BASE_URL=http://api:8080/services`.

use std::path::Path;

use config::{Config, Environment, File};
use serde::Deserialize;

use crate::error::Result;

/// Prefix of environment variables read by [`ClientConfig::load`]
pub const ENV_PREFIX: &str = "HOSTDECK";

/// Configuration for the services gateway
#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// URL of the services collection resource
    pub base_url: String,
    /// URL or file path of the static options document
    pub options_source: String,
    /// Connection timeout in milliseconds
    pub connect_timeout_ms: u64,
    /// Read timeout in milliseconds
    pub read_timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:8080/api/services".to_string(),
            options_source: "data/options.json".to_string(),
            connect_timeout_ms: 5000,
            read_timeout_ms: 30000,
        }
    }
}

impl ClientConfig {
    /// Create a new config for the given services resource
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.to_string(),
            ..Default::default()
        }
    }

    /// Set the options document location
    pub fn with_options_source(mut self, source: &str) -> Self {
        self.options_source = source.to_string();
        self
    }

    /// Set timeouts
    pub fn with_timeouts(mut self, connect_ms: u64, read_ms: u64) -> Self {
        self.connect_timeout_ms = connect_ms;
        self.read_timeout_ms = read_ms;
        self
    }

    /// Load from an optional config file and the `HOSTDECK_*` environment.
    ///
    /// Environment variables override file values; unset keys keep their defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        Self::load_with_env(path, ENV_PREFIX)
    }

    fn load_with_env(path: Option<&Path>, env_prefix: &str) -> Result<Self> {
        let mut builder = Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix(env_prefix)
                .prefix_separator("_")
                .try_parsing(true),
        );

        let config = builder.build()?;
        Ok(config.try_deserialize()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_config_default() {
        let config = ClientConfig::default();
        assert_eq!(config.base_url, "http://127.0.0.1:8080/api/services");
        assert_eq!(config.options_source, "data/options.json");
        assert_eq!(config.connect_timeout_ms, 5000);
        assert_eq!(config.read_timeout_ms, 30000);
    }

    #[test]
    fn test_config_builder() {
        let config = ClientConfig::new("http://localhost:9000/services")
            .with_options_source("/etc/hostdeck/options.json")
            .with_timeouts(1000, 2000);

        assert_eq!(config.base_url, "http://localhost:9000/services");
        assert_eq!(config.options_source, "/etc/hostdeck/options.json");
        assert_eq!(config.connect_timeout_ms, 1000);
        assert_eq!(config.read_timeout_ms, 2000);
    }

    #[test]
    fn test_load_from_file_keeps_defaults() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "base_url = \"http://files:8080/services\"").unwrap();
        writeln!(file, "read_timeout_ms = 1500").unwrap();

        let config =
            ClientConfig::load_with_env(Some(file.path()), "HOSTDECK_TEST_FILE_ONLY").unwrap();
        assert_eq!(config.base_url, "http://files:8080/services");
        assert_eq!(config.read_timeout_ms, 1500);
        assert_eq!(config.connect_timeout_ms, 5000);
        assert_eq!(config.options_source, "data/options.json");
    }

    #[test]
    fn test_env_overrides_file() {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        writeln!(file, "base_url = \"http://files:8080/services\"").unwrap();

        // SAFETY: the variable name is unique to this test.
        unsafe {
            std::env::set_var("HOSTDECK_TEST_ENV_BASE_URL", "http://env:8080/services");
        }
        let config =
            ClientConfig::load_with_env(Some(file.path()), "HOSTDECK_TEST_ENV").unwrap();
        unsafe {
            std::env::remove_var("HOSTDECK_TEST_ENV_BASE_URL");
        }

        assert_eq!(config.base_url, "http://env:8080/services");
    }

    #[test]
    fn test_missing_file_is_error() {
        let result = ClientConfig::load_with_env(
            Some(Path::new("/nonexistent/hostdeck.toml")),
            "HOSTDECK_TEST_MISSING",
        );
        assert!(result.is_err());
    }
}
