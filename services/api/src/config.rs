//! Server configuration

use config::{Config, ConfigError, Environment};
use serde::Deserialize;

/// HTTP listener settings
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ServerConfig {
    /// Interface to bind (default: 0.0.0.0)
    pub host: String,
    /// Port to bind (default: 8080)
    pub port: u16,
}

impl ServerConfig {
    /// Load the configuration from `SERVER_HOST` and `SERVER_PORT`
    pub fn from_env() -> Result<Self, ConfigError> {
        Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", 8080)?
            .add_source(Environment::with_prefix("SERVER").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// `host:port` for binding
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_server_config_defaults() {
        unsafe {
            std::env::remove_var("SERVER_HOST");
            std::env::remove_var("SERVER_PORT");
        }

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.address(), "0.0.0.0:8080");
    }

    #[test]
    #[serial]
    fn test_server_config_from_env() {
        unsafe {
            std::env::set_var("SERVER_HOST", "127.0.0.1");
            std::env::set_var("SERVER_PORT", "9090");
        }

        let config = ServerConfig::from_env().unwrap();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 9090);

        unsafe {
            std::env::remove_var("SERVER_HOST");
            std::env::remove_var("SERVER_PORT");
        }
    }

    #[test]
    #[serial]
    fn test_server_config_rejects_bad_port() {
        unsafe {
            std::env::set_var("SERVER_PORT", "not-a-port");
        }

        assert!(ServerConfig::from_env().is_err());

        unsafe {
            std::env::remove_var("SERVER_PORT");
        }
    }
}
