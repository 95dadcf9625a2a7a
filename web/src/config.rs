//! Server configuration.
//!
//! Loaded from environment variables (a `.env` file is honoured by the binary):
//!
//! | variable | default | meaning |
//! |---|---|---|
//! | `HOST` | `0.0.0.0` | interface to bind |
//! | `PORT` | `8080` | port to bind |
//! | `STATIC_DIR` | `dist` | directory served for non-API paths |
//! | `API_BASE` | `/api/todo` | collection address |

use std::env;
use std::path::PathBuf;
use thiserror::Error;

/// Default collection address.
pub const DEFAULT_API_BASE: &str = "/api/todo";

/// Errors from loading configuration.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigError {
    /// `PORT` is not a valid port number
    #[error("Invalid PORT value: {0}")]
    InvalidPort(String),
    /// `API_BASE` is not an absolute path
    #[error("Invalid API_BASE value (must start with '/'): {0}")]
    InvalidApiBase(String),
}

/// Server configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Host to bind to
    pub host: String,
    /// Port to bind to
    pub port: u16,
    /// Directory with the front-end assets
    pub static_dir: PathBuf,
    /// Collection address, without a trailing slash
    pub api_base: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            static_dir: PathBuf::from("dist"),
            api_base: DEFAULT_API_BASE.to_string(),
        }
    }
}

impl ServerConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration through `lookup`, falling back to defaults for unset keys.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] if a value is invalid.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let port = match lookup("PORT") {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .map_err(|_| ConfigError::InvalidPort(raw))?,
            None => defaults.port,
        };

        let api_base = match lookup("API_BASE") {
            Some(raw) if raw.starts_with('/') && !raw.trim_end_matches('/').is_empty() => {
                raw.trim_end_matches('/').to_string()
            }
            Some(raw) => return Err(ConfigError::InvalidApiBase(raw)),
            None => defaults.api_base,
        };

        Ok(Self {
            host: lookup("HOST").unwrap_or(defaults.host),
            port,
            static_dir: lookup("STATIC_DIR").map_or(defaults.static_dir, PathBuf::from),
            api_base,
        })
    }

    /// `host:port` to bind.
    #[must_use]
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key: &str| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = ServerConfig::from_lookup(lookup(&[])).unwrap();

        assert_eq!(config, ServerConfig::default());
        assert_eq!(config.bind_address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::from_lookup(lookup(&[
            ("HOST", "127.0.0.1"),
            ("PORT", "3000"),
            ("STATIC_DIR", "/srv/todo"),
            ("API_BASE", "/todos/"),
        ]))
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:3000");
        assert_eq!(config.static_dir, PathBuf::from("/srv/todo"));
        assert_eq!(config.api_base, "/todos");
    }

    #[test]
    fn test_invalid_values_are_errors() {
        assert_eq!(
            ServerConfig::from_lookup(lookup(&[("PORT", "eighty")])),
            Err(ConfigError::InvalidPort("eighty".to_string()))
        );
        assert_eq!(
            ServerConfig::from_lookup(lookup(&[("API_BASE", "api")])),
            Err(ConfigError::InvalidApiBase("api".to_string()))
        );
        assert_eq!(
            ServerConfig::from_lookup(lookup(&[("API_BASE", "/")])),
            Err(ConfigError::InvalidApiBase("/".to_string()))
        );
    }
}
