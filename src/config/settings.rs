//! Application settings loaded from `config.toml` and the environment.
//!
//! The file is optional. Environment variables (usually provided through a
//! `.env` file loaded by `dotenvy`) take precedence over the file, and built-in
//! defaults fill whatever neither of them sets.

use crate::errors::{Error, Result};
use serde::Deserialize;
use std::path::Path;

/// Database URL used when neither the config file nor `DATABASE_URL` sets one.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://data/ricemill.sqlite?mode=rwc";

/// Listen address used when neither the config file nor `BIND_ADDRESS` sets one.
pub const DEFAULT_BIND_ADDRESS: &str = "127.0.0.1:5000";

/// Top-level structure of `config.toml`
#[derive(Debug, Default, Deserialize)]
pub struct FileConfig {
    /// `[database]` table
    #[serde(default)]
    pub database: DatabaseSection,
    /// `[server]` table
    #[serde(default)]
    pub server: ServerSection,
}

/// `[database]` table of `config.toml`
#[derive(Debug, Default, Deserialize)]
pub struct DatabaseSection {
    /// SeaORM connection URL
    pub url: Option<String>,
}

/// `[server]` table of `config.toml`
#[derive(Debug, Default, Deserialize)]
pub struct ServerSection {
    /// `host:port` the HTTP listener binds to
    pub bind_address: Option<String>,
}

/// Fully resolved application configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// SeaORM connection URL
    pub database_url: String,
    /// `host:port` the HTTP listener binds to
    pub bind_address: String,
}

impl AppConfig {
    /// Resolves the final configuration from a parsed file and an environment lookup.
    ///
    /// `env` is injected so tests don't depend on the process environment.
    pub fn resolve<F>(file: FileConfig, env: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let database_url = env("DATABASE_URL")
            .or(file.database.url)
            .unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());
        let bind_address = env("BIND_ADDRESS")
            .or(file.server.bind_address)
            .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

        Self {
            database_url,
            bind_address,
        }
    }
}

/// Parses a config file. A missing file yields an empty [`FileConfig`].
///
/// # Errors
/// Returns `Error::Config` if the file exists but cannot be read or is not valid TOML.
pub fn load_file_config<P: AsRef<Path>>(path: P) -> Result<FileConfig> {
    let path = path.as_ref();
    if !path.exists() {
        tracing::debug!("No config file at {:?}, using defaults", path);
        return Ok(FileConfig::default());
    }

    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path.display()),
    })
}

/// Loads the application configuration from `./config.toml` and the process environment.
///
/// # Errors
/// Returns `Error::Config` if `config.toml` exists but is malformed.
pub fn load_app_configuration() -> Result<AppConfig> {
    let file = load_file_config("config.toml")?;
    let config = AppConfig::resolve(file, |key| std::env::var(key).ok());
    tracing::info!(
        "Configuration resolved: database_url={}, bind_address={}",
        config.database_url,
        config.bind_address
    );
    Ok(config)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_parse_config_file() {
        let toml_str = r#"
            [database]
            url = "sqlite://mill.sqlite?mode=rwc"

            [server]
            bind_address = "0.0.0.0:8080"
        "#;

        let file: FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(file.database.url.as_deref(), Some("sqlite://mill.sqlite?mode=rwc"));
        assert_eq!(file.server.bind_address.as_deref(), Some("0.0.0.0:8080"));
    }

    #[test]
    fn test_defaults_when_nothing_is_set() {
        let config = AppConfig::resolve(FileConfig::default(), |_| None);
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
    }

    #[test]
    fn test_environment_overrides_file() {
        let file: FileConfig = toml::from_str(
            r#"
            [database]
            url = "sqlite://from_file.sqlite"
            [server]
            bind_address = "127.0.0.1:9000"
        "#,
        )
        .unwrap();

        let config = AppConfig::resolve(file, |key| {
            (key == "DATABASE_URL").then(|| "sqlite://from_env.sqlite".to_string())
        });
        assert_eq!(config.database_url, "sqlite://from_env.sqlite");
        assert_eq!(config.bind_address, "127.0.0.1:9000");
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let file = load_file_config("definitely/not/here/config.toml").unwrap();
        assert!(file.database.url.is_none());
        assert!(file.server.bind_address.is_none());
    }

    #[test]
    fn test_malformed_toml_is_config_error() {
        let result: std::result::Result<FileConfig, _> = toml::from_str("[database\nurl = 1");
        assert!(result.is_err());
    }
}
