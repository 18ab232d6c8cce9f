//! Configuration loading and management

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Environment variable overriding the listening port
pub const PORT_ENV: &str = "STOREFRONT_PORT";

/// Environment variable overriding the database file
pub const DB_ENV: &str = "STOREFRONT_DB";

/// Environment variable naming the YAML config file
pub const CONFIG_ENV: &str = "STOREFRONT_CONFIG";

/// Listener configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenConfig {
    /// Interface to bind (e.g., "0.0.0.0")
    pub host: String,

    /// TCP port
    pub port: u16,
}

impl Default for ListenConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 5000,
        }
    }
}

/// Record store configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path of the JSON document
    pub path: PathBuf,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from("db.json"),
        }
    }
}

/// Complete server configuration
///
/// Every key is optional; a missing key keeps its default.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub server: ListenConfig,

    pub store: StoreConfig,

    /// Directory served for unmatched GET requests, skipped when absent
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::default_config()
    }
}

impl ServerConfig {
    /// Load configuration from a YAML file
    pub fn from_yaml_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config file '{}'", path))?;
        Self::from_yaml_str(&content).with_context(|| format!("invalid config file '{}'", path))
    }

    /// Load configuration from a YAML string
    pub fn from_yaml_str(yaml: &str) -> Result<Self> {
        let config: Self = serde_yaml::from_str(yaml)?;
        Ok(config)
    }

    /// Default configuration: port 5000, `db.json`, static files from `public`
    pub fn default_config() -> Self {
        Self {
            server: ListenConfig::default(),
            store: StoreConfig::default(),
            static_dir: Some(PathBuf::from("public")),
        }
    }

    /// Load `path` (or `$STOREFRONT_CONFIG`, or the defaults) then apply env overrides
    pub fn load(path: Option<String>) -> Result<Self> {
        let config = match path.or_else(|| std::env::var(CONFIG_ENV).ok()) {
            Some(path) => Self::from_yaml_file(&path)?,
            None => Self::default_config(),
        };
        config.apply_env()
    }

    /// Apply `STOREFRONT_PORT` / `STOREFRONT_DB` overrides
    pub fn apply_env(self) -> Result<Self> {
        self.apply_overrides(std::env::var(PORT_ENV).ok(), std::env::var(DB_ENV).ok())
    }

    fn apply_overrides(mut self, port: Option<String>, db: Option<String>) -> Result<Self> {
        if let Some(port) = port {
            self.server.port = port
                .trim()
                .parse()
                .with_context(|| format!("{} must be a port number, got '{}'", PORT_ENV, port))?;
        }
        if let Some(db) = db {
            self.store.path = PathBuf::from(db);
        }
        Ok(self)
    }

    /// Socket address to bind
    pub fn listen_addr(&self) -> Result<SocketAddr> {
        let addr = format!("{}:{}", self.server.host, self.server.port);
        addr.parse()
            .with_context(|| format!("invalid listen address '{}'", addr))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default_config();

        assert_eq!(config.server.port, 5000);
        assert_eq!(config.store.path, PathBuf::from("db.json"));
        assert_eq!(config.static_dir, Some(PathBuf::from("public")));
        assert_eq!(
            config.listen_addr().unwrap(),
            "0.0.0.0:5000".parse::<SocketAddr>().unwrap()
        );
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let config = ServerConfig::from_yaml_str(
            r#"
server:
  port: 8080
"#,
        )
        .unwrap();

        assert_eq!(config.server.port, 8080);
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.store.path, PathBuf::from("db.json"));
    }

    #[test]
    fn test_full_yaml() {
        let config = ServerConfig::from_yaml_str(
            r#"
server:
  host: 127.0.0.1
  port: 3001
store:
  path: data/shop.json
static_dir: ~
"#,
        )
        .unwrap();

        assert_eq!(
            config.listen_addr().unwrap(),
            "127.0.0.1:3001".parse::<SocketAddr>().unwrap()
        );
        assert_eq!(config.store.path, PathBuf::from("data/shop.json"));
        assert_eq!(config.static_dir, None);
    }

    #[test]
    fn test_yaml_serialization() {
        let config = ServerConfig::default_config();
        let yaml = serde_yaml::to_string(&config).unwrap();

        let parsed = ServerConfig::from_yaml_str(&yaml).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_overrides() {
        let config = ServerConfig::default_config()
            .apply_overrides(Some(" 7000 ".into()), Some("/tmp/other.json".into()))
            .unwrap();
        assert_eq!(config.server.port, 7000);
        assert_eq!(config.store.path, PathBuf::from("/tmp/other.json"));

        let err = ServerConfig::default_config()
            .apply_overrides(Some("http".into()), None)
            .unwrap_err();
        assert!(err.to_string().contains(PORT_ENV));
    }

    #[test]
    fn test_invalid_host_is_reported() {
        let mut config = ServerConfig::default_config();
        config.server.host = "not a host".into();
        assert!(config.listen_addr().is_err());
    }
}
