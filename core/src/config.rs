//! User configuration for default exposure settings.
//!
//! Stored in JSON format at `~/.wsl-expose/config.json`. The file only holds
//! defaults for the command line; no run state is ever written to it.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::{
    render_rule_name, ExposeRequest, DEFAULT_ACCESS_PATH, DEFAULT_PORT,
    DEFAULT_RULE_NAME_TEMPLATE,
};
use crate::error::{Error, Result};

/// Configuration data stored in JSON format.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Config {
    /// Host-visible port to expose.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Port inside the subsystem; `None` means the same as `port`.
    #[serde(default)]
    pub connect_port: Option<u16>,

    /// Firewall display name template; `{port}` is substituted.
    #[serde(default = "default_rule_name_template")]
    pub rule_name_template: String,

    /// WSL distribution to query; `None` means the default distribution.
    #[serde(default)]
    pub distro: Option<String>,

    /// How long to wait for the subsystem to report its addresses.
    #[serde(default = "default_query_timeout_secs")]
    pub query_timeout_secs: u64,

    /// Path appended to the reported access URL.
    #[serde(default = "default_access_path")]
    pub access_path: String,
}

fn default_port() -> u16 {
    DEFAULT_PORT
}

fn default_rule_name_template() -> String {
    DEFAULT_RULE_NAME_TEMPLATE.to_string()
}

fn default_query_timeout_secs() -> u64 {
    10
}

fn default_access_path() -> String {
    DEFAULT_ACCESS_PATH.to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: default_port(),
            connect_port: None,
            rule_name_template: default_rule_name_template(),
            distro: None,
            query_timeout_secs: default_query_timeout_secs(),
            access_path: default_access_path(),
        }
    }
}

impl Config {
    /// Firewall display name for `port`.
    pub fn rule_name(&self, port: u16) -> String {
        render_rule_name(&self.rule_name_template, port)
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs.max(1))
    }

    /// Build a request, letting explicit values override the file.
    pub fn request(
        &self,
        port: Option<u16>,
        connect_port: Option<u16>,
        rule_name: Option<String>,
    ) -> ExposeRequest {
        let port = port.unwrap_or(self.port);
        let connect_port = connect_port.or(self.connect_port).unwrap_or(port);
        let rule_name = rule_name.unwrap_or_else(|| self.rule_name(port));

        ExposeRequest::new(port)
            .with_connect_port(connect_port)
            .with_rule_name(rule_name)
            .with_access_path(self.access_path.clone())
    }
}

/// Configuration store for reading and writing the config file.
pub struct ConfigStore {
    /// Path to the configuration file.
    config_path: PathBuf,
}

impl ConfigStore {
    /// Create a new config store with the default path.
    ///
    /// Default path: `~/.wsl-expose/config.json`
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::Config("Could not determine home directory".to_string()))?;

        let config_dir = home.join(".wsl-expose");
        let config_path = config_dir.join("config.json");

        Ok(Self { config_path })
    }

    /// Create a config store with a custom path.
    pub fn with_path(config_path: PathBuf) -> Self {
        Self { config_path }
    }

    /// Path to the configuration file.
    pub fn path(&self) -> &Path {
        &self.config_path
    }

    pub fn exists(&self) -> bool {
        self.config_path.exists()
    }

    /// Load configuration from disk.
    ///
    /// Returns default config if the file doesn't exist.
    pub async fn load(&self) -> Result<Config> {
        if !self.config_path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(&self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to read config: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {}", e)))
    }

    /// Save configuration to disk.
    ///
    /// Creates the config directory if it doesn't exist.
    pub async fn save(&self, config: &Config) -> Result<()> {
        if let Some(config_dir) = self.config_path.parent() {
            if !config_dir.as_os_str().is_empty() && !config_dir.exists() {
                fs::create_dir_all(config_dir).await.map_err(|e| {
                    Error::Config(format!("Failed to create config directory: {}", e))
                })?;
            }
        }

        let content = serde_json::to_string_pretty(config)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {}", e)))?;

        // Write atomically by writing to temp file then renaming
        let temp_path = self.config_path.with_extension("json.tmp");

        let mut file = fs::File::create(&temp_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to create temp config file: {}", e)))?;

        file.write_all(content.as_bytes())
            .await
            .map_err(|e| Error::Config(format!("Failed to write config: {}", e)))?;

        file.sync_all()
            .await
            .map_err(|e| Error::Config(format!("Failed to sync config: {}", e)))?;

        fs::rename(&temp_path, &self.config_path)
            .await
            .map_err(|e| Error::Config(format!("Failed to rename config file: {}", e)))?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn test_store() -> (ConfigStore, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");
        (ConfigStore::with_path(path), dir)
    }

    #[tokio::test]
    async fn test_load_nonexistent() {
        let (store, _dir) = test_store();
        let config = store.load().await.unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.port, 8000);
        assert!(!store.exists());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let (store, _dir) = test_store();

        let config = Config {
            port: 9000,
            connect_port: Some(9001),
            rule_name_template: "dev api {port}".to_string(),
            distro: Some("Ubuntu".to_string()),
            query_timeout_secs: 3,
            access_path: "/healthz".to_string(),
        };

        store.save(&config).await.unwrap();
        assert!(store.exists());

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, config);
    }

    #[tokio::test]
    async fn test_partial_file_uses_defaults() {
        let (store, _dir) = test_store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), r#"{ "port": 8080, "distro": "Debian" }"#).unwrap();

        let config = store.load().await.unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.distro.as_deref(), Some("Debian"));
        assert_eq!(config.rule_name_template, "WSL FastAPI {port}");
        assert_eq!(config.query_timeout_secs, 10);
    }

    #[tokio::test]
    async fn test_malformed_file_is_config_error() {
        let (store, _dir) = test_store();
        std::fs::create_dir_all(store.path().parent().unwrap()).unwrap();
        std::fs::write(store.path(), "{ port: ").unwrap();

        assert!(matches!(store.load().await, Err(Error::Config(_))));
    }

    #[test]
    fn test_request_precedence() {
        let config = Config {
            port: 9000,
            connect_port: Some(9100),
            ..Config::default()
        };

        let req = config.request(None, None, None);
        assert_eq!(req.listen_port, 9000);
        assert_eq!(req.connect_port, 9100);
        assert_eq!(req.rule_name, "WSL FastAPI 9000");

        let req = config.request(Some(8000), Some(8001), Some("mine".to_string()));
        assert_eq!(req.listen_port, 8000);
        assert_eq!(req.connect_port, 8001);
        assert_eq!(req.rule_name, "mine");

        let req = Config::default().request(Some(7000), None, None);
        assert_eq!(req.connect_port, 7000);
        assert_eq!(req.rule_name, "WSL FastAPI 7000");
    }

    #[test]
    fn test_query_timeout_floor() {
        let config = Config {
            query_timeout_secs: 0,
            ..Config::default()
        };
        assert_eq!(config.query_timeout(), Duration::from_secs(1));
    }
}
