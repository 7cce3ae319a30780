//! Server configuration.
//!
//! Settings are layered, lowest precedence first: built-in defaults, a YAML
//! file (`taskboard.yaml`), environment variables, then command-line flags
//! applied by the binary.

use crate::error::{Error, Result};
use crate::paths;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Config file name looked up in the working directory.
pub const CONFIG_FILE_NAME: &str = "taskboard.yaml";

/// Environment variable overriding the bind address.
pub const ENV_HOST: &str = "HOST";
/// Environment variable overriding the port.
pub const ENV_PORT: &str = "PORT";
/// Environment variable overriding the database path.
pub const ENV_DB_PATH: &str = "DB_PATH";
/// Environment variable overriding the static asset directory.
pub const ENV_STATIC_DIR: &str = "STATIC_DIR";
/// Environment variable overriding the log level.
pub const ENV_LOG_LEVEL: &str = "TASKBOARD_LOG";

/// HTTP server settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ServerConfig {
    /// Address to bind.
    pub host: String,

    /// Port to bind.
    pub port: u16,

    /// `SQLite` database file.
    pub db_path: PathBuf,

    /// Directory of browser assets served for non-API paths.
    /// None means only the API is served.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub static_dir: Option<PathBuf>,

    /// Default log filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            db_path: paths::default_db_path(),
            static_dir: None,
            log_level: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Load config from a YAML file, returning None if it does not exist.
    ///
    /// Relative paths inside the file are resolved against the file's directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load_from(config_path: &Path) -> Result<Option<Self>> {
        if !config_path.exists() {
            return Ok(None);
        }

        let content = std::fs::read_to_string(config_path)?;
        let mut config: Self = serde_yaml::from_str(&content)?;

        let base = config_path.parent().unwrap_or_else(|| Path::new("."));
        config.db_path = paths::resolve(base, &config.db_path);
        config.static_dir = config.static_dir.map(|dir| paths::resolve(base, &dir));

        Ok(Some(config))
    }

    /// Resolve config from an optional file plus the process environment.
    ///
    /// With no explicit path, `taskboard.yaml` in the working directory is
    /// used when present. An explicit path that does not exist is an error.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be parsed or an environment value is invalid.
    pub fn resolve(config_path: Option<&Path>) -> Result<Self> {
        let config = match config_path {
            Some(path) => Self::load_from(path)?.ok_or_else(|| {
                Error::Config(format!("config file not found: {}", path.display()))
            })?,
            None => Self::load_from(Path::new(CONFIG_FILE_NAME))?.unwrap_or_default(),
        };
        config.with_env(|key| std::env::var(key).ok())
    }

    /// Apply overrides from an environment lookup.
    ///
    /// Empty values are ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if `PORT` is not a valid port number.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        if let Some(host) = get(ENV_HOST) {
            self.host = host;
        }
        if let Some(port) = get(ENV_PORT) {
            self.port = port
                .trim()
                .parse()
                .map_err(|_| Error::Config(format!("invalid {ENV_PORT} value: '{port}'")))?;
        }
        if let Some(db_path) = get(ENV_DB_PATH) {
            self.db_path = PathBuf::from(db_path);
        }
        if let Some(static_dir) = get(ENV_STATIC_DIR) {
            self.static_dir = Some(PathBuf::from(static_dir));
        }
        if let Some(level) = get(ENV_LOG_LEVEL) {
            self.log_level = level;
        }

        Ok(self)
    }

    /// The `host:port` string to bind.
    #[must_use]
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
