//! Client configuration loaded from a TOML file.
//!
//! ```toml
//! default_graph = "movies"
//!
//! [connection]
//! url = "redis://127.0.0.1:6379/"
//! connect_timeout_ms = 2000
//! read_timeout_ms = 5000
//! ```
#![forbid(unsafe_code)]

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// URL used when nothing else is configured.
pub const DEFAULT_URL: &str = "redis://127.0.0.1:6379/";

/// Resolved client settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Redis connection URL.
    pub url: String,
    /// Graph used when a command does not name one.
    pub default_graph: Option<String>,
    /// Connection establishment timeout.
    pub connect_timeout_ms: Option<u64>,
    /// Per-reply read timeout.
    pub read_timeout_ms: Option<u64>,
    path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_owned(),
            default_graph: None,
            connect_timeout_ms: None,
            read_timeout_ms: None,
            path: None,
        }
    }
}

impl ClientConfig {
    /// Config pointing at `url` with no timeouts.
    pub fn with_url(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Loads `explicit`, or the default config path. A missing file yields defaults.
    pub fn load(explicit: Option<PathBuf>) -> Result<Self, ConfigError> {
        let path = explicit.or_else(default_config_path);
        let raw = match path.as_ref() {
            Some(config_path) if config_path.exists() => read_file(config_path)?,
            _ => RawConfig::default(),
        };
        let mut config = Self::from_raw(raw);
        config.path = path;
        Ok(config)
    }

    /// Path the config was loaded from, or would be persisted to.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Writes the config as TOML, creating parent directories.
    pub fn persist(&self) -> Result<PathBuf, ConfigError> {
        let target = self
            .path
            .clone()
            .or_else(default_config_path)
            .ok_or(ConfigError::NoConfigPath)?;
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|source| ConfigError::CreateDir {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        let serialized = toml::to_string_pretty(&self.to_raw())
            .map_err(|source| ConfigError::Serialize { source })?;
        fs::write(&target, serialized).map_err(|source| ConfigError::Write {
            path: target.clone(),
            source,
        })?;
        Ok(target)
    }

    /// Connect timeout as a duration.
    pub fn connect_timeout(&self) -> Option<Duration> {
        self.connect_timeout_ms.map(Duration::from_millis)
    }

    /// Read timeout as a duration.
    pub fn read_timeout(&self) -> Option<Duration> {
        self.read_timeout_ms.map(Duration::from_millis)
    }

    fn from_raw(raw: RawConfig) -> Self {
        Self {
            url: raw.connection.url.unwrap_or_else(|| DEFAULT_URL.to_owned()),
            default_graph: raw.default_graph,
            connect_timeout_ms: raw.connection.connect_timeout_ms,
            read_timeout_ms: raw.connection.read_timeout_ms,
            path: None,
        }
    }

    fn to_raw(&self) -> RawConfig {
        RawConfig {
            default_graph: self.default_graph.clone(),
            connection: ConnectionSection {
                url: Some(self.url.clone()),
                connect_timeout_ms: self.connect_timeout_ms,
                read_timeout_ms: self.read_timeout_ms,
            },
        }
    }
}

fn read_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&contents).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct RawConfig {
    #[serde(default)]
    default_graph: Option<String>,
    #[serde(default)]
    connection: ConnectionSection,
}

#[derive(Debug, Default, Deserialize, Serialize)]
struct ConnectionSection {
    url: Option<String>,
    connect_timeout_ms: Option<u64>,
    read_timeout_ms: Option<u64>,
}

/// Failures loading or writing the config file.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file exists but could not be read.
    #[error("failed to read config {path}: {source}")]
    Read {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// The file is not valid TOML for this schema.
    #[error("failed to parse config {path}: {source}")]
    Parse {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: toml::de::Error,
    },
    /// Serialization failed.
    #[error("failed to serialize config: {source}")]
    Serialize {
        /// Underlying error.
        source: toml::ser::Error,
    },
    /// Writing the file failed.
    #[error("failed to write config {path}: {source}")]
    Write {
        /// File path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// Creating the config directory failed.
    #[error("failed to create config directory {path}: {source}")]
    CreateDir {
        /// Directory path.
        path: PathBuf,
        /// Underlying error.
        source: std::io::Error,
    },
    /// Neither an explicit path nor a platform config directory is available.
    #[error("no config directory found; pass --config or set REDGRAPH_CONFIG")]
    NoConfigPath,
}

/// Platform default location of the config file.
pub fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|base| base.join("redgraph").join("config.toml"))
}
