//! Server configuration
//!
//! Settings come from an optional JSON file (`--config` or the
//! `BLENDER_MCP_CONFIG` environment variable). Command-line flags override the
//! file. Every field has a default, so an empty file or no file at all is a
//! valid configuration.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use blender_mcp_core::{DetachedHost, MemoryScene, SceneHost};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Environment variable naming the configuration file
pub const CONFIG_ENV: &str = "BLENDER_MCP_CONFIG";

/// Errors raised while loading configuration
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The configuration file could not be read
    #[error("Failed to read config file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON for [`ServerConfig`]
    #[error("Invalid config file '{}': {source}", path.display())]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },

    /// Unknown backend name
    #[error("Unknown backend '{0}'. Valid options: memory, detached")]
    UnknownBackend(String),
}

/// Which scene host the server talks to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Backend {
    /// Headless in-memory scene
    #[default]
    Memory,
    /// No host reachable; every tool reports the host as unavailable
    Detached,
}

impl Backend {
    /// Build a host of this kind
    pub fn create_host(self) -> Box<dyn SceneHost> {
        match self {
            Self::Memory => Box::new(MemoryScene::new()),
            Self::Detached => Box::new(DetachedHost),
        }
    }
}

impl FromStr for Backend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "memory" => Ok(Self::Memory),
            "detached" => Ok(Self::Detached),
            _ => Err(ConfigError::UnknownBackend(s.to_string())),
        }
    }
}

impl std::fmt::Display for Backend {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Memory => write!(f, "memory"),
            Self::Detached => write!(f, "detached"),
        }
    }
}

/// Server settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Scene host backend
    pub backend: Backend,
    /// Document opened before serving
    pub document: Option<PathBuf>,
    /// Log filter directive used when `RUST_LOG` is unset
    pub log_filter: String,
    /// How long shutdown waits for the transport loop, in milliseconds
    pub shutdown_grace_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            backend: Backend::Memory,
            document: None,
            log_filter: "info".to_string(),
            shutdown_grace_ms: 2000,
        }
    }
}

impl ServerConfig {
    /// Load settings from `path`
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        serde_json::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load from an explicit path, else from [`CONFIG_ENV`], else defaults
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }
        match std::env::var_os(CONFIG_ENV) {
            Some(path) if !path.is_empty() => Self::from_file(Path::new(&path)),
            _ => Ok(Self::default()),
        }
    }

    pub fn shutdown_grace(&self) -> Duration {
        Duration::from_millis(self.shutdown_grace_ms)
    }
}
