use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

pub const DEFAULT_BASE_URL: &str = "http://127.0.0.1:8080/";
pub const DEFAULT_ENDPOINT: &str = "xml/za";
pub const DEFAULT_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_ELEMENT: &str = "prompt";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_BIND: &str = "0.0.0.0";
pub const DEFAULT_STATIC_DIR: &str = "static";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("malformed config {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct WorldClockConfig {
    pub poller: Option<PollerConfig>,
    pub server: Option<ServerConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct PollerConfig {
    pub base_url: Option<String>,
    pub path: Option<String>,
    pub interval_ms: Option<u64>,
    pub element: Option<String>,
    pub output_file: Option<String>,
    pub timeout_ms: Option<u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ServerConfig {
    pub port: Option<u16>,
    pub bind: Option<String>,
    pub static_dir: Option<String>,
}

impl WorldClockConfig {
    /// Load a JSON config file. A missing file yields the defaults;
    /// a present but unreadable or malformed file is an error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::debug!("No config at {:?}, using defaults", path);
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.display().to_string(),
                    source,
                })
            }
        };
        let config = serde_json::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.display().to_string(),
            source,
        })?;
        tracing::info!("Config loaded from {:?}", path);
        Ok(config)
    }

    pub fn poller(&self) -> PollerConfig {
        self.poller.clone().unwrap_or_default()
    }

    pub fn server(&self) -> ServerConfig {
        self.server.clone().unwrap_or_default()
    }
}
