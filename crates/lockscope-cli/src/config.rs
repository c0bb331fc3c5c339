//! RON configuration.
//!
//! Looked up at `~/.config/lockscope/config.ron` (platform config dir) unless
//! `--config` names a file. Every field has a default, so a missing default
//! file or a partial file is fine:
//!
//! ```ron
//! (
//!     server: (base_url: "http://localhost:8000"),
//!     reconnect: (max_retries: 5, delay_secs: 2),
//!     canvas: (width: 1024.0, height: 768.0),
//! )
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use lockscope_client::ReconnectPolicy;
use lockscope_client::constants::{DEFAULT_BASE_URL, DEFAULT_MAX_RETRIES, DEFAULT_RETRY_DELAY};
use lockscope_view::Size;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Ron {
        path: PathBuf,
        #[source]
        source: ron::error::SpannedError,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub reconnect: ReconnectConfig,
    pub canvas: CanvasConfig,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Backend base URL; the stream URL is derived from it.
    pub base_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReconnectConfig {
    pub max_retries: u32,
    pub delay_secs: u64,
}

impl Default for ReconnectConfig {
    fn default() -> Self {
        Self {
            max_retries: DEFAULT_MAX_RETRIES,
            delay_secs: DEFAULT_RETRY_DELAY.as_secs(),
        }
    }
}

impl ReconnectConfig {
    pub fn policy(&self) -> ReconnectPolicy {
        ReconnectPolicy {
            max_retries: self.max_retries,
            delay: Duration::from_secs(self.delay_secs),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CanvasConfig {
    pub width: f64,
    pub height: f64,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 600.0,
        }
    }
}

impl CanvasConfig {
    pub fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

/// Default config file location.
pub fn default_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("lockscope").join("config.ron"))
}

impl Config {
    /// Load from `explicit` (which must exist) or from the default location
    /// (which may not).
    pub fn load(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = explicit {
            return Self::read(path);
        }
        match default_path() {
            Some(path) if path.exists() => Self::read(&path),
            Some(path) => {
                debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            None => Ok(Self::default()),
        }
    }

    fn read(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = ron::from_str(&text).map_err(|source| ConfigError::Ron {
            path: path.to_path_buf(),
            source,
        })?;
        info!(path = %path.display(), "loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn write_config(text: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(text.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.server.base_url, "http://localhost:8000");
        assert_eq!(config.reconnect.policy(), ReconnectPolicy::default());
        assert_eq!(config.canvas.size(), Size::new(800.0, 600.0));
    }

    #[test]
    fn test_full_file() {
        let file = write_config(
            r#"(
                server: (base_url: "https://lab.example.com"),
                reconnect: (max_retries: 5, delay_secs: 1),
                canvas: (width: 1024.0, height: 768.0),
            )"#,
        );
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.server.base_url, "https://lab.example.com");
        assert_eq!(config.reconnect.policy().max_retries, 5);
        assert_eq!(config.reconnect.policy().delay, Duration::from_secs(1));
        assert_eq!(config.canvas.width, 1024.0);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let file = write_config("(reconnect: (max_retries: 0))");
        let config = Config::load(Some(file.path())).unwrap();
        assert_eq!(config.reconnect.max_retries, 0);
        assert_eq!(config.reconnect.delay_secs, 3);
        assert_eq!(config.server, ServerConfig::default());
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.ron"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }

    #[test]
    fn test_malformed_file_is_error() {
        let file = write_config("(server: (base_url: 42))");
        let err = Config::load(Some(file.path())).unwrap_err();
        assert!(matches!(err, ConfigError::Ron { .. }));
        assert!(err.to_string().starts_with("invalid config"));
    }
}
