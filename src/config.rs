//! Client Configuration
//!
//! Loaded from an optional JSON file; every field has a default.

use std::path::{Path, PathBuf};
use std::time::Duration;

use hms_backend::domain::Language;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Query cache behaviour
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    /// Retries after the first failed fetch
    pub retry: u32,
    /// First retry delay; doubles on each further retry
    pub retry_base_delay_ms: u64,
    pub stale_time_ms: u64,
    pub search_stale_time_ms: u64,
    /// Shorter search terms do not query
    pub search_min_chars: usize,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            retry: 2,
            retry_base_delay_ms: 1000,
            stale_time_ms: 5 * 60 * 1000,
            search_stale_time_ms: 60 * 1000,
            search_min_chars: 3,
        }
    }
}

impl QueryConfig {
    pub fn stale_time(&self) -> Duration {
        Duration::from_millis(self.stale_time_ms)
    }

    pub fn search_stale_time(&self) -> Duration {
        Duration::from_millis(self.search_stale_time_ms)
    }

    /// Delay before retry number `attempt` (1-based)
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        let factor = 1u64 << attempt.saturating_sub(1).min(16);
        Duration::from_millis(self.retry_base_delay_ms.saturating_mul(factor))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub query: QueryConfig,
    /// Language of user-facing messages
    pub language: Language,
    pub log_dir: Option<PathBuf>,
    /// Device-local settings database; in-memory when unset
    pub db_path: Option<PathBuf>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            query: QueryConfig::default(),
            language: Language::NbNo,
            log_dir: None,
            db_path: None,
        }
    }
}

impl ClientConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    /// Load from `path`; a missing file yields the defaults
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        match std::fs::read_to_string(path) {
            Ok(json) => Self::from_json(&json),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!("no config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            Err(source) => Err(ConfigError::Read {
                path: path.to_path_buf(),
                source,
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.query.retry, 2);
        assert_eq!(config.query.stale_time(), Duration::from_secs(300));
        assert_eq!(config.query.search_stale_time(), Duration::from_secs(60));
        assert_eq!(config.language, Language::NbNo);
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let config =
            ClientConfig::from_json(r#"{"language": "en-US", "query": {"retry": 0}}"#).unwrap();
        assert_eq!(config.language, Language::EnUs);
        assert_eq!(config.query.retry, 0);
        assert_eq!(config.query.search_min_chars, 3);
    }

    #[test]
    fn test_load_missing_and_present_files() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("hms.json");
        assert_eq!(ClientConfig::load(&path).unwrap(), ClientConfig::default());

        std::fs::write(&path, r#"{"query": {"retry_base_delay_ms": 10}}"#).unwrap();
        let config = ClientConfig::load(&path).unwrap();
        assert_eq!(config.query.retry_delay(1), Duration::from_millis(10));
        assert_eq!(config.query.retry_delay(3), Duration::from_millis(40));

        std::fs::write(&path, "{not json").unwrap();
        assert!(matches!(ClientConfig::load(&path), Err(ConfigError::Parse(_))));
    }
}
