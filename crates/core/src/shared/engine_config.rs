use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::constants::{DEFAULT_FLUSH_EVERY, DEFAULT_FLUSH_RETRIES, DEFAULT_SCORE_CUTOFF};
use crate::matching::domain::occurrence_resolver::CursorPolicy;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("cutoff must be between 0 and 100, got {0}")]
    Cutoff(u8),
    #[error("flush_every must be at least 1")]
    FlushEvery,
}

/// Tunables shared by every run mode.
///
/// Missing keys in a config file fall back to the defaults below, so a file
/// only needs to mention what it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub cutoff: u8,
    /// Only the first N keywords of the list are resolved when set.
    pub top_n: Option<usize>,
    pub cursor_policy: CursorPolicy,
    pub flush_every: usize,
    pub max_retries: usize,
    /// Worker threads; `None` means one per available core.
    pub workers: Option<usize>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            cutoff: DEFAULT_SCORE_CUTOFF,
            top_n: None,
            cursor_policy: CursorPolicy::Shared,
            flush_every: DEFAULT_FLUSH_EVERY,
            max_retries: DEFAULT_FLUSH_RETRIES,
            workers: None,
        }
    }
}

impl EngineConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let json = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config: Self = serde_json::from_str(&json).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cutoff > 100 {
            return Err(ConfigError::Cutoff(self.cutoff));
        }
        if self.flush_every == 0 {
            return Err(ConfigError::FlushEvery);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_cutoff_is_ninety() {
        let config = EngineConfig::default();
        assert_eq!(config.cutoff, 90);
        assert_eq!(config.flush_every, 10);
        assert_eq!(config.cursor_policy, CursorPolicy::Shared);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("config.json");
        fs::write(&path, r#"{"cutoff": 85, "cursor_policy": "per-keyword"}"#).unwrap();

        let config = EngineConfig::load(&path).unwrap();
        assert_eq!(config.cutoff, 85);
        assert_eq!(config.cursor_policy, CursorPolicy::PerKeyword);
        assert_eq!(config.flush_every, DEFAULT_FLUSH_EVERY);
    }

    #[test]
    fn test_cutoff_above_hundred_rejected() {
        let config = EngineConfig {
            cutoff: 101,
            ..EngineConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Cutoff(101))));
    }

    #[test]
    fn test_zero_flush_every_rejected() {
        let config = EngineConfig {
            flush_every: 0,
            ..EngineConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::FlushEvery)));
    }

    #[test]
    fn test_missing_file_is_read_error() {
        let result = EngineConfig::load(Path::new("/nonexistent/keyspot.json"));
        assert!(matches!(result, Err(ConfigError::Read { .. })));
    }
}
