use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::alerts::LOW_GRADE_THRESHOLD;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://grade-tracker.db?mode=rwc";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("invalid configuration in {path}: {source}")]
    Parse {
        path: String,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub database_url: String,
    pub low_grade_threshold: f64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.to_string(),
            low_grade_threshold: LOW_GRADE_THRESHOLD,
        }
    }
}

impl Config {
    /// Reads the TOML file when one is given and exists, then applies the
    /// `DATABASE_URL` override from the environment.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) if path.exists() => Self::from_file(path)?,
            _ => Self::default(),
        };

        if let Ok(url) = std::env::var("DATABASE_URL") {
            if !url.trim().is_empty() {
                config.database_url = url;
            }
        }

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let display = path.display().to_string();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: display.clone(),
            source,
        })?;
        toml::from_str(&raw).map_err(|source| ConfigError::Parse {
            path: display,
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "low_grade_threshold = 75.0").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.low_grade_threshold, 75.0);
        assert_eq!(config.database_url, DEFAULT_DATABASE_URL);
    }

    #[test]
    fn reads_every_field() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "database_url = \"sqlite://custom.db\"").unwrap();
        writeln!(file, "low_grade_threshold = 50").unwrap();

        let config = Config::from_file(file.path()).unwrap();
        assert_eq!(config.database_url, "sqlite://custom.db");
        assert_eq!(config.low_grade_threshold, 50.0);
    }

    #[test]
    fn malformed_file_is_reported() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "low_grade_threshold = \"high\"").unwrap();

        let err = Config::from_file(file.path()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse { .. }));
    }

    #[test]
    fn unreadable_file_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::from_file(&dir.path().join("missing.toml"));
        assert!(matches!(config, Err(ConfigError::Read { .. })));
    }
}
