use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Context;
use catalog_engine::{ApiSettings, EngineSettings, DEFAULT_BASE_URL};
use catalog_logging::{catalog_info, LevelFilter};
use serde::{Deserialize, Serialize};

use crate::categories::CategoryTable;
use crate::logging::LogDestination;

pub const DEFAULT_CONFIG_FILE: &str = "catalog.ron";

/// Settings read from `catalog.ron`. Every field is optional in the file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub base_url: String,
    pub connect_timeout_secs: u64,
    pub request_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub poll_timeout_secs: u64,
    pub max_response_bytes: u64,
    pub log_level: String,
    pub log_destination: LogDestination,
    pub categories: Option<BTreeMap<String, Vec<String>>>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            connect_timeout_secs: 10,
            request_timeout_secs: 30,
            poll_interval_ms: 2000,
            poll_timeout_secs: 15,
            max_response_bytes: 16 * 1024 * 1024,
            log_level: "warn".to_string(),
            log_destination: LogDestination::default(),
            categories: None,
        }
    }
}

impl AppConfig {
    /// Reads `path`; a missing file yields the defaults.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => {
                return Err(err).with_context(|| format!("reading config {}", path.display()))
            }
        };
        let config: AppConfig = ron::from_str(&content)
            .with_context(|| format!("parsing config {}", path.display()))?;
        catalog_info!("Loaded configuration from {}", path.display());
        Ok(config)
    }

    pub fn level(&self) -> LevelFilter {
        catalog_logging::parse_level(&self.log_level).unwrap_or(LevelFilter::Warn)
    }

    pub fn engine_settings(&self) -> EngineSettings {
        EngineSettings {
            api: ApiSettings {
                base_url: self.base_url.clone(),
                connect_timeout: Duration::from_secs(self.connect_timeout_secs),
                request_timeout: Duration::from_secs(self.request_timeout_secs),
                max_bytes: self.max_response_bytes,
            },
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            poll_timeout: Duration::from_secs(self.poll_timeout_secs),
        }
    }

    /// Upper bound for waiting on a single request round trip.
    pub fn request_deadline(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs + self.request_timeout_secs + 1)
    }

    pub fn category_table(&self) -> CategoryTable {
        match &self.categories {
            Some(map) => CategoryTable::from_map(map.clone()),
            None => CategoryTable::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;

    #[test]
    fn missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = AppConfig::load(&dir.path().join("absent.ron")).unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.base_url, "http://localhost:8000/api/v1");
        assert_eq!(config.level(), LevelFilter::Warn);
    }

    #[test]
    fn partial_file_overrides_only_given_fields() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"(
                base_url: "http://catalog.test/api/v1",
                poll_interval_ms: 500,
                log_level: "debug",
                log_destination: Both,
                categories: Some({{"birds": ["owl", "eagle"]}}),
            )"#
        )
        .unwrap();

        let config = AppConfig::load(file.path()).unwrap();
        assert_eq!(config.base_url, "http://catalog.test/api/v1");
        assert_eq!(config.poll_interval_ms, 500);
        assert_eq!(config.request_timeout_secs, 30);
        assert_eq!(config.level(), LevelFilter::Debug);
        assert_eq!(config.log_destination, LogDestination::Both);
        assert_eq!(
            config.category_table().subcategories("birds"),
            ["owl".to_string(), "eagle".to_string()]
        );

        let engine = config.engine_settings();
        assert_eq!(engine.poll_interval, Duration::from_millis(500));
        assert_eq!(engine.api.base_url, "http://catalog.test/api/v1");
    }

    #[test]
    fn unparsable_file_is_an_error() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "(base_url: 42").unwrap();
        let err = AppConfig::load(file.path()).unwrap_err();
        assert!(err.to_string().contains("parsing config"));
    }

    #[test]
    fn unknown_level_falls_back_to_warn() {
        let config = AppConfig {
            log_level: "chatty".to_string(),
            ..AppConfig::default()
        };
        assert_eq!(config.level(), LevelFilter::Warn);
    }
}
