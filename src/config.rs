use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::render::{RenderOptions, DEFAULT_DATE_FORMAT, DEFAULT_SKELETON_ROWS};
use crate::source::fixture::{DEFAULT_DELAY, DEFAULT_FAILING_SUBJECT};
use crate::source::{FixtureSource, HttpSource, JsonDirSource, ReviewSource};

pub const DEFAULT_CONFIG_PATH: &str = ".storefront/config.yml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub source: SourceConfig,
    pub display: DisplayConfig,
}

/// Which review backend to use
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    #[default]
    Fixture,
    JsonDir,
    Http,
}

/// Review source configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    pub kind: SourceKind,
    pub fixture: FixtureConfig,
    pub json_dir: JsonDirConfig,
    pub http: HttpConfig,
}

/// Built-in dataset configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FixtureConfig {
    pub delay_ms: u64,
    /// Subject that always fails; `null` disables it
    pub failing_subject: Option<String>,
}

impl Default for FixtureConfig {
    fn default() -> Self {
        Self {
            delay_ms: DEFAULT_DELAY.as_millis() as u64,
            failing_subject: Some(DEFAULT_FAILING_SUBJECT.to_string()),
        }
    }
}

/// Directory of per-app JSON review files
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct JsonDirConfig {
    pub path: PathBuf,
}

impl Default for JsonDirConfig {
    fn default() -> Self {
        Self {
            path: PathBuf::from(".storefront/reviews"),
        }
    }
}

/// Review API configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub base_url: String,
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout_secs: 10,
        }
    }
}

/// Presentation configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    pub date_format: String,
    pub skeleton_rows: usize,
    pub show_summary: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            date_format: DEFAULT_DATE_FORMAT.to_string(),
            skeleton_rows: DEFAULT_SKELETON_ROWS,
            show_summary: false,
        }
    }
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        if !path.exists() {
            info!(path = %path.display(), "Config file not found, using defaults");
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = serde_yaml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        info!(path = %path.display(), "Loaded configuration");

        Ok(config)
    }

    /// Load configuration from the default location (.storefront/config.yml)
    pub fn load_default() -> Result<Self> {
        Self::load(DEFAULT_CONFIG_PATH)
    }

    /// Build the configured review source
    pub fn build_source(&self) -> Result<Arc<dyn ReviewSource>> {
        let source: Arc<dyn ReviewSource> = match self.source.kind {
            SourceKind::Fixture => {
                let fixture = &self.source.fixture;
                Arc::new(
                    FixtureSource::new()
                        .with_delay(Duration::from_millis(fixture.delay_ms))
                        .with_failing_subject(fixture.failing_subject.clone()),
                )
            }
            SourceKind::JsonDir => Arc::new(JsonDirSource::new(&self.source.json_dir.path)),
            SourceKind::Http => {
                let http = &self.source.http;
                let source = HttpSource::with_timeout(
                    &http.base_url,
                    Duration::from_secs(http.timeout_secs),
                )
                .context("Failed to create HTTP review source")?;
                Arc::new(source)
            }
        };

        Ok(source)
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            date_format: self.display.date_format.clone(),
            skeleton_rows: self.display.skeleton_rows,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.source.kind, SourceKind::Fixture);
        assert_eq!(config.source.fixture.delay_ms, 1500);
        assert_eq!(
            config.source.fixture.failing_subject.as_deref(),
            Some("error-case")
        );
        assert_eq!(config.render_options(), RenderOptions::default());
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
source:
  kind: http
  http:
    base_url: "https://store.example.com"

display:
  date_format: "%Y-%m-%d"
  show_summary: true
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.source.kind, SourceKind::Http);
        assert_eq!(config.source.http.base_url, "https://store.example.com");
        assert_eq!(config.source.http.timeout_secs, 10);
        assert_eq!(config.display.date_format, "%Y-%m-%d");
        assert_eq!(config.display.skeleton_rows, 3);
        assert!(config.display.show_summary);
    }

    #[test]
    fn test_parse_disabled_failing_subject() {
        let yaml = r#"
source:
  fixture:
    delay_ms: 0
    failing_subject: null
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.source.fixture.delay_ms, 0);
        assert!(config.source.fixture.failing_subject.is_none());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load(dir.path().join("absent.yml")).unwrap();
        assert_eq!(config.source.kind, SourceKind::Fixture);
    }

    #[test]
    fn test_load_invalid_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.yml");
        fs::write(&path, "source: 42").unwrap();

        let err = Config::load(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[tokio::test]
    async fn test_build_source_kinds() {
        let mut config = Config::default();
        assert_eq!(config.build_source().unwrap().name(), "fixture");

        config.source.kind = SourceKind::JsonDir;
        assert_eq!(config.build_source().unwrap().name(), "json_dir");

        config.source.kind = SourceKind::Http;
        assert_eq!(config.build_source().unwrap().name(), "http");
    }
}
