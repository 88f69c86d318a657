//! Configuration loader and validator for the disaster news pipeline.
//!
//! Every field has a built-in default, so a run without any config file
//! behaves exactly like the stock pipeline.
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Config file looked up in the working directory when no path is given.
pub const DEFAULT_PATH: &str = "config.yaml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("YAML parse error: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("Invalid configuration: {0}")]
    Invalid(&'static str),
}

/// Root configuration struct mirroring the YAML schema.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Config {
    pub app: App,
    pub feed: Feed,
    pub report: Report,
}

/// App-level settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct App {
    pub database_url: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            database_url: "sqlite://disaster.db".into(),
        }
    }
}

/// What to do when the feed cannot be fetched or parsed.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum FetchFailurePolicy {
    /// Warn and carry on to reporting with the data already stored.
    #[default]
    Skip,
    /// Stop the run with an error.
    Abort,
}

/// Feed search endpoint and locale parameters.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Feed {
    pub endpoint: String,
    pub hl: String,
    pub gl: String,
    pub ceid: String,
    /// Source name stored when an entry carries none.
    pub source_fallback: String,
    /// Request timeout; `None` waits for the upstream indefinitely.
    pub timeout_secs: Option<u64>,
    pub on_fetch_error: FetchFailurePolicy,
}

impl Default for Feed {
    fn default() -> Self {
        Self {
            endpoint: "https://news.google.com/rss/search".into(),
            hl: "th-TH".into(),
            gl: "TH".into(),
            ceid: "TH:th".into(),
            source_fallback: "Google News".into(),
            timeout_secs: None,
            on_fetch_error: FetchFailurePolicy::Skip,
        }
    }
}

/// Table rendering limits.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Report {
    pub limit: u32,
    pub title_max_chars: usize,
    pub date_prefix_chars: usize,
}

impl Default for Report {
    fn default() -> Self {
        Self {
            limit: 10,
            title_max_chars: 50,
            date_prefix_chars: 16,
        }
    }
}

/// Load configuration from a YAML file and validate it.
pub fn load(path: &Path) -> Result<Config, ConfigError> {
    let content = fs::read_to_string(path)?;
    let cfg: Config = serde_yaml::from_str(&content)?;
    validate(&cfg)?;
    Ok(cfg)
}

/// Load `path` if given; otherwise `config.yaml` when present, else defaults.
pub fn load_or_default(path: Option<&Path>) -> Result<Config, ConfigError> {
    match path {
        Some(p) => load(p),
        None => {
            let fallback = Path::new(DEFAULT_PATH);
            if fallback.exists() {
                load(fallback)
            } else {
                Ok(Config::default())
            }
        }
    }
}

/// Validate a configuration instance.
pub fn validate(cfg: &Config) -> Result<(), ConfigError> {
    if cfg.app.database_url.trim().is_empty() {
        return Err(ConfigError::Invalid("app.database_url must be non-empty"));
    }

    let endpoint = cfg.feed.endpoint.trim();
    if !endpoint.starts_with("http://") && !endpoint.starts_with("https://") {
        return Err(ConfigError::Invalid("feed.endpoint must be an http(s) URL"));
    }
    if cfg.feed.hl.trim().is_empty() {
        return Err(ConfigError::Invalid("feed.hl must be non-empty"));
    }
    if cfg.feed.gl.trim().is_empty() {
        return Err(ConfigError::Invalid("feed.gl must be non-empty"));
    }
    if cfg.feed.ceid.trim().is_empty() {
        return Err(ConfigError::Invalid("feed.ceid must be non-empty"));
    }
    if cfg.feed.source_fallback.trim().is_empty() {
        return Err(ConfigError::Invalid("feed.source_fallback must be non-empty"));
    }
    if cfg.feed.timeout_secs == Some(0) {
        return Err(ConfigError::Invalid("feed.timeout_secs must be > 0 when set"));
    }

    if cfg.report.limit == 0 {
        return Err(ConfigError::Invalid("report.limit must be > 0"));
    }
    if cfg.report.title_max_chars == 0 {
        return Err(ConfigError::Invalid("report.title_max_chars must be > 0"));
    }
    if cfg.report.date_prefix_chars == 0 {
        return Err(ConfigError::Invalid("report.date_prefix_chars must be > 0"));
    }

    Ok(())
}

/// Returns the example YAML shipped as `config.example.yaml`.
pub fn example() -> &'static str {
    r#"app:
  database_url: "sqlite://disaster.db"

feed:
  endpoint: "https://news.google.com/rss/search"
  hl: "th-TH"
  gl: "TH"
  ceid: "TH:th"
  source_fallback: "Google News"
  # timeout_secs: 30
  on_fetch_error: skip

report:
  limit: 10
  title_max_chars: 50
  date_prefix_chars: 16
"#
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn example_matches_defaults() {
        let cfg: Config = serde_yaml::from_str(example()).unwrap();
        validate(&cfg).unwrap();
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let cfg: Config = serde_yaml::from_str("report:\n  limit: 5\n").unwrap();
        assert_eq!(cfg.report.limit, 5);
        assert_eq!(cfg.report.title_max_chars, 50);
        assert_eq!(cfg.feed.ceid, "TH:th");
        assert_eq!(cfg.feed.on_fetch_error, FetchFailurePolicy::Skip);
    }

    #[test]
    fn abort_policy_parses() {
        let cfg: Config = serde_yaml::from_str("feed:\n  on_fetch_error: abort\n").unwrap();
        assert_eq!(cfg.feed.on_fetch_error, FetchFailurePolicy::Abort);
    }

    #[test]
    fn invalid_endpoint() {
        let mut cfg = Config::default();
        cfg.feed.endpoint = "news.google.com/rss".into();
        let err = validate(&cfg).unwrap_err();
        match err {
            ConfigError::Invalid(msg) => assert!(msg.contains("feed.endpoint")),
            _ => panic!("wrong error"),
        }
    }

    #[test]
    fn invalid_report_limits() {
        let mut cfg = Config::default();
        cfg.report.limit = 0;
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));

        let mut cfg = Config::default();
        cfg.report.title_max_chars = 0;
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));

        let mut cfg = Config::default();
        cfg.feed.timeout_secs = Some(0);
        assert!(matches!(validate(&cfg), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn load_from_file_ok() {
        let td = tempdir().unwrap();
        let p = td.path().join("config.yaml");
        fs::write(&p, "app:\n  database_url: \"sqlite::memory:\"\n").unwrap();
        let cfg = load_or_default(Some(&p)).unwrap();
        assert_eq!(cfg.app.database_url, "sqlite::memory:");
    }

    #[test]
    fn explicit_missing_file_is_an_error() {
        let td = tempdir().unwrap();
        let err = load_or_default(Some(&td.path().join("nope.yaml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
