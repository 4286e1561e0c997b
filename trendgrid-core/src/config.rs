//! TOML configuration: query defaults, chart size and retry tuning.
//!
//! Every section and field is optional; missing values take the defaults below.
//!
//! ```toml
//! [query]
//! timeframe = "today 3-m"
//! region = ""          # global
//!
//! [chart]
//! height = 20
//! width = 100
//!
//! [retry]
//! max_retries = 5
//! ```

use crate::backoff::RetryPolicy;
use crate::data::google::GoogleTrendsOptions;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub query: QueryConfig,
    pub chart: ChartConfig,
    pub retry: RetrySettings,
}

/// What to ask the source for, besides the keywords.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryConfig {
    pub timeframe: String,
    /// Region code; empty means global.
    pub region: String,
    pub language: String,
    pub tz_offset_minutes: i32,
    pub category: u32,
    /// Leading text of the chart title.
    pub source_label: String,
}

impl Default for QueryConfig {
    fn default() -> Self {
        Self {
            timeframe: "today 12-m".into(),
            region: "US".into(),
            language: "en-US".into(),
            tz_offset_minutes: 360,
            category: 0,
            source_label: "Google Trends Interest".into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChartConfig {
    pub height: usize,
    pub width: usize,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            height: 15,
            width: 75,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetrySettings {
    pub max_retries: u32,
    pub base_delay_secs: f64,
    pub max_delay_secs: f64,
    pub rate_limit_wait_secs: f64,
    pub rate_limit_jitter_secs: f64,
    pub request_timeout_secs: u64,
}

impl Default for RetrySettings {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay_secs: 1.0,
            max_delay_secs: 60.0,
            rate_limit_wait_secs: 5.0,
            rate_limit_jitter_secs: 2.0,
            request_timeout_secs: 30,
        }
    }
}

fn secs(name: &str, value: f64) -> Result<Duration, ConfigError> {
    Duration::try_from_secs_f64(value).map_err(|_| {
        ConfigError::Invalid(format!("{name} must be a non-negative number, got {value}"))
    })
}

impl AppConfig {
    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a config from a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// `<config_dir>/trendgrid/config.toml`, if the platform has a config dir.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("trendgrid").join("config.toml"))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chart.height == 0 || self.chart.width == 0 {
            return Err(ConfigError::Invalid(format!(
                "chart size must be positive, got {}x{}",
                self.chart.height, self.chart.width
            )));
        }
        if self.query.timeframe.trim().is_empty() {
            return Err(ConfigError::Invalid("timeframe must not be empty".into()));
        }
        if self.retry.request_timeout_secs == 0 {
            return Err(ConfigError::Invalid("request_timeout_secs must be positive".into()));
        }
        self.retry_policy().map(|_| ())
    }

    /// Retry policy built from `[retry]`.
    pub fn retry_policy(&self) -> Result<RetryPolicy, ConfigError> {
        let r = &self.retry;
        let policy = RetryPolicy::new(
            r.max_retries,
            secs("base_delay_secs", r.base_delay_secs)?,
            secs("max_delay_secs", r.max_delay_secs)?,
        )
        .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(policy.with_rate_limit_wait(
            secs("rate_limit_wait_secs", r.rate_limit_wait_secs)?,
            secs("rate_limit_jitter_secs", r.rate_limit_jitter_secs)?,
        ))
    }

    pub fn google_options(&self) -> GoogleTrendsOptions {
        GoogleTrendsOptions {
            language: self.query.language.clone(),
            tz_offset_minutes: self.query.tz_offset_minutes,
            category: self.query.category,
            timeout: Duration::from_secs(self.retry.request_timeout_secs),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = AppConfig::from_toml("").unwrap();
        assert_eq!(config, AppConfig::default());
        assert_eq!(config.chart.height, 15);
        assert_eq!(config.chart.width, 75);
        assert_eq!(config.query.timeframe, "today 12-m");
        assert_eq!(config.query.region, "US");
        assert_eq!(config.retry.max_retries, 3);
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = AppConfig::from_toml(
            r#"
            [query]
            region = ""

            [retry]
            max_retries = 5
            "#,
        )
        .unwrap();
        assert_eq!(config.query.region, "");
        assert_eq!(config.query.timeframe, "today 12-m");
        assert_eq!(config.retry.max_retries, 5);
        assert_eq!(config.retry.base_delay_secs, 1.0);
    }

    #[test]
    fn retry_policy_reflects_settings() {
        let config =
            AppConfig::from_toml("[retry]\nbase_delay_secs = 2.0\nmax_delay_secs = 10.0").unwrap();
        let policy = config.retry_policy().unwrap();
        assert_eq!(policy.max_retries(), 3);
        assert_eq!(policy.base_delay(), Duration::from_secs(2));
        assert_eq!(policy.max_delay(), Duration::from_secs(10));
        assert_eq!(policy.rate_limit_wait(), Duration::from_secs(5));
        assert_eq!(policy.rate_limit_jitter(), Duration::from_secs(2));
    }

    #[test]
    fn zero_chart_size_is_invalid() {
        let err = AppConfig::from_toml("[chart]\nheight = 0").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn max_below_base_is_invalid() {
        let err = AppConfig::from_toml("[retry]\nbase_delay_secs = 5.0\nmax_delay_secs = 1.0")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn negative_delay_is_invalid() {
        let err = AppConfig::from_toml("[retry]\nrate_limit_wait_secs = -1.0").unwrap_err();
        assert!(err.to_string().contains("rate_limit_wait_secs"));
    }

    #[test]
    fn huge_rate_limit_settings_saturate() {
        let config = AppConfig::from_toml(
            "[retry]\nrate_limit_wait_secs = 1.8e19\nrate_limit_jitter_secs = 1e19",
        )
        .unwrap();
        let policy = config.retry_policy().unwrap();
        assert_eq!(policy.rate_limit_delay(0.99), Duration::MAX);
    }

    #[test]
    fn unknown_types_fail_to_parse() {
        let err = AppConfig::from_toml("[chart]\nheight = \"tall\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn google_options_follow_query_section() {
        let config =
            AppConfig::from_toml("[query]\nlanguage = \"de-DE\"\ntz_offset_minutes = -60").unwrap();
        let opts = config.google_options();
        assert_eq!(opts.language, "de-DE");
        assert_eq!(opts.tz_offset_minutes, -60);
        assert_eq!(opts.timeout, Duration::from_secs(30));
    }
}
