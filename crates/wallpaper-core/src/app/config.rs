//! Job configuration.
//!
//! Loaded from an optional TOML file; every field has a default so an empty
//! file (or no file) gives the standard daily job.
//!
//! ```toml
//! target_url = "https://www.moely.link/random/jump/?wallpaper=true"
//! ledger_path = "wallpaper.json"
//! dedup = "date"
//!
//! [retry]
//! mode = "bounded"
//! max_attempts = 5
//! delay_secs = 10
//! ```

use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::FixedOffset;
use serde::{Deserialize, Serialize};

use crate::domain::{DedupKey, RetryPolicy};
use crate::impls::PayloadMarker;

pub const DEFAULT_TARGET_URL: &str = "https://www.moely.link/random/jump/?wallpaper=true";
pub const DEFAULT_LEDGER_PATH: &str = "wallpaper.json";
/// Asia/Shanghai civil time (no DST).
pub const DEFAULT_UTC_OFFSET_MINUTES: i32 = 8 * 60;

const MAX_OFFSET_MINUTES: i32 = 24 * 60 - 1;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid config: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JobConfig {
    pub target_url: String,
    pub ledger_path: PathBuf,
    pub utc_offset_minutes: i32,
    pub lookahead_days: u32,
    pub retention_days: u32,
    pub dedup: DedupKey,
    pub marker: PayloadMarker,
    pub http: HttpConfig,
    pub retry: RetryConfig,
}

impl Default for JobConfig {
    fn default() -> Self {
        Self {
            target_url: DEFAULT_TARGET_URL.to_string(),
            ledger_path: PathBuf::from(DEFAULT_LEDGER_PATH),
            utc_offset_minutes: DEFAULT_UTC_OFFSET_MINUTES,
            lookahead_days: 7,
            retention_days: 7,
            dedup: DedupKey::Date,
            marker: PayloadMarker::default(),
            http: HttpConfig::default(),
            retry: RetryConfig::default(),
        }
    }
}

impl JobConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = reqwest::Url::parse(&self.target_url)
            .map_err(|e| ConfigError::Validation(format!("target_url: {e}")))?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(ConfigError::Validation(format!(
                "target_url: unsupported scheme {:?}",
                url.scheme()
            )));
        }
        if !(-MAX_OFFSET_MINUTES..=MAX_OFFSET_MINUTES).contains(&self.utc_offset_minutes) {
            return Err(ConfigError::Validation(format!(
                "utc_offset_minutes out of range: {}",
                self.utc_offset_minutes
            )));
        }
        if self.ledger_path.as_os_str().is_empty() {
            return Err(ConfigError::Validation("ledger_path is empty".to_string()));
        }
        // the marker is spliced into a CSS attribute selector
        for (name, value) in [
            ("marker.element_id", &self.marker.element_id),
            ("marker.content_type", &self.marker.content_type),
        ] {
            if value.is_empty() || value.contains(['"', '\\']) {
                return Err(ConfigError::Validation(format!("{name}: {value:?}")));
            }
        }
        if self.retry.mode == RetryMode::Bounded && self.retry.max_attempts == 0 {
            return Err(ConfigError::Validation(
                "retry.max_attempts must be at least 1".to_string(),
            ));
        }
        if self.retry.mode == RetryMode::Forever && self.retry.delay_secs == 0 {
            return Err(ConfigError::Validation(
                "retry.delay_secs must be at least 1 in forever mode".to_string(),
            ));
        }
        Ok(())
    }

    pub fn utc_offset(&self) -> Result<FixedOffset, ConfigError> {
        self.utc_offset_minutes
            .checked_mul(60)
            .and_then(FixedOffset::east_opt)
            .ok_or_else(|| {
                ConfigError::Validation(format!(
                    "utc_offset_minutes out of range: {}",
                    self.utc_offset_minutes
                ))
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct HttpConfig {
    pub timeout_secs: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_secs: 30,
            user_agent: concat!("wallpaper-collect/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetryMode {
    /// One attempt; a failed fetch ends the run.
    #[default]
    FailFast,
    /// Up to `max_attempts` attempts.
    Bounded,
    /// Retry until a payload arrives. Never reports a fetch failure;
    /// `max_total_delay_secs` does not apply.
    Forever,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RetryConfig {
    pub mode: RetryMode,
    pub max_attempts: u32,
    pub delay_secs: u64,
    pub max_total_delay_secs: Option<u64>,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            mode: RetryMode::FailFast,
            max_attempts: 5,
            delay_secs: 10,
            max_total_delay_secs: None,
        }
    }
}

impl RetryConfig {
    pub fn policy(&self) -> RetryPolicy {
        let delay = Duration::from_secs(self.delay_secs);
        match self.mode {
            RetryMode::FailFast => RetryPolicy::fail_fast(),
            RetryMode::Forever => RetryPolicy::forever(delay),
            RetryMode::Bounded => {
                let policy = RetryPolicy::bounded(self.max_attempts, delay);
                match self.max_total_delay_secs {
                    Some(cap) => policy.with_max_total_delay(Duration::from_secs(cap)),
                    None => policy,
                }
            }
        }
    }
}
