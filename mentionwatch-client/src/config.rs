//! Configuration loading for the MentionWatch client.
//!
//! Every field has a default, so running without a config file talks to a
//! local backend. A file, when given, may override any subset of fields.
//! `API_BASE` and `ADMIN_API_TOKEN` are applied on top of the file.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use mentionwatch_core::{DEFAULT_LIMIT, DEFAULT_PAGE_SIZE};

pub const CONFIG_PATH_ENV: &str = "MENTIONWATCH_CONFIG";
pub const API_BASE_ENV: &str = "API_BASE";
pub const ADMIN_TOKEN_ENV: &str = "ADMIN_API_TOKEN";

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:8000";
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_INGEST_TIMEOUT_MS: u64 = 90_000;

const READ_TIMEOUT_RANGE_MS: (u64, u64) = (1_000, 30_000);
const INGEST_TIMEOUT_RANGE_MS: (u64, u64) = (30_000, 300_000);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MentionWatchConfig {
    pub api_base_url: String,
    /// Sent as `X-ADMIN-TOKEN` on mutating calls only.
    pub admin_token: Option<String>,
    /// Feed reads, health, stats, flag and match.
    pub read_timeout_ms: u64,
    /// Keyword and source-config ingest.
    pub ingest_timeout_ms: u64,
    pub user_agent: String,
    pub default_limit: u32,
    pub page_size: usize,
    pub logging: LoggingConfig,
}

impl Default for MentionWatchConfig {
    fn default() -> Self {
        Self {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            admin_token: None,
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
            ingest_timeout_ms: DEFAULT_INGEST_TIMEOUT_MS,
            user_agent: default_user_agent(),
            default_limit: DEFAULT_LIMIT,
            page_size: DEFAULT_PAGE_SIZE,
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset.
    pub filter: String,
    pub json: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "mentionwatch=info".to_string(),
            json: false,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file {0} does not exist (check --config or MENTIONWATCH_CONFIG)")]
    MissingConfigPath(PathBuf),
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("Invalid config value for {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl MentionWatchConfig {
    /// Resolve, read and validate the configuration.
    ///
    /// `cli_path` wins over `MENTIONWATCH_CONFIG`; with neither, defaults are
    /// used. Environment overrides are applied before validation.
    pub fn load(cli_path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = cli_path.map(Path::to_path_buf).or_else(config_path_from_env);
        let mut config = match path {
            Some(path) => {
                if !path.exists() {
                    return Err(ConfigError::MissingConfigPath(path));
                }
                Self::from_path(&path)?
            }
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_toml(&contents)
    }

    pub fn from_toml(contents: &str) -> Result<Self, ConfigError> {
        let config: MentionWatchConfig = toml::from_str(contents)?;
        Ok(config)
    }

    /// Apply `API_BASE` / `ADMIN_API_TOKEN` as returned by `lookup`.
    /// Blank values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(base) = lookup(API_BASE_ENV).filter(|v| !v.trim().is_empty()) {
            self.api_base_url = base.trim().to_string();
        }
        if let Some(token) = lookup(ADMIN_TOKEN_ENV).filter(|v| !v.trim().is_empty()) {
            self.admin_token = Some(token.trim().to_string());
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let base = self.api_base_url.trim();
        if base.is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url",
                reason: "must not be empty".to_string(),
            });
        }
        if !(base.starts_with("http://") || base.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "api_base_url",
                reason: "must start with http:// or https://".to_string(),
            });
        }
        let (read_min, read_max) = READ_TIMEOUT_RANGE_MS;
        if !(read_min..=read_max).contains(&self.read_timeout_ms) {
            return Err(ConfigError::InvalidValue {
                field: "read_timeout_ms",
                reason: format!("must be between {} and {}", read_min, read_max),
            });
        }
        let (ingest_min, ingest_max) = INGEST_TIMEOUT_RANGE_MS;
        if !(ingest_min..=ingest_max).contains(&self.ingest_timeout_ms) {
            return Err(ConfigError::InvalidValue {
                field: "ingest_timeout_ms",
                reason: format!("must be between {} and {}", ingest_min, ingest_max),
            });
        }
        if self.ingest_timeout_ms <= self.read_timeout_ms {
            return Err(ConfigError::InvalidValue {
                field: "ingest_timeout_ms",
                reason: "must be greater than read_timeout_ms".to_string(),
            });
        }
        if self.default_limit == 0 {
            return Err(ConfigError::InvalidValue {
                field: "default_limit",
                reason: "must be > 0".to_string(),
            });
        }
        if self.page_size == 0 {
            return Err(ConfigError::InvalidValue {
                field: "page_size",
                reason: "must be > 0".to_string(),
            });
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "user_agent",
                reason: "must not be empty".to_string(),
            });
        }
        if self.logging.filter.trim().is_empty() {
            return Err(ConfigError::InvalidValue {
                field: "logging.filter",
                reason: "must not be empty".to_string(),
            });
        }
        Ok(())
    }

    pub fn read_timeout(&self) -> Duration {
        Duration::from_millis(self.read_timeout_ms)
    }

    pub fn ingest_timeout(&self) -> Duration {
        Duration::from_millis(self.ingest_timeout_ms)
    }
}

pub fn default_user_agent() -> String {
    format!("mentionwatch/{}", env!("CARGO_PKG_VERSION"))
}

fn config_path_from_env() -> Option<PathBuf> {
    std::env::var(CONFIG_PATH_ENV)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = MentionWatchConfig::default();
        config.validate().unwrap();
        assert_eq!(config.read_timeout(), Duration::from_secs(10));
        assert_eq!(config.ingest_timeout(), Duration::from_secs(90));
        assert!(config.user_agent.starts_with("mentionwatch/"));
    }

    #[test]
    fn partial_file_keeps_defaults() {
        let config = MentionWatchConfig::from_toml(
            r#"
            api_base_url = "https://mentions.internal"
            [logging]
            json = true
            "#,
        )
        .unwrap();
        assert_eq!(config.api_base_url, "https://mentions.internal");
        assert_eq!(config.page_size, DEFAULT_PAGE_SIZE);
        assert!(config.logging.json);
        assert_eq!(config.logging.filter, "mentionwatch=info");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let err = MentionWatchConfig::from_toml("refresh_interval_ms = 5").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut config = MentionWatchConfig::default();
        config.apply_overrides(|key| match key {
            API_BASE_ENV => Some("http://backend:9000".to_string()),
            ADMIN_TOKEN_ENV => Some("s3cret".to_string()),
            _ => None,
        });
        assert_eq!(config.api_base_url, "http://backend:9000");
        assert_eq!(config.admin_token.as_deref(), Some("s3cret"));
    }

    #[test]
    fn blank_overrides_are_ignored() {
        let mut config = MentionWatchConfig::default();
        config.apply_overrides(|_| Some("  ".to_string()));
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert!(config.admin_token.is_none());
    }

    #[test]
    fn ingest_timeout_must_exceed_read_timeout() {
        let config = MentionWatchConfig {
            read_timeout_ms: 30_000,
            ingest_timeout_ms: 30_000,
            ..MentionWatchConfig::default()
        };
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "ingest_timeout_ms",
                ..
            }
        ));
    }

    #[test]
    fn base_url_needs_http_scheme() {
        let config = MentionWatchConfig {
            api_base_url: "ftp://example.com".to_string(),
            ..MentionWatchConfig::default()
        };
        assert!(config.validate().is_err());
    }
}
