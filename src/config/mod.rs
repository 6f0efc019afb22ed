//! Environment-backed configuration.
//!
//! Every setting has a default. Override with `LENS_*` environment variables.

pub mod error;

#[cfg(test)]
mod tests;

pub use error::ConfigError;

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{
    DEFAULT_CACHE_TTL, DEFAULT_CONCURRENCY, DEFAULT_MAX_EXTERNAL_CALLS, DEFAULT_RETRY_BACKOFF,
};
use crate::extraction::StageOptions;
use crate::pipeline::Strategy;

/// Runtime configuration loaded from environment variables.
///
/// Use [`Config::from_env`] to read `LENS_*` overrides on top of defaults.
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Root directory of the extraction cache. Default: `./.cache`.
    pub cache_path: PathBuf,

    /// Cache entry lifetime. Default: 24h.
    pub cache_ttl: Duration,

    /// Candidates screened at once by the pipeline; `1` is sequential. Default: `5`.
    pub concurrency: usize,

    /// Cap on simultaneous collaborator calls. Default: `4`.
    pub max_external_calls: usize,

    /// Pause before the single transient retry. Default: 500ms.
    pub retry_backoff: Duration,

    /// Base URL of the extraction and discovery service.
    pub extractor_url: Option<String>,

    /// Per-request timeout for collaborator calls. Default: 30s.
    pub request_timeout: Duration,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            cache_path: PathBuf::from("./.cache"),
            cache_ttl: DEFAULT_CACHE_TTL,
            concurrency: DEFAULT_CONCURRENCY,
            max_external_calls: DEFAULT_MAX_EXTERNAL_CALLS,
            retry_backoff: DEFAULT_RETRY_BACKOFF,
            extractor_url: None,
            request_timeout: Duration::from_secs(30),
        }
    }
}

impl Config {
    const ENV_CACHE_PATH: &'static str = "LENS_CACHE_PATH";
    const ENV_CACHE_TTL_SECS: &'static str = "LENS_CACHE_TTL_SECS";
    const ENV_CONCURRENCY: &'static str = "LENS_CONCURRENCY";
    const ENV_MAX_EXTERNAL_CALLS: &'static str = "LENS_MAX_EXTERNAL_CALLS";
    const ENV_RETRY_BACKOFF_MS: &'static str = "LENS_RETRY_BACKOFF_MS";
    const ENV_EXTRACTOR_URL: &'static str = "LENS_EXTRACTOR_URL";
    const ENV_REQUEST_TIMEOUT_SECS: &'static str = "LENS_REQUEST_TIMEOUT_SECS";

    /// Loads configuration from environment variables (falling back to defaults).
    pub fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let cache_path = Self::parse_path_from_env(Self::ENV_CACHE_PATH, defaults.cache_path);
        let cache_ttl = Duration::from_secs(Self::parse_u64_from_env(
            Self::ENV_CACHE_TTL_SECS,
            defaults.cache_ttl.as_secs(),
        ));
        let concurrency = Self::parse_count_from_env(Self::ENV_CONCURRENCY, defaults.concurrency)?;
        let max_external_calls =
            Self::parse_count_from_env(Self::ENV_MAX_EXTERNAL_CALLS, defaults.max_external_calls)?;
        let retry_backoff = Duration::from_millis(Self::parse_u64_from_env(
            Self::ENV_RETRY_BACKOFF_MS,
            u64::try_from(defaults.retry_backoff.as_millis()).unwrap_or(u64::MAX),
        ));
        let extractor_url = Self::parse_optional_string_from_env(Self::ENV_EXTRACTOR_URL);
        let request_timeout = Duration::from_secs(Self::parse_u64_from_env(
            Self::ENV_REQUEST_TIMEOUT_SECS,
            defaults.request_timeout.as_secs(),
        ));

        Ok(Self {
            cache_path,
            cache_ttl,
            concurrency,
            max_external_calls,
            retry_backoff,
            extractor_url,
            request_timeout,
        })
    }

    /// Validates paths and basic invariants (does not create directories).
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cache_path.exists() && !self.cache_path.is_dir() {
            return Err(ConfigError::NotADirectory {
                path: self.cache_path.clone(),
            });
        }

        if self.concurrency == 0 {
            return Err(ConfigError::ZeroNotAllowed {
                name: Self::ENV_CONCURRENCY,
            });
        }
        if self.max_external_calls == 0 {
            return Err(ConfigError::ZeroNotAllowed {
                name: Self::ENV_MAX_EXTERNAL_CALLS,
            });
        }

        if let Some(url) = &self.extractor_url
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            return Err(ConfigError::InvalidUrl { value: url.clone() });
        }

        Ok(())
    }

    /// Base URL of the collaborator service, required for evaluation and search.
    pub fn require_extractor_url(&self) -> Result<&str, ConfigError> {
        self.extractor_url
            .as_deref()
            .ok_or(ConfigError::MissingEnvVar {
                name: Self::ENV_EXTRACTOR_URL,
            })
    }

    /// Stage knobs derived from this configuration.
    pub fn stage_options(&self) -> StageOptions {
        StageOptions {
            max_external_calls: self.max_external_calls,
            retry_backoff: self.retry_backoff,
        }
    }

    /// Pipeline scheduling derived from `concurrency`.
    pub fn strategy(&self) -> Strategy {
        Strategy::with_concurrency(self.concurrency)
    }

    fn parse_path_from_env(var_name: &str, default: PathBuf) -> PathBuf {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .unwrap_or(default)
    }

    fn parse_optional_string_from_env(var_name: &str) -> Option<String> {
        env::var(var_name)
            .ok()
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
    }

    fn parse_u64_from_env(var_name: &str, default: u64) -> u64 {
        env::var(var_name)
            .ok()
            .and_then(|v| v.trim().parse().ok())
            .unwrap_or(default)
    }

    fn parse_count_from_env(name: &'static str, default: usize) -> Result<usize, ConfigError> {
        match env::var(name) {
            Ok(value) => {
                let count: usize =
                    value
                        .trim()
                        .parse()
                        .map_err(|e| ConfigError::InvalidNumber {
                            name,
                            value: value.clone(),
                            source: e,
                        })?;

                if count == 0 {
                    return Err(ConfigError::ZeroNotAllowed { name });
                }

                Ok(count)
            }
            Err(_) => Ok(default),
        }
    }
}
