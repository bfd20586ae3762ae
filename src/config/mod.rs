//! # Assessor Configuration
//!
//! All runtime settings come from environment variables, read once at
//! startup through the `config` crate. Invalid or missing required values are
//! fatal: nothing is silently defaulted except the documented scalars below.
//!
//! | Variable                        | Default                         |
//! |---------------------------------|---------------------------------|
//! | `CACHE_TTL_HOURS`               | unset (wins when positive)      |
//! | `CACHE_TTL_MINUTES`             | `1440`                          |
//! | `CACHE_MAX_SIZE_MIB`            | `384`                           |
//! | `CACHE_HASH_SECRET`             | required                        |
//! | `ASSESSOR_BIND_ADDRESS`         | `0.0.0.0:3000`                  |
//! | `ASSESSOR_REQUEST_TIMEOUT_MS`   | `120000`                        |
//! | `ASSESSOR_MAX_BODY_MIB`         | `50`                            |
//! | `ASSESSOR_API_KEYS`             | empty (auth disabled)           |
//! | `ASSESSOR_UPSTREAM_URL`         | `http://127.0.0.1:8000/assess`  |
//! | `ASSESSOR_UPSTREAM_TIMEOUT_MS`  | `90000`                         |
//! | `ASSESSOR_UPSTREAM_API_KEY`     | unset                           |
//!
//! ## Usage
//!
//! ```rust,no_run
//! use assessor_core::config::AssessorConfig;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let config = AssessorConfig::from_env()?;
//! println!("{}", config.summary());
//! # Ok(())
//! # }
//! ```

pub mod error;

use serde_json::json;
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use tracing::warn;

pub use error::{ConfigResult, ConfigurationError};

const BYTES_PER_MIB: u64 = 1024 * 1024;

pub const DEFAULT_CACHE_TTL_MINUTES: f64 = 1440.0;
pub const DEFAULT_CACHE_MAX_SIZE_MIB: u64 = 384;
pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:3000";
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 120_000;
pub const DEFAULT_MAX_BODY_MIB: u64 = 50;
pub const DEFAULT_UPSTREAM_URL: &str = "http://127.0.0.1:8000/assess";
pub const DEFAULT_UPSTREAM_TIMEOUT_MS: u64 = 90_000;

const REDACTED: &str = "<redacted>";

/// Response cache settings
#[derive(Clone)]
pub struct CacheConfig {
    pub ttl: Duration,
    pub max_size_bytes: usize,
    pub hash_secret: String,
}

impl fmt::Debug for CacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheConfig")
            .field("ttl", &self.ttl)
            .field("max_size_bytes", &self.max_size_bytes)
            .field("hash_secret", &REDACTED)
            .finish()
    }
}

/// HTTP server settings
#[derive(Clone)]
pub struct WebConfig {
    pub bind_address: String,
    pub request_timeout_ms: u64,
    pub max_body_bytes: usize,
    /// Accepted API keys; an empty list disables authentication
    pub api_keys: Vec<String>,
}

impl WebConfig {
    pub fn auth_enabled(&self) -> bool {
        !self.api_keys.is_empty()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

impl fmt::Debug for WebConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebConfig")
            .field("bind_address", &self.bind_address)
            .field("request_timeout_ms", &self.request_timeout_ms)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("api_keys", &format!("{} configured", self.api_keys.len()))
            .finish()
    }
}

/// Downstream assessment service settings
#[derive(Clone)]
pub struct UpstreamConfig {
    pub url: String,
    pub timeout_ms: u64,
    pub api_key: Option<String>,
}

impl fmt::Debug for UpstreamConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpstreamConfig")
            .field("url", &self.url)
            .field("timeout_ms", &self.timeout_ms)
            .field("api_key", &self.api_key.as_ref().map(|_| REDACTED))
            .finish()
    }
}

/// Complete service configuration
#[derive(Debug, Clone)]
pub struct AssessorConfig {
    pub cache: CacheConfig,
    pub web: WebConfig,
    pub upstream: UpstreamConfig,
}

impl AssessorConfig {
    /// Load configuration from the process environment
    pub fn from_env() -> ConfigResult<Self> {
        let source = config::Config::builder()
            .add_source(config::Environment::default())
            .build()?;
        Self::from_config(&source)
    }

    /// Load configuration from an already-built `config::Config`
    pub fn from_config(source: &config::Config) -> ConfigResult<Self> {
        Ok(Self {
            cache: load_cache_config(source)?,
            web: load_web_config(source)?,
            upstream: load_upstream_config(source)?,
        })
    }

    /// Human-readable summary with every secret redacted
    pub fn summary(&self) -> serde_json::Value {
        json!({
            "cache": {
                "ttl_seconds": self.cache.ttl.as_secs(),
                "max_size_bytes": self.cache.max_size_bytes,
                "hash_secret": REDACTED,
            },
            "web": {
                "bind_address": self.web.bind_address,
                "request_timeout_ms": self.web.request_timeout_ms,
                "max_body_bytes": self.web.max_body_bytes,
                "auth_enabled": self.web.auth_enabled(),
                "api_key_count": self.web.api_keys.len(),
            },
            "upstream": {
                "url": self.upstream.url,
                "timeout_ms": self.upstream.timeout_ms,
                "api_key": self.upstream.api_key.as_ref().map(|_| REDACTED),
            },
        })
    }
}

fn load_cache_config(source: &config::Config) -> ConfigResult<CacheConfig> {
    let ttl = resolve_ttl(
        optional_string(source, "cache_ttl_hours")?,
        optional_string(source, "cache_ttl_minutes")?,
    )?;

    let max_size_mib = parse_positive(source, "cache_max_size_mib", DEFAULT_CACHE_MAX_SIZE_MIB)?;
    let max_size_bytes = mib_to_bytes("cache_max_size_mib", max_size_mib)?;

    let hash_secret = optional_string(source, "cache_hash_secret")?
        .filter(|secret| !secret.trim().is_empty())
        .ok_or_else(|| {
            ConfigurationError::missing_required_field("CACHE_HASH_SECRET", "cache configuration")
        })?;

    Ok(CacheConfig {
        ttl,
        max_size_bytes,
        hash_secret,
    })
}

fn load_web_config(source: &config::Config) -> ConfigResult<WebConfig> {
    let bind_address = optional_string(source, "assessor_bind_address")?
        .filter(|address| !address.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_BIND_ADDRESS.to_string());

    let request_timeout_ms = parse_positive(
        source,
        "assessor_request_timeout_ms",
        DEFAULT_REQUEST_TIMEOUT_MS,
    )?;

    let max_body_mib = parse_positive(source, "assessor_max_body_mib", DEFAULT_MAX_BODY_MIB)?;
    let max_body_bytes = mib_to_bytes("assessor_max_body_mib", max_body_mib)?;

    let api_keys = optional_string(source, "assessor_api_keys")?
        .map(|raw| parse_key_list(&raw))
        .unwrap_or_default();

    Ok(WebConfig {
        bind_address,
        request_timeout_ms,
        max_body_bytes,
        api_keys,
    })
}

fn load_upstream_config(source: &config::Config) -> ConfigResult<UpstreamConfig> {
    let url = optional_string(source, "assessor_upstream_url")?
        .filter(|url| !url.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_UPSTREAM_URL.to_string());

    let timeout_ms = parse_positive(
        source,
        "assessor_upstream_timeout_ms",
        DEFAULT_UPSTREAM_TIMEOUT_MS,
    )?;

    let api_key =
        optional_string(source, "assessor_upstream_api_key")?.filter(|key| !key.is_empty());

    Ok(UpstreamConfig {
        url,
        timeout_ms,
        api_key,
    })
}

/// Hours win when they parse to a positive number; otherwise minutes apply
fn resolve_ttl(hours: Option<String>, minutes: Option<String>) -> ConfigResult<Duration> {
    if let Some(raw) = hours {
        match raw.trim().parse::<f64>() {
            Ok(h) if h.is_finite() && h > 0.0 => {
                return Duration::try_from_secs_f64(h * 3600.0).map_err(|e| {
                    ConfigurationError::invalid_value("CACHE_TTL_HOURS", raw, e.to_string())
                });
            }
            _ => warn!(
                value = %raw,
                "CACHE_TTL_HOURS is not a positive number, falling back to CACHE_TTL_MINUTES"
            ),
        }
    }

    let minutes_value = match minutes {
        Some(raw) => raw.trim().parse::<f64>().map_err(|e| {
            ConfigurationError::invalid_value("CACHE_TTL_MINUTES", raw.clone(), e.to_string())
        })?,
        None => DEFAULT_CACHE_TTL_MINUTES,
    };

    if !minutes_value.is_finite() || minutes_value <= 0.0 {
        return Err(ConfigurationError::invalid_value(
            "CACHE_TTL_MINUTES",
            minutes_value.to_string(),
            "must be a positive number of minutes",
        ));
    }

    Duration::try_from_secs_f64(minutes_value * 60.0).map_err(|e| {
        ConfigurationError::invalid_value("CACHE_TTL_MINUTES", minutes_value.to_string(), e.to_string())
    })
}

/// Read a key, checking the lower-case name first and then the upper-case
/// environment spelling
fn optional_string(source: &config::Config, key: &str) -> ConfigResult<Option<String>> {
    for candidate in [key.to_lowercase(), key.to_uppercase()] {
        match source.get_string(&candidate) {
            Ok(value) => return Ok(Some(value)),
            Err(config::ConfigError::NotFound(_)) => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Ok(None)
}

fn parse_positive<T>(source: &config::Config, key: &str, default: T) -> ConfigResult<T>
where
    T: FromStr + PartialOrd + Default + fmt::Display,
    T::Err: fmt::Display,
{
    let Some(raw) = optional_string(source, key)? else {
        return Ok(default);
    };

    let value = raw
        .trim()
        .parse::<T>()
        .map_err(|e| ConfigurationError::invalid_value(key.to_uppercase(), raw.clone(), e.to_string()))?;

    if value <= T::default() {
        return Err(ConfigurationError::invalid_value(
            key.to_uppercase(),
            raw,
            "must be greater than zero",
        ));
    }

    Ok(value)
}

fn mib_to_bytes(key: &str, mib: u64) -> ConfigResult<usize> {
    mib.checked_mul(BYTES_PER_MIB)
        .and_then(|bytes| usize::try_from(bytes).ok())
        .ok_or_else(|| {
            ConfigurationError::invalid_value(key.to_uppercase(), mib.to_string(), "size overflows")
        })
}

fn parse_key_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .map(str::to_string)
        .collect()
}
