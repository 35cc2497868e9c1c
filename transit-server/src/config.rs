//! Server settings, read from the environment.

use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::CacheConfig;
use crate::circuit_breaker::CircuitBreakerConfig;
use crate::siri::SiriConfig;

/// Errors while reading settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required setting {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Everything the server needs to start.
#[derive(Debug, Clone)]
pub struct Settings {
    pub siri: SiriConfig,
    pub cache: CacheConfig,
    pub bind_addr: SocketAddr,
}

impl Settings {
    /// Read settings from process environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through `lookup`, which maps a variable name to its
    /// value (if set).
    ///
    /// Required: `SIRI_ID`, `SIRI_URL`, `SIRI_REQUESTOR_REF`. Everything else
    /// has a default.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let id = required(&lookup, "SIRI_ID")?;
        let url = required(&lookup, "SIRI_URL")?;
        let requestor_ref = required(&lookup, "SIRI_REQUESTOR_REF")?;

        let breaker_defaults = CircuitBreakerConfig::default();
        let circuit_breaker = CircuitBreakerConfig::new(
            parsed(&lookup, "CIRCUIT_BREAKER_MAX_SIRI_FAIL")?
                .unwrap_or(breaker_defaults.failure_threshold),
            parsed(&lookup, "CIRCUIT_BREAKER_SIRI_TIMEOUT_S")?
                .map(Duration::from_secs)
                .unwrap_or(breaker_defaults.reset_timeout),
        );

        let mut siri = SiriConfig::new(id, url, requestor_ref).with_circuit_breaker(circuit_breaker);
        if let Some(tag) = lookup("SIRI_OBJECT_ID_TAG") {
            siri = siri.with_object_id_tag(tag);
        }
        if let Some(tag) = lookup("SIRI_DESTINATION_ID_TAG") {
            siri = siri.with_destination_id_tag(tag);
        }
        if let Some(secs) = parsed(&lookup, "SIRI_TIMEOUT_S")? {
            siri = siri.with_timeout(Duration::from_secs(secs));
        }

        let cache_defaults = CacheConfig::default();
        let cache = CacheConfig {
            ttl: parsed(&lookup, "CACHE_TIMEOUT_SIRI")?
                .map(Duration::from_secs)
                .unwrap_or(cache_defaults.ttl),
            max_capacity: parsed(&lookup, "CACHE_MAX_CAPACITY")?
                .unwrap_or(cache_defaults.max_capacity),
        };

        let bind_addr = parsed(&lookup, "BIND_ADDR")?
            .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 3000)));

        Ok(Self {
            siri,
            cache,
            bind_addr,
        })
    }
}

fn required<F>(lookup: &F, key: &'static str) -> Result<String, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .filter(|v| !v.is_empty())
        .ok_or(ConfigError::Missing(key))
}

fn parsed<F, T>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    lookup(key)
        .map(|value| {
            value
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid { key, value })
        })
        .transpose()
}
