//! Configuration loading and representation.
//!
//! Both services are configured through environment variables. Parsing goes
//! through a lookup function so tests can supply values without touching the
//! process environment.

use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_PRODUCT_SERVICE_ADDR: &str = "0.0.0.0:8081";
pub const DEFAULT_ORDER_SERVICE_ADDR: &str = "0.0.0.0:8082";
pub const DEFAULT_PRODUCT_SERVICE_URL: &str = "http://127.0.0.1:8081";
pub const DEFAULT_PRODUCT_SERVICE_TIMEOUT_MS: u64 = 5_000;
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 5;

/// Invalid configuration value.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid value for {key} ({value:?}): {reason}")]
pub struct ConfigError {
    pub key: &'static str,
    pub value: String,
    pub reason: String,
}

impl ConfigError {
    fn new(key: &'static str, value: &str, reason: impl Into<String>) -> Self {
        Self {
            key,
            value: value.to_string(),
            reason: reason.into(),
        }
    }
}

fn parse_or<T, F>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::new(key, &raw, e.to_string())),
        None => Ok(default),
    }
}

fn bind_addr<F>(lookup: &F, key: &'static str, default: &str) -> Result<SocketAddr, ConfigError>
where
    F: Fn(&str) -> Option<String>,
{
    let raw = lookup(key).unwrap_or_else(|| default.to_string());
    raw.trim()
        .parse()
        .map_err(|e: std::net::AddrParseError| ConfigError::new(key, &raw, e.to_string()))
}

/// Postgres connection settings. Absent `DATABASE_URL` means in-memory stores.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl DatabaseConfig {
    fn from_lookup<F>(lookup: &F) -> Result<Option<Self>, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let Some(url) = lookup("DATABASE_URL").filter(|u| !u.trim().is_empty()) else {
            return Ok(None);
        };
        let max_connections = parse_or(
            lookup,
            "DATABASE_MAX_CONNECTIONS",
            DEFAULT_DATABASE_MAX_CONNECTIONS,
        )?;
        if max_connections == 0 {
            return Err(ConfigError::new(
                "DATABASE_MAX_CONNECTIONS",
                "0",
                "must be at least 1",
            ));
        }
        Ok(Some(Self {
            url: url.trim().to_string(),
            max_connections,
        }))
    }
}

/// Product service settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductServiceConfig {
    pub bind_addr: SocketAddr,
    pub database: Option<DatabaseConfig>,
}

impl ProductServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            bind_addr: bind_addr(&lookup, "PRODUCT_SERVICE_ADDR", DEFAULT_PRODUCT_SERVICE_ADDR)?,
            database: DatabaseConfig::from_lookup(&lookup)?,
        })
    }
}

/// Order service settings, including where to find the product service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderServiceConfig {
    pub bind_addr: SocketAddr,
    pub database: Option<DatabaseConfig>,
    pub product_service_url: String,
    pub product_service_timeout: Duration,
}

impl OrderServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let url = lookup("PRODUCT_SERVICE_URL")
            .unwrap_or_else(|| DEFAULT_PRODUCT_SERVICE_URL.to_string());
        let parsed = reqwest::Url::parse(url.trim())
            .map_err(|e| ConfigError::new("PRODUCT_SERVICE_URL", &url, e.to_string()))?;
        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::new(
                "PRODUCT_SERVICE_URL",
                &url,
                "scheme must be http or https",
            ));
        }

        let timeout_ms = parse_or(
            &lookup,
            "PRODUCT_SERVICE_TIMEOUT_MS",
            DEFAULT_PRODUCT_SERVICE_TIMEOUT_MS,
        )?;
        if timeout_ms == 0 {
            return Err(ConfigError::new(
                "PRODUCT_SERVICE_TIMEOUT_MS",
                "0",
                "must be greater than zero",
            ));
        }

        Ok(Self {
            bind_addr: bind_addr(&lookup, "ORDER_SERVICE_ADDR", DEFAULT_ORDER_SERVICE_ADDR)?,
            database: DatabaseConfig::from_lookup(&lookup)?,
            product_service_url: url.trim().trim_end_matches('/').to_string(),
            product_service_timeout: Duration::from_millis(timeout_ms),
        })
    }
}
