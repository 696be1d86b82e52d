//! Process configuration read from `CATALOG_*` environment variables.

use std::collections::HashMap;

use crate::storage::{DEFAULT_MAX_UPLOAD_MB, MAX_UPLOAD_MB_LIMIT};

pub const DEFAULT_STORAGE_URL: &str = "http://localhost:54321";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{key} must be {expected}, got {value:?}")]
    Invalid {
        key: &'static str,
        expected: &'static str,
        value: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// `None` selects the in-memory store.
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub storage_url: String,
    /// `None` selects in-memory object storage.
    pub storage_key: Option<String>,
    pub bind_addr: String,
    pub admin_token: Option<String>,
    pub max_upload_mb: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: None,
            database_max_connections: DEFAULT_MAX_CONNECTIONS,
            storage_url: DEFAULT_STORAGE_URL.to_string(),
            storage_key: None,
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            admin_token: None,
            max_upload_mb: DEFAULT_MAX_UPLOAD_MB,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_vars(std::env::vars().collect())
    }

    /// Blank values count as unset.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, ConfigError> {
        let get = |key: &str| {
            vars.get(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };
        let defaults = Self::default();

        Ok(Self {
            database_url: get("CATALOG_DATABASE_URL"),
            database_max_connections: parse_positive(
                "CATALOG_DATABASE_MAX_CONNECTIONS",
                get("CATALOG_DATABASE_MAX_CONNECTIONS"),
                defaults.database_max_connections,
            )?,
            storage_url: get("CATALOG_STORAGE_URL").unwrap_or(defaults.storage_url),
            storage_key: get("CATALOG_STORAGE_KEY"),
            bind_addr: get("CATALOG_BIND_ADDR").unwrap_or(defaults.bind_addr),
            admin_token: get("CATALOG_ADMIN_TOKEN"),
            max_upload_mb: parse_upload_limit(get("CATALOG_MAX_UPLOAD_MB"), defaults.max_upload_mb)?,
        })
    }
}

fn parse_positive<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr + PartialOrd + Default,
{
    let Some(raw) = raw else {
        return Ok(default);
    };
    match raw.parse::<T>() {
        Ok(v) if v > T::default() => Ok(v),
        _ => Err(ConfigError::Invalid {
            key,
            expected: "a positive integer",
            value: raw,
        }),
    }
}

fn parse_upload_limit(raw: Option<String>, default: u64) -> Result<u64, ConfigError> {
    const KEY: &str = "CATALOG_MAX_UPLOAD_MB";
    let mb = parse_positive(KEY, raw, default)?;
    if mb > MAX_UPLOAD_MB_LIMIT {
        return Err(ConfigError::Invalid {
            key: KEY,
            expected: "a positive integer no greater than 1024",
            value: mb.to_string(),
        });
    }
    Ok(mb)
}
