//! Runtime settings read from the environment (after `.env` is loaded).

use crate::error::ConfigError;
use std::str::FromStr;
use std::time::Duration;

pub const DEFAULT_DATABASE_URL: &str = "postgres://localhost/url_lists";
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;
pub const DEFAULT_ACQUIRE_TIMEOUT_SECS: u64 = 5;
pub const DEFAULT_BODY_LIMIT_BYTES: usize = 64 * 1024;
pub const DEFAULT_API_PREFIX: &str = "/api";

#[derive(Clone, Debug, PartialEq)]
pub struct Settings {
    pub database_url: String,
    pub bind_addr: String,
    pub max_connections: u32,
    pub acquire_timeout: Duration,
    pub body_limit_bytes: usize,
    /// Mount point of the list routes. Empty mounts them at the root.
    pub api_prefix: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            database_url: DEFAULT_DATABASE_URL.into(),
            bind_addr: DEFAULT_BIND_ADDR.into(),
            max_connections: DEFAULT_MAX_CONNECTIONS,
            acquire_timeout: Duration::from_secs(DEFAULT_ACQUIRE_TIMEOUT_SECS),
            body_limit_bytes: DEFAULT_BODY_LIMIT_BYTES,
            api_prefix: DEFAULT_API_PREFIX.into(),
        }
    }
}

impl Settings {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup; unset keys take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Settings::default();
        let database_url = lookup("DATABASE_URL").unwrap_or(defaults.database_url);
        if database_url.trim().is_empty() {
            return Err(ConfigError::Empty { key: "DATABASE_URL" });
        }
        let bind_addr = lookup("BIND_ADDR").unwrap_or(defaults.bind_addr);
        let max_connections =
            parse_or(&lookup, "DB_MAX_CONNECTIONS", defaults.max_connections)?;
        let acquire_timeout_secs =
            parse_or(&lookup, "DB_ACQUIRE_TIMEOUT_SECS", DEFAULT_ACQUIRE_TIMEOUT_SECS)?;
        let body_limit_bytes = parse_or(&lookup, "BODY_LIMIT_BYTES", defaults.body_limit_bytes)?;
        let api_prefix = normalize_prefix(&lookup("API_PREFIX").unwrap_or(defaults.api_prefix));

        Ok(Self {
            database_url,
            bind_addr,
            max_connections,
            acquire_timeout: Duration::from_secs(acquire_timeout_secs),
            body_limit_bytes,
            api_prefix,
        })
    }
}

fn parse_or<F, T>(lookup: &F, key: &'static str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue { key, value: raw }),
    }
}

/// "api/" -> "/api", "/" -> "".
fn normalize_prefix(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('/');
    if trimmed.is_empty() {
        String::new()
    } else {
        format!("/{}", trimmed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Settings::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn empty_environment_gives_defaults() {
        assert_eq!(settings(&[]).unwrap(), Settings::default());
    }

    #[test]
    fn reads_overrides() {
        let s = settings(&[
            ("DATABASE_URL", "postgres://db/lists"),
            ("BIND_ADDR", "127.0.0.1:8080"),
            ("DB_MAX_CONNECTIONS", "12"),
            ("DB_ACQUIRE_TIMEOUT_SECS", "2"),
            ("BODY_LIMIT_BYTES", "1024"),
        ])
        .unwrap();
        assert_eq!(s.database_url, "postgres://db/lists");
        assert_eq!(s.bind_addr, "127.0.0.1:8080");
        assert_eq!(s.max_connections, 12);
        assert_eq!(s.acquire_timeout, Duration::from_secs(2));
        assert_eq!(s.body_limit_bytes, 1024);
    }

    #[test]
    fn bad_number_is_reported_with_its_key() {
        let err = settings(&[("DB_MAX_CONNECTIONS", "many")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { key: "DB_MAX_CONNECTIONS", .. }
        ));
    }

    #[test]
    fn blank_database_url_is_rejected() {
        assert!(matches!(
            settings(&[("DATABASE_URL", "  ")]),
            Err(ConfigError::Empty { key: "DATABASE_URL" })
        ));
    }

    #[test]
    fn api_prefix_is_normalized() {
        assert_eq!(settings(&[("API_PREFIX", "v1/")]).unwrap().api_prefix, "/v1");
        assert_eq!(settings(&[("API_PREFIX", "/")]).unwrap().api_prefix, "");
    }
}
