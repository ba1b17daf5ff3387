//! Process settings read from the environment (optionally via `.env`).

use crate::error::ConfigError;
use crate::token::MAX_TTL_DAYS;
use std::str::FromStr;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum StoreBackend {
    Postgres,
    Memory,
}

impl FromStr for StoreBackend {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "postgres" | "postgresql" => Ok(StoreBackend::Postgres),
            "memory" => Ok(StoreBackend::Memory),
            _ => Err(ConfigError::Invalid {
                key: "STORE_BACKEND",
                value: s.to_string(),
            }),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub service_name: String,
    pub bind_addr: String,
    pub port: u16,
    pub store: StoreBackend,
    pub database_url: String,
    pub max_connections: u32,
    /// PostgreSQL schema holding the entity collections.
    pub schema: String,
    pub long_token_secret: String,
    pub long_token_ttl_days: i64,
    pub body_limit_bytes: usize,
}

impl Settings {
    /// Load `.env` if present, then read the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let store = match get("STORE_BACKEND") {
            Some(v) => v.parse()?,
            None => StoreBackend::Postgres,
        };
        let long_token_secret = get("LONG_TOKEN_SECRET").ok_or(ConfigError::Missing("LONG_TOKEN_SECRET"))?;

        Ok(Settings {
            service_name: get("SERVICE_NAME").unwrap_or_else(|| "school-registry".into()),
            bind_addr: get("BIND_ADDR").unwrap_or_else(|| "0.0.0.0".into()),
            port: parse_or("USER_PORT", get("USER_PORT"), 5111)?,
            store,
            database_url: get("DATABASE_URL").unwrap_or_else(|| "postgres://localhost/school_registry".into()),
            max_connections: parse_or("DB_MAX_CONNECTIONS", get("DB_MAX_CONNECTIONS"), 5)?,
            schema: get("REGISTRY_SCHEMA").unwrap_or_else(|| "registry".into()),
            long_token_secret,
            long_token_ttl_days: ttl_days(get("LONG_TOKEN_TTL_DAYS"))?,
            body_limit_bytes: parse_or("BODY_LIMIT_BYTES", get("BODY_LIMIT_BYTES"), 1024 * 1024)?,
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.bind_addr, self.port)
    }
}

fn parse_or<T: FromStr>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError> {
    match raw {
        None => Ok(default),
        Some(v) => v.trim().parse().map_err(|_| ConfigError::Invalid { key, value: v }),
    }
}

/// Token lifetime must be at least one day and at most `MAX_TTL_DAYS`.
fn ttl_days(raw: Option<String>) -> Result<i64, ConfigError> {
    let days = parse_or("LONG_TOKEN_TTL_DAYS", raw.clone(), 1095)?;
    if (1..=MAX_TTL_DAYS).contains(&days) {
        Ok(days)
    } else {
        Err(ConfigError::Invalid {
            key: "LONG_TOKEN_TTL_DAYS",
            value: raw.unwrap_or_default(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn settings(pairs: &[(&str, &str)]) -> Result<Settings, ConfigError> {
        let env: HashMap<String, String> = pairs.iter().map(|(k, v)| (k.to_string(), v.to_string())).collect();
        Settings::from_lookup(|k| env.get(k).cloned())
    }

    #[test]
    fn defaults_apply_when_only_secret_is_set() {
        let s = settings(&[("LONG_TOKEN_SECRET", "s3cret")]).unwrap();
        assert_eq!(s.port, 5111);
        assert_eq!(s.store, StoreBackend::Postgres);
        assert_eq!(s.schema, "registry");
        assert_eq!(s.long_token_ttl_days, 1095);
        assert_eq!(s.listen_addr(), "0.0.0.0:5111");
    }

    #[test]
    fn secret_is_required() {
        let err = settings(&[("USER_PORT", "8080")]).unwrap_err();
        assert!(matches!(err, ConfigError::Missing("LONG_TOKEN_SECRET")));
    }

    #[test]
    fn bad_numbers_are_rejected() {
        let err = settings(&[("LONG_TOKEN_SECRET", "x"), ("USER_PORT", "eighty")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "USER_PORT", .. }));
    }

    #[test]
    fn token_ttl_must_be_in_range() {
        for bad in ["0", "-1", "9223372036854775807", "36501"] {
            let err = settings(&[("LONG_TOKEN_SECRET", "x"), ("LONG_TOKEN_TTL_DAYS", bad)]).unwrap_err();
            assert!(matches!(err, ConfigError::Invalid { key: "LONG_TOKEN_TTL_DAYS", .. }), "{bad}");
        }
        let s = settings(&[("LONG_TOKEN_SECRET", "x"), ("LONG_TOKEN_TTL_DAYS", "30")]).unwrap();
        assert_eq!(s.long_token_ttl_days, 30);
    }

    #[test]
    fn memory_backend_is_selectable() {
        let s = settings(&[("LONG_TOKEN_SECRET", "x"), ("STORE_BACKEND", "Memory")]).unwrap();
        assert_eq!(s.store, StoreBackend::Memory);
        assert!(settings(&[("LONG_TOKEN_SECRET", "x"), ("STORE_BACKEND", "mongo")]).is_err());
    }
}
