// hackhub-service/src/config.rs
//
// Settings come from the process environment. `main` loads `.env` first
// through dotenv, so a local file can provide any of these:
//
//   SERVER_ADDRESS        127.0.0.1:9090
//   STORAGE_BACKEND       fs | memory
//   STORAGE_ROOT          ./storage
//   JWT_SECRET
//   TOKEN_TTL_DAYS        7
//   RESEND_API_KEY        unset = log-only sender
//   RESEND_API_URL        https://api.resend.com
//   EMAIL_FROM
//   NOTIFY_MAX_ATTEMPTS   3
//   NOTIFY_BACKOFF_MS     200
//   VIEW_CACHE_TTL_SECS   30
use derive_more::Display;
use log::warn;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;

const DEFAULT_JWT_SECRET: &str = "hackhub_development_secret";

#[derive(Debug, Display, PartialEq)]
pub enum ConfigError {
    #[display(fmt = "Invalid value for {}: {:?}", key, value)]
    InvalidValue { key: String, value: String },
    #[display(fmt = "Unknown storage backend: {}. Expected 'fs' or 'memory'", _0)]
    UnknownBackend(String),
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq)]
pub enum StorageBackend {
    Filesystem(PathBuf),
    Memory,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EmailConfig {
    pub api_key: Option<String>,
    pub api_url: String,
    pub from: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub bind_address: String,
    pub storage: StorageBackend,
    pub jwt_secret: String,
    pub token_ttl_days: i64,
    pub email: EmailConfig,
    pub notify_max_attempts: u32,
    pub notify_backoff_ms: u64,
    pub view_cache_ttl_secs: u64,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build a config from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let storage = match get("STORAGE_BACKEND").as_deref() {
            None | Some("fs") => StorageBackend::Filesystem(PathBuf::from(
                get("STORAGE_ROOT").unwrap_or_else(|| "./storage".to_string()),
            )),
            Some("memory") => StorageBackend::Memory,
            Some(other) => return Err(ConfigError::UnknownBackend(other.to_string())),
        };

        let jwt_secret = match get("JWT_SECRET") {
            Some(secret) => secret,
            None => {
                warn!("⚠️ JWT_SECRET not set, using the development secret");
                DEFAULT_JWT_SECRET.to_string()
            }
        };

        Ok(Self {
            bind_address: get("SERVER_ADDRESS").unwrap_or_else(|| "127.0.0.1:9090".to_string()),
            storage,
            jwt_secret,
            token_ttl_days: parse_or(&get, "TOKEN_TTL_DAYS", 7)?,
            email: EmailConfig {
                api_key: get("RESEND_API_KEY"),
                api_url: get("RESEND_API_URL")
                    .unwrap_or_else(|| "https://api.resend.com".to_string()),
                from: get("EMAIL_FROM")
                    .unwrap_or_else(|| "HackHub <noreply@hackhub.dev>".to_string()),
            },
            notify_max_attempts: parse_or(&get, "NOTIFY_MAX_ATTEMPTS", 3)?.max(1),
            notify_backoff_ms: parse_or(&get, "NOTIFY_BACKOFF_MS", 200)?,
            view_cache_ttl_secs: parse_or(&get, "VIEW_CACHE_TTL_SECS", 30)?,
        })
    }

    // In-memory config used by the test suite
    pub fn for_tests() -> Self {
        Self {
            bind_address: "127.0.0.1:0".to_string(),
            storage: StorageBackend::Memory,
            jwt_secret: "test_secret".to_string(),
            token_ttl_days: 1,
            email: EmailConfig {
                api_key: None,
                api_url: "http://localhost".to_string(),
                from: "HackHub <noreply@hackhub.dev>".to_string(),
            },
            notify_max_attempts: 3,
            notify_backoff_ms: 0,
            view_cache_ttl_secs: 30,
        }
    }
}

fn parse_or<T, F>(get: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match get(key) {
        None => Ok(default),
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidValue {
            key: key.to_string(),
            value: raw,
        }),
    }
}
