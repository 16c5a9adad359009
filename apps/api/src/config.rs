use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

/// Storage behind the profile cache.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CacheBackend {
    Postgres,
    Memory,
}

impl FromStr for CacheBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "postgres" => Ok(Self::Postgres),
            "memory" => Ok(Self::Memory),
            other => bail!("CACHE_BACKEND must be 'postgres' or 'memory', got '{other}'"),
        }
    }
}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Required unless the cache runs in memory.
    pub database_url: Option<String>,
    pub port: u16,
    pub rust_log: String,
    /// JSON file replacing the built-in competency mapping table.
    pub competency_mapping_path: Option<PathBuf>,
    pub cache_backend: CacheBackend,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let cache_backend = optional_env("CACHE_BACKEND")
            .map(|v| v.parse::<CacheBackend>())
            .transpose()?
            .unwrap_or(CacheBackend::Postgres);

        let database_url = match cache_backend {
            CacheBackend::Postgres => Some(require_env("DATABASE_URL")?),
            CacheBackend::Memory => optional_env("DATABASE_URL"),
        };

        Ok(Config {
            database_url,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            competency_mapping_path: optional_env("COMPETENCY_MAPPING_PATH").map(PathBuf::from),
            cache_backend,
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cache_backend_parse() {
        assert_eq!("postgres".parse::<CacheBackend>().unwrap(), CacheBackend::Postgres);
        assert_eq!(" Memory ".parse::<CacheBackend>().unwrap(), CacheBackend::Memory);
        assert!("redis".parse::<CacheBackend>().is_err());
    }
}
