//! Configuration loading and representation.

use std::net::SocketAddr;

use thiserror::Error;

pub const DEFAULT_DATABASE_URL: &str = "sqlite://database.db?mode=rwc";
pub const DEFAULT_BIND_ADDR: &str = "127.0.0.1:5000";

/// `DATABASE_URL` value selecting the in-memory repository.
pub const IN_MEMORY_DATABASE: &str = "memory";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {name}: {reason}")]
    Invalid { name: &'static str, reason: String },
}

/// Process configuration, read once at startup and passed down explicitly.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    /// Identity provider domain, without scheme or trailing slash.
    pub auth0_domain: String,
    pub api_audience: String,
    pub jwks_url: String,
    pub database_url: String,
    pub bind_addr: SocketAddr,
    /// Drop and recreate the drinks table with seed data at startup.
    pub reset_database: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable source (tests pass a map).
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let auth0_domain = var("AUTH0_DOMAIN")
            .map(|d| normalize_domain(&d))
            .ok_or(ConfigError::Missing("AUTH0_DOMAIN"))?;
        let api_audience = var("API_AUDIENCE").ok_or(ConfigError::Missing("API_AUDIENCE"))?;

        let jwks_url = var("JWKS_URL")
            .unwrap_or_else(|| format!("https://{auth0_domain}/.well-known/jwks.json"));
        let database_url = var("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string());

        let bind_addr = var("BIND_ADDR")
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string())
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::Invalid {
                name: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        let reset_database = match var("RESET_DATABASE") {
            None => false,
            Some(v) => v.to_ascii_lowercase().parse::<bool>().map_err(|e| ConfigError::Invalid {
                name: "RESET_DATABASE",
                reason: e.to_string(),
            })?,
        };

        Ok(Self {
            auth0_domain,
            api_audience,
            jwks_url,
            database_url,
            bind_addr,
            reset_database,
        })
    }

    /// Expected `iss` claim.
    pub fn issuer(&self) -> String {
        format!("https://{}/", self.auth0_domain)
    }

    pub fn uses_in_memory_store(&self) -> bool {
        self.database_url == IN_MEMORY_DATABASE
    }
}

fn normalize_domain(raw: &str) -> String {
    raw.trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/')
        .to_string()
}
