use secrecy::Secret;
use std::env;
use std::fmt;

use crate::expense::filter::ReportingOffset;

/// Runtime configuration read from the environment (after `.env` is loaded).
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub database_max_connections: u32,
    pub jwt_secret: Secret<String>,
    pub allowed_origins: Vec<String>,
    pub host: String,
    pub port: u16,
    pub reporting_offset: ReportingOffset,
}

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(&'static str),
    Invalid { key: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Missing(key) => write!(f, "{key} must be set"),
            ConfigError::Invalid { key, reason } => write!(f, "{key} is invalid: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build the configuration from any key lookup; `from_env` passes `std::env`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = get("DATABASE_URL").ok_or(ConfigError::Missing("DATABASE_URL"))?;
        let jwt_secret = get("JWT_SECRET").ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let allowed_origins = get("CORS_ALLOWED_ORIGINS")
            .unwrap_or_else(|| "http://localhost:8081".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let port = match get("SERVER_PORT") {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::Invalid {
                key: "SERVER_PORT",
                reason: e.to_string(),
            })?,
            None => 8080,
        };

        let database_max_connections = match get("DATABASE_MAX_CONNECTIONS") {
            Some(raw) => raw.parse::<u32>().map_err(|e| ConfigError::Invalid {
                key: "DATABASE_MAX_CONNECTIONS",
                reason: e.to_string(),
            })?,
            None => 20,
        };

        let reporting_offset = match get("REPORTING_UTC_OFFSET") {
            Some(raw) => {
                ReportingOffset::parse(&raw).map_err(|e| ConfigError::Invalid {
                    key: "REPORTING_UTC_OFFSET",
                    reason: e.to_string(),
                })?
            }
            None => ReportingOffset::default(),
        };

        Ok(Self {
            database_url,
            database_max_connections,
            jwt_secret: Secret::new(jwt_secret),
            allowed_origins,
            host: get("SERVER_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port,
            reporting_offset,
        })
    }
}
