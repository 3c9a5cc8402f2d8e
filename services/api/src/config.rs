//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::time::Duration;

use study_assistant_core::provider::{AiSettings, ApiCredential, ProviderKind, ProviderOverride};
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing the environment variable {0}")]
    MissingVar(String),
    #[error("Invalid value for the environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub db_max_connections: u32,
    pub log_level: Level,
    pub ai_api_key: Option<ApiCredential>,
    pub ai_provider: Option<ProviderKind>,
    pub openai: ProviderOverride,
    pub deepseek: ProviderOverride,
    pub ai_timeout: Duration,
    pub session_ttl_days: i64,
}

impl Config {
    /// Loads configuration from environment variables.
    ///
    /// It will look for a `.env` file in the current directory for development,
    /// but this is skipped in test environments to ensure tests are hermetic.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination.
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }
        Self::from_vars(|key| std::env::var(key).ok())
    }

    /// Builds the configuration from an arbitrary variable lookup.
    pub fn from_vars<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // --- Load Server and Database Settings ---
        let bind_address_str = lookup("BIND_ADDRESS").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str.parse::<SocketAddr>().map_err(|e| {
            ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string())
        })?;

        let database_url =
            lookup("DATABASE_URL").ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".to_string()))?;
        let db_max_connections = parse_or("DB_MAX_CONNECTIONS", lookup("DB_MAX_CONNECTIONS"), 5)?;

        let log_level_str = lookup("RUST_LOG").unwrap_or_else(|| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        // --- Load the Provider Credential (optional; requests fail without it) ---
        let ai_api_key = lookup("OPENAI_API_KEY").and_then(ApiCredential::new);
        let ai_provider = match lookup("AI_PROVIDER").filter(|v| !v.trim().is_empty()) {
            Some(value) => Some(value.parse::<ProviderKind>().map_err(|e| {
                ConfigError::InvalidValue("AI_PROVIDER".to_string(), e.to_string())
            })?),
            None => None,
        };

        // --- Load Provider-specific Settings ---
        let openai = ProviderOverride {
            base_url: lookup("OPENAI_BASE_URL"),
            model: lookup("OPENAI_MODEL"),
        };
        let deepseek = ProviderOverride {
            base_url: lookup("DEEPSEEK_BASE_URL"),
            model: lookup("DEEPSEEK_MODEL"),
        };
        let ai_timeout =
            Duration::from_secs(parse_or("AI_TIMEOUT_SECS", lookup("AI_TIMEOUT_SECS"), 30)?);

        let session_ttl_days = parse_or("SESSION_TTL_DAYS", lookup("SESSION_TTL_DAYS"), 30)?;

        Ok(Self {
            bind_address,
            database_url,
            db_max_connections,
            log_level,
            ai_api_key,
            ai_provider,
            openai,
            deepseek,
            ai_timeout,
            session_ttl_days,
        })
    }

    /// The provider settings handed to the study service.
    pub fn ai_settings(&self) -> AiSettings {
        AiSettings {
            credential: self.ai_api_key.clone(),
            provider: self.ai_provider,
            deepseek: self.deepseek.clone(),
            openai: self.openai.clone(),
        }
    }
}

fn parse_or<T>(name: &str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        Some(value) => value
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        None => Ok(default),
    }
}
