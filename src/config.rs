//! Application configuration module
//!
//! Handles loading and validating configuration from environment variables.

use std::net::Ipv4Addr;
use std::str::FromStr;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration value: {0}")]
    InvalidValue(String),
}

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: Ipv4Addr,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Ipv4Addr::new(0, 0, 0, 0), // Bind to 0.0.0.0 for Railway/Docker
            port: 3000,
        }
    }
}

/// CORS configuration
#[derive(Debug, Clone, Default)]
pub struct CorsConfig {
    /// Empty means any origin is allowed
    pub allowed_origins: Vec<String>,
}

/// Schema evolution defaults
#[derive(Debug, Clone, Default)]
pub struct EvolutionConfig {
    /// Keep at most this many versions per source; `None` keeps everything
    pub max_versions_per_source: Option<usize>,
    /// Used when a diff request does not say whether to show unchanged rows
    pub show_unchanged_default: bool,
}

/// Complete application settings
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub server: ServerConfig,
    pub cors: CorsConfig,
    pub evolution: EvolutionConfig,
}

impl Settings {
    /// Load settings from environment variables
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if it exists (ignore errors if file not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build settings from any key lookup (environment, test fixtures)
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = ServerConfig::default();
        let server = ServerConfig {
            host: parse_var(&lookup, "HOST")?.unwrap_or(defaults.host),
            port: parse_var(&lookup, "PORT")?.unwrap_or(defaults.port),
        };

        let cors = CorsConfig {
            allowed_origins: lookup("ALLOWED_ORIGINS")
                .map(|s| {
                    s.split(',')
                        .map(|s| s.trim().to_string())
                        .filter(|s| !s.is_empty())
                        .collect()
                })
                .unwrap_or_default(),
        };

        let max_versions_per_source: Option<usize> = parse_var(&lookup, "MAX_VERSIONS_PER_SOURCE")?;
        if max_versions_per_source == Some(0) {
            return Err(ConfigError::InvalidValue(
                "MAX_VERSIONS_PER_SOURCE must be at least 1".to_string(),
            ));
        }

        let evolution = EvolutionConfig {
            max_versions_per_source,
            show_unchanged_default: parse_var(&lookup, "SHOW_UNCHANGED_DEFAULT")?.unwrap_or(false),
        };

        Ok(Self {
            server,
            cors,
            evolution,
        })
    }
}

/// Parse an optional variable, rejecting values that are set but malformed
fn parse_var<F, T>(lookup: &F, key: &str) -> Result<Option<T>, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| ConfigError::InvalidValue(format!("{}={}", key, raw))),
    }
}
