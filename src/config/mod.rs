//! Typed configuration from environment variables.
//!
//! Loads once at startup, fails fast if required vars are missing.
//! Sensitive values wrapped in secrecy::SecretString to prevent log leaks.

pub mod pipeline;
pub mod secrets;

pub use pipeline::PipelineConfig;

use crate::error::{Error, Result};
use secrecy::SecretString;
use std::net::SocketAddr;
use std::time::Duration;

pub const DEFAULT_MODEL: &str = "claude-sonnet-4-20250514";

#[derive(Debug)]
pub struct Config {
    pub database_url: SecretString,
    pub anthropic_api_key: SecretString,
    pub otel_endpoint: Option<String>,
    pub log_level: String,
    pub bind_addr: SocketAddr,
    pub completion: CompletionSettings,
}

/// Operator-fixed parameters for every completion call. Not per-user tunable.
#[derive(Debug, Clone)]
pub struct CompletionSettings {
    pub model: String,
    pub max_tokens: u64,
    pub temperature: f64,
    pub timeout: Duration,
}

impl Default for CompletionSettings {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            max_tokens: 300,
            temperature: 0.8,
            timeout: Duration::from_secs(20),
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    /// In production, systemd EnvironmentFile provides the vars.
    pub fn from_env() -> Result<Self> {
        let defaults = CompletionSettings::default();
        let completion = CompletionSettings {
            model: std::env::var("CATBOT_MODEL").unwrap_or(defaults.model),
            max_tokens: parsed_var("CATBOT_MAX_TOKENS")?.unwrap_or(defaults.max_tokens),
            temperature: parsed_var("CATBOT_TEMPERATURE")?.unwrap_or(defaults.temperature),
            timeout: parsed_var("CATBOT_COMPLETION_TIMEOUT_SECS")?
                .map(Duration::from_secs)
                .unwrap_or(defaults.timeout),
        };

        Ok(Self {
            database_url: SecretString::from(required_var("DATABASE_URL")?),
            anthropic_api_key: SecretString::from(required_var("ANTHROPIC_API_KEY")?),
            otel_endpoint: std::env::var("OTEL_ENDPOINT").ok(),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
            bind_addr: parsed_var("CATBOT_BIND")?
                .unwrap_or_else(|| SocketAddr::from(([127, 0, 0, 1], 8080))),
            completion,
        })
    }
}

fn required_var(name: &str) -> Result<String> {
    std::env::var(name)
        .map_err(|_| Error::Config(format!("required environment variable {name} is not set")))
}

fn parsed_var<T>(name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|e| Error::Config(format!("bad value for {name}: {e}"))),
        Err(_) => Ok(None),
    }
}
