use std::time::Duration;

use crate::limits::DEFAULT_HORIZON_DAYS;

#[derive(Debug)]
pub enum ConfigError {
    MissingVar(&'static str),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::MissingVar(name) => write!(f, "missing environment variable: {name}"),
        }
    }
}

impl std::error::Error for ConfigError {}

fn env_ms(name: &str, default_ms: u64) -> Duration {
    let ms = std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default_ms);
    Duration::from_millis(ms)
}

/// Remote flight-booking service endpoint.
#[derive(Debug, Clone)]
pub struct FlightApiConfig {
    pub base_url: String,
    pub api_key: String,
    pub timeout: Duration,
}

impl FlightApiConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var("AFS_BASE_URL")
            .unwrap_or_else(|_| "https://advanced-flights-system.replit.app".into());
        let api_key =
            std::env::var("AFS_API_KEY").map_err(|_| ConfigError::MissingVar("AFS_API_KEY"))?;
        Ok(Self {
            base_url,
            api_key,
            timeout: env_ms("INNKEEP_FLIGHT_TIMEOUT_MS", 10_000),
        })
    }
}

/// Notification-delivery service endpoint.
#[derive(Debug, Clone)]
pub struct NotifierConfig {
    pub base_url: String,
    pub timeout: Duration,
}

impl NotifierConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let base_url = std::env::var("INNKEEP_NOTIFY_URL")
            .map_err(|_| ConfigError::MissingVar("INNKEEP_NOTIFY_URL"))?;
        Ok(Self {
            base_url,
            timeout: env_ms("INNKEEP_NOTIFY_TIMEOUT_MS", 5_000),
        })
    }
}

#[derive(Debug, Clone)]
pub struct ServiceConfig {
    /// Calendar horizon for newly created room types.
    pub horizon_days: u32,
    pub metrics_port: Option<u16>,
}

impl ServiceConfig {
    pub fn from_env() -> Self {
        let horizon_days = std::env::var("INNKEEP_HORIZON_DAYS")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(DEFAULT_HORIZON_DAYS);
        let metrics_port = std::env::var("INNKEEP_METRICS_PORT")
            .ok()
            .and_then(|s| s.parse().ok());
        Self {
            horizon_days,
            metrics_port,
        }
    }
}
