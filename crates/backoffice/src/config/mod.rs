use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use crate::loyalty::LoyaltyConfig;

/// Distinguishes runtime behavior for different stages of the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for the back-office service.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub loyalty: LoyaltyConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let host = env::var("APP_HOST").unwrap_or_else(|_| "127.0.0.1".to_string());
        let port = env::var("APP_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;

        let log_level = env::var("APP_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            loyalty: load_loyalty()?,
        })
    }
}

fn load_loyalty() -> Result<LoyaltyConfig, ConfigError> {
    let defaults = LoyaltyConfig::default();

    let milestone_interval = match env::var("LOYALTY_MILESTONE_INTERVAL") {
        Ok(raw) => raw
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|interval| *interval >= 1)
            .ok_or(ConfigError::InvalidLoyaltySetting {
                key: "LOYALTY_MILESTONE_INTERVAL",
            })?,
        Err(_) => defaults.milestone_interval,
    };

    let milestone_reward_value = match env::var("LOYALTY_MILESTONE_REWARD_VALUE") {
        Ok(raw) => raw
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|value| value.is_finite() && *value >= 0.0)
            .ok_or(ConfigError::InvalidLoyaltySetting {
                key: "LOYALTY_MILESTONE_REWARD_VALUE",
            })?,
        Err(_) => defaults.milestone_reward_value,
    };

    let milestone_expiry_days = match env::var("LOYALTY_MILESTONE_EXPIRY_DAYS") {
        Ok(raw) => raw
            .trim()
            .parse::<u32>()
            .ok()
            .filter(|days| *days >= 1)
            .ok_or(ConfigError::InvalidLoyaltySetting {
                key: "LOYALTY_MILESTONE_EXPIRY_DAYS",
            })?,
        Err(_) => defaults.milestone_expiry_days,
    };

    Ok(LoyaltyConfig {
        milestone_interval,
        milestone_reward_value,
        milestone_expiry_days,
    })
}

/// Settings controlling the HTTP server binding.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidLoyaltySetting { key: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidLoyaltySetting { key } => {
                write!(f, "{key} must be a positive number")
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidPort | ConfigError::InvalidLoyaltySetting { .. } => None,
            ConfigError::InvalidHost { source } => Some(source),
        }
    }
}
