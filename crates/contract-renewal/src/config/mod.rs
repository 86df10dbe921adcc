use std::env;
use std::fmt;
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of the tool.
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

/// Top-level configuration for the notifier.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub inputs: InputPaths,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("APP_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let inputs = InputPaths {
            rules: path_var("RENEWAL_CONFIG_PATH", "inputs/config.json")?,
            contracts: path_var("RENEWAL_CONTRACTS_PATH", "inputs/contracts.json")?,
            ledger: path_var("RENEWAL_LEDGER_PATH", "inputs/notification_log.json")?,
        };

        let log_level = env::var("RENEWAL_LOG_LEVEL").unwrap_or_else(|_| "warn".to_string());

        Ok(Self {
            environment,
            inputs,
            telemetry: TelemetryConfig {
                log_level,
                ansi: environment != AppEnvironment::Production,
            },
        })
    }
}

fn path_var(key: &'static str, default: &str) -> Result<PathBuf, ConfigError> {
    let value = env::var(key).unwrap_or_else(|_| default.to_string());
    if value.trim().is_empty() {
        return Err(ConfigError::EmptyPath { key });
    }
    Ok(PathBuf::from(value))
}

/// Locations of the rules document, the contracts list and the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPaths {
    pub rules: PathBuf,
    pub contracts: PathBuf,
    pub ledger: PathBuf,
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub ansi: bool,
}

#[derive(Debug)]
pub enum ConfigError {
    EmptyPath { key: &'static str },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyPath { key } => write!(f, "{key} must not be empty"),
        }
    }
}

impl std::error::Error for ConfigError {}
