use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::renewal::{ContractsLoadError, DateError, LedgerError, RulesLoadError};
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Rules(RulesLoadError),
    Contracts(ContractsLoadError),
    Ledger(LedgerError),
    Date(DateError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Rules(err) => write!(f, "rules error: {}", err),
            AppError::Contracts(err) => write!(f, "contracts error: {}", err),
            AppError::Ledger(err) => write!(f, "ledger error: {}", err),
            AppError::Date(err) => write!(f, "date error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Rules(err) => Some(err),
            AppError::Contracts(err) => Some(err),
            AppError::Ledger(err) => Some(err),
            AppError::Date(err) => Some(err),
        }
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<RulesLoadError> for AppError {
    fn from(value: RulesLoadError) -> Self {
        Self::Rules(value)
    }
}

impl From<ContractsLoadError> for AppError {
    fn from(value: ContractsLoadError) -> Self {
        Self::Contracts(value)
    }
}

impl From<LedgerError> for AppError {
    fn from(value: LedgerError) -> Self {
        Self::Ledger(value)
    }
}

impl From<DateError> for AppError {
    fn from(value: DateError) -> Self {
        Self::Date(value)
    }
}
