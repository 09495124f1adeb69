//! Application-level errors.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error(transparent)]
    Manager(#[from] clm_manager::ManagerError),

    #[error(transparent)]
    Telemetry(#[from] clm_telemetry::TelemetryError),
}

pub type AppResult<T> = Result<T, AppError>;
