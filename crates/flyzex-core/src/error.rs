use thiserror::Error;

use crate::application::ApplicationStatus;

/// Centralized error types for the application
///
/// All errors in the library are converted to this enum for consistent
/// error handling. Uses `thiserror` for automatic conversion and display
/// formatting.
#[derive(Error, Debug)]
pub enum AppError {
    /// IO errors (storage file access)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON (de)serialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Configuration file / environment extraction errors
    #[error("Configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    /// A required environment variable is missing
    #[error("environment variable '{0}' is not set")]
    MissingEnv(String),

    /// Settings that parsed but make no sense
    #[error("Validation error: {0}")]
    Validation(String),

    /// Storage-level errors
    #[error("Storage error: {0}")]
    Storage(String),

    /// Rejected application status change
    #[error("invalid status transition: {from} -> {to}")]
    InvalidTransition {
        from: ApplicationStatus,
        to: ApplicationStatus,
    },

    /// Telegram API errors
    #[cfg(feature = "telegram")]
    #[error("Telegram error: {0}")]
    Telegram(#[from] teloxide::RequestError),
}

/// Type alias for Result with AppError
pub type AppResult<T> = Result<T, AppError>;

/// Helper to convert String to AppError::Storage
impl From<String> for AppError {
    fn from(err: String) -> Self {
        AppError::Storage(err)
    }
}

/// Helper to convert &str to AppError::Storage
impl From<&str> for AppError {
    fn from(err: &str) -> Self {
        AppError::Storage(err.to_string())
    }
}

impl From<figment::Error> for AppError {
    fn from(err: figment::Error) -> Self {
        AppError::Figment(Box::new(err))
    }
}
