//! services/app/src/error.rs
//!
//! Defines the primary error type for the entire app service.

use crate::config::ConfigError;
use polaris_core::ports::GatewayError;

/// The primary error type for the `app` service.
///
/// None of these are fatal: every failure path in the stores clears its
/// busy/pending flag and leaves previously valid state intact.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// Represents an error that occurred during configuration loading.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A stage was invoked before its dependency was satisfied.
    #[error("Precondition not met: {0}")]
    Precondition(String),

    /// A required form input was empty or absent.
    #[error("Invalid input: {0}")]
    Validation(String),

    /// An external service call failed or returned a malformed response.
    #[error("Gateway error: {0}")]
    Gateway(#[from] GatewayError),

    /// Represents a standard Input/Output error (e.g., reading a file to upload).
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl AppError {
    pub fn precondition(msg: impl Into<String>) -> Self {
        AppError::Precondition(msg.into())
    }

    pub fn validation(msg: impl Into<String>) -> Self {
        AppError::Validation(msg.into())
    }
}
