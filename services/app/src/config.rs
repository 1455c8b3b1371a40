//! services/app/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::path::PathBuf;
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
    pub auth_base_url: String,
    pub log_level: Level,
    pub session_file: PathBuf,
    pub openai_api_key: Option<String>,
    pub ocr_model: String,
    pub summary_model: String,
    pub qa_model: String,
    pub generator_model: String,
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

        // --- Load Backend and Storage Settings ---
        let auth_base_url = std::env::var("AUTH_BASE_URL")
            .map_err(|_| ConfigError::MissingVar("AUTH_BASE_URL".to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let session_file = std::env::var("SESSION_FILE")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./polaris_session.json"));

        // --- Load API Keys (as optional) ---
        let openai_api_key = std::env::var("OPENAI_API_KEY").ok();

        // --- Load Adapter-specific Settings ---
        let ocr_model = std::env::var("OCR_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());
        let summary_model =
            std::env::var("SUMMARY_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());
        let qa_model = std::env::var("QA_MODEL").unwrap_or_else(|_| "gpt-4o".to_string());
        let generator_model =
            std::env::var("GENERATOR_MODEL").unwrap_or_else(|_| "gpt-4o-mini".to_string());

        Ok(Self {
            auth_base_url,
            log_level,
            session_file,
            openai_api_key,
            ocr_model,
            summary_model,
            qa_model,
            generator_model,
        })
    }
}
