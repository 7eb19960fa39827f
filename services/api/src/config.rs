//! services/api/src/config.rs
//!
//! Defines the application's configuration structure and loading logic.
//!
//! All configuration is loaded from environment variables at startup. The `.env`
//! file is used for local development.

use std::net::SocketAddr;
use std::path::PathBuf;
use tracing::Level;

/// The Gemini OpenAI-compatibility endpoint, used unless overridden.
const DEFAULT_GENERATION_API_BASE: &str =
    "https://generativelanguage.googleapis.com/v1beta/openai";

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
    pub bind_address: SocketAddr,
    pub database_url: String,
    pub log_level: Level,
    pub cors_origin: String,
    pub gemini_api_key: Option<String>,
    pub generation_api_base: String,
    pub tarot_model: String,
    pub katina_model: String,
    pub dream_model: String,
    pub katina_meanings_path: PathBuf,
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

        // --- Load Server and Database Settings ---
        let bind_address_str =
            std::env::var("BIND_ADDRESS").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
        let bind_address = bind_address_str
            .parse::<SocketAddr>()
            .map_err(|e| ConfigError::InvalidValue("BIND_ADDRESS".to_string(), e.to_string()))?;

        let database_url = std::env::var("DATABASE_URL")
            .map_err(|_| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let log_level_str = std::env::var("RUST_LOG").unwrap_or_else(|_| "INFO".to_string());
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        let cors_origin = std::env::var("CORS_ORIGIN")
            .unwrap_or_else(|_| "http://localhost:3000".to_string());

        // --- Load Generation-Service Settings ---
        let gemini_api_key = std::env::var("GEMINI_API_KEY").ok();
        let generation_api_base = std::env::var("GENERATION_API_BASE")
            .unwrap_or_else(|_| DEFAULT_GENERATION_API_BASE.to_string());
        let tarot_model =
            std::env::var("TAROT_MODEL").unwrap_or_else(|_| "gemini-1.5-flash".to_string());
        let katina_model =
            std::env::var("KATINA_MODEL").unwrap_or_else(|_| "gemini-1.5-flash".to_string());
        let dream_model =
            std::env::var("DREAM_MODEL").unwrap_or_else(|_| "gemini-2.0-flash".to_string());

        let katina_meanings_path = std::env::var("KATINA_MEANINGS_PATH")
            .map(PathBuf::from)
            .unwrap_or_else(|_| PathBuf::from("./data/katina_meanings.json"));

        Ok(Self {
            bind_address,
            database_url,
            log_level,
            cors_origin,
            gemini_api_key,
            generation_api_base,
            tarot_model,
            katina_model,
            dream_model,
            katina_meanings_path,
        })
    }
}
