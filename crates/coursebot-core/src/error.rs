//! Error types for coursebot

use thiserror::Error;

/// Result type alias using CourseBotError
pub type Result<T> = std::result::Result<T, CourseBotError>;

/// Error type alias for convenience
pub type Error = CourseBotError;

/// Exit codes for CLI
pub mod exit_codes {
    pub const SUCCESS: i32 = 0;
    pub const GENERAL_ERROR: i32 = 1;
    pub const AUTH_FAILED: i32 = 2;
    pub const INVALID_INPUT: i32 = 3;
}

/// Failures of the username/password to temporary-credentials exchange
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Authentication failed: invalid username or password. Please check your credentials in the config")]
    InvalidCredentials,

    #[error("Authentication failed: user not found. Please check your username in the config")]
    UserNotFound,

    #[error("An unexpected error occurred during authentication: {0}")]
    Unexpected(String),
}

/// Main error type for coursebot
#[derive(Debug, Error)]
pub enum CourseBotError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Auth(#[from] AuthError),

    #[error("LLM error: {0}")]
    Llm(String),

    #[error("Embedding error: {0}")]
    Embedding(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Dataset error: {0}")]
    Dataset(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid state transition: cannot {event} while {state}")]
    InvalidTransition { event: &'static str, state: String },

    #[error("External service error: {0}")]
    ExternalError(String),

    #[error("{0}")]
    Other(#[from] anyhow::Error),
}

impl CourseBotError {
    /// Get the exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Auth(_) => exit_codes::AUTH_FAILED,
            Self::Config(_) | Self::Yaml(_) | Self::InvalidInput(_) | Self::Dataset(_) => {
                exit_codes::INVALID_INPUT
            }
            _ => exit_codes::GENERAL_ERROR,
        }
    }
}
