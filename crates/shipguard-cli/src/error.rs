//! CLI error types

use thiserror::Error;

/// Result type alias for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Main error type for the CLI
#[derive(Error, Debug)]
pub enum CliError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error: {0}")]
    Api(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl CliError {
    /// Create an API error with a message
    pub fn api(message: impl Into<String>) -> Self {
        CliError::Api(message.into())
    }
}
