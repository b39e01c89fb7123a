//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Could not read .env file: {0}")]
    DotEnv(#[from] dotenvy::Error),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Secret {0} must be at least 32 bytes in production")]
    SecretTooShort(&'static str),

    #[error("Access and refresh secrets must differ")]
    SecretsMustDiffer,

    #[error("Token lifetime must be positive: {0}")]
    InvalidTokenTtl(&'static str),

    #[error("Mailbox capacity must be positive")]
    InvalidMailboxCapacity,

    #[error("Broadcast buffer must be positive")]
    InvalidBroadcastBuffer,

    #[error("Pong wait must be between 2 and 3600 seconds")]
    InvalidPongWait,

    #[error("Write wait must be between 1 and 3600 seconds")]
    InvalidWriteWait,

    #[error("Max message size must be positive")]
    InvalidMaxMessageSize,
}
