use thiserror::Error;

use crate::greeting::MAX_NAME_LENGTH;

#[derive(Error, Debug)]
pub enum HelloError {
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Serialization error: {0}")]
    Serialization(#[from] SerializationError),

    #[error("Generic error: {0}")]
    Generic(#[from] anyhow::Error),
}

/// Business-rule failures of name validation. This set is closed.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("name exceeds maximum length")]
    TooLong,

    #[error("name contains invalid characters")]
    InvalidCharacters,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Failed to load configuration from {origin}: {error}")]
    LoadFailed {
        origin: String,
        #[source]
        error: Box<dyn std::error::Error + Send + Sync>,
    },
}

#[derive(Error, Debug)]
pub enum SerializationError {
    #[error("JSON serialization failed: {reason}")]
    Json { reason: String },

    #[error("YAML serialization failed: {reason}")]
    Yaml { reason: String },
}

pub type Result<T> = std::result::Result<T, HelloError>;

impl From<serde_json::Error> for HelloError {
    fn from(err: serde_json::Error) -> Self {
        HelloError::Serialization(SerializationError::Json {
            reason: err.to_string(),
        })
    }
}

impl From<serde_yaml::Error> for HelloError {
    fn from(err: serde_yaml::Error) -> Self {
        HelloError::Serialization(SerializationError::Yaml {
            reason: err.to_string(),
        })
    }
}

impl HelloError {
    /// HTTP status the error maps to at the handler boundary.
    pub fn status_code(&self) -> u16 {
        match self {
            HelloError::Validation(_) => 400,
            _ => 500,
        }
    }

    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status_code())
    }

    /// Message safe to return to the caller. Anything outside the validation
    /// set collapses to a generic message.
    pub fn client_message(&self) -> String {
        match self {
            HelloError::Validation(err @ ValidationError::TooLong) => {
                format!("{err}. Maximum {MAX_NAME_LENGTH} characters allowed.")
            }
            HelloError::Validation(err @ ValidationError::InvalidCharacters) => format!(
                "{err}. Only letters, numbers, spaces, hyphens, and apostrophes are allowed."
            ),
            _ => "Internal server error".to_string(),
        }
    }
}
