//! Error types for the Perimeter SDK

use thiserror::Error;

/// Result type alias using the Perimeter Error
pub type Result<T> = std::result::Result<T, Error>;

/// Perimeter SDK error types
#[derive(Error, Debug)]
pub enum Error {
    #[error("missing required field: {field}")]
    MissingRequiredField { field: String },

    #[error("schema mismatch at {field}: {detail}")]
    SchemaMismatch { field: String, detail: String },

    #[error("operation failed: {message}")]
    OperationFailed { message: String },

    #[error("invalid port range \"{input}\": {reason}")]
    InvalidPortRange { input: String, reason: String },

    #[error("invalid port policy: {0}")]
    InvalidPolicy(String),

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    pub fn missing_field(field: impl Into<String>) -> Self {
        Error::MissingRequiredField {
            field: field.into(),
        }
    }

    pub fn mismatch(field: impl Into<String>, detail: impl Into<String>) -> Self {
        Error::SchemaMismatch {
            field: field.into(),
            detail: detail.into(),
        }
    }

    pub fn operation(message: impl Into<String>) -> Self {
        Error::OperationFailed {
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}
