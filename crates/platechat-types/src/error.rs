use thiserror::Error;

/// Errors raised while validating an inbound chat request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// The body was absent, not JSON, or not a non-empty object.
    #[error("request body is empty or not a JSON object")]
    InvalidBody,

    #[error("message is required")]
    MissingMessage,

    #[error("message must be a string")]
    MessageNotString,

    #[error("message must be at most {max} characters (got {actual})")]
    MessageTooLong { max: usize, actual: usize },

    #[error("invalid context: {0}")]
    InvalidContext(String),

    #[error("session_id must be a non-empty string")]
    InvalidSessionId,
}

impl ValidationError {
    /// Stable machine-readable code for this error.
    pub fn code(&self) -> &'static str {
        match self {
            ValidationError::InvalidBody => "INVALID_REQUEST",
            _ => "VALIDATION_ERROR",
        }
    }
}

/// Errors from loading or validating gateway configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {message}")]
    Read { path: String, message: String },

    #[error("failed to parse config file {path}: {message}")]
    Parse { path: String, message: String },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}
