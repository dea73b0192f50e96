//! Errors from talking to the backend.

use wordlink_core::ValidationError;

/// Backend client errors.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend error: {status} - {message}")]
    Backend { status: u16, message: String },

    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Not authenticated - please log in first")]
    NotAuthenticated,

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl From<ValidationError> for ApiError {
    fn from(e: ValidationError) -> Self {
        match e {
            ValidationError::InvalidQuestion(messages) => Self::Validation(messages),
            other => Self::Validation(vec![other.to_string()]),
        }
    }
}
