//! Error types for wordlink-core.

use thiserror::Error;

use crate::types::CategoryChoice;

/// A category name that is not part of the fixed enumeration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown category: {0}")]
pub struct CategoryParseError(pub String);

/// Reasons a session refuses to start.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("no playable questions for category {0}")]
    NoQuestions(CategoryChoice),

    #[error("a quiz is already in progress")]
    InProgress,
}

/// User input rejected before it reaches the backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("player name must be at least {min} characters long")]
    PlayerNameTooShort { min: usize },

    #[error("invalid question: {}", .0.join("; "))]
    InvalidQuestion(Vec<String>),
}
