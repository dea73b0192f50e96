//! Preference store error types.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum PrefsError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid value for {key}: {value}")]
    InvalidValue { key: String, value: String },
}
