//! Error types for collocation operations.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum CollocationError {
    #[error("Invalid window: {0}")]
    InvalidWindow(String),

    #[error("Ambiguous timezone: {0}")]
    AmbiguousTimezone(String),

    #[error("Missing flag column: {0}")]
    MissingFlagColumn(String),

    #[error("Length mismatch: {0}")]
    LengthMismatch(String),

    #[error("Duplicate column: {0}")]
    DuplicateColumn(String),
}

pub type Result<T> = std::result::Result<T, CollocationError>;
