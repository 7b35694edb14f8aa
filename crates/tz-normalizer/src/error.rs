//! Error types for normalization.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum NormalizeError {
    /// Malformed or inconsistent caller input (unparseable time, end before start).
    #[error("Validation error: {0}")]
    Validation(String),

    /// Unresolvable timezone or missing credential.
    #[error("Configuration error: {0}")]
    Configuration(String),
}

pub type Result<T> = std::result::Result<T, NormalizeError>;
