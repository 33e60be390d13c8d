//! Error types shared across the kvdb workspace.

use thiserror::Error;

/// Errors raised outside the storage engine itself.
#[derive(Debug, Error)]
pub enum KvdbError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid input error
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
