//! Common error types for FTA

use thiserror::Error;

/// Common result type for FTA operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types across FTA crates
#[derive(Error, Debug)]
pub enum Error {
    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),
}
