//! Common error types for FinKnows

use thiserror::Error;

/// Common result type for FinKnows operations
pub type Result<T> = std::result::Result<T, Error>;

/// Common error types shared by the service and its tools
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation error (wraps std::io::Error)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration loading or validation error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Invalid user input or request parameter
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Value could not be parsed from its textual form
    #[error("Parse error: {0}")]
    Parse(String),
}
