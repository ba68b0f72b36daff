//! Error types for the medconcept library.
//!
//! All fallible operations return [`Result`], whose error type is the
//! [`ConceptError`] enum.
//!
//! # Examples
//!
//! ```
//! use medconcept::error::{ConceptError, Result};
//!
//! fn load() -> Result<()> {
//!     Err(ConceptError::dictionary("line 3: expected three fields"))
//! }
//!
//! match load() {
//!     Ok(_) => println!("Loaded"),
//!     Err(e) => eprintln!("Error: {}", e),
//! }
//! ```

use std::io;

use thiserror::Error;

/// The main error type for medconcept operations.
#[derive(Error, Debug)]
pub enum ConceptError {
    /// I/O errors (dictionary files, protocol streams)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Malformed concept dictionary or UMLS table content
    #[error("Dictionary error: {0}")]
    Dictionary(String),

    /// Malformed batch protocol traffic
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// A required file does not exist
    #[error("File not found: {0}")]
    NotFound(String),

    /// JSON serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error for other cases
    #[error("Error: {0}")]
    Other(String),

    /// Generic anyhow error
    #[error("Anyhow error: {0}")]
    Anyhow(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with ConceptError.
pub type Result<T> = std::result::Result<T, ConceptError>;

impl ConceptError {
    /// Create a new dictionary error.
    pub fn dictionary<S: Into<String>>(msg: S) -> Self {
        ConceptError::Dictionary(msg.into())
    }

    /// Create a new protocol error.
    pub fn protocol<S: Into<String>>(msg: S) -> Self {
        ConceptError::Protocol(msg.into())
    }

    /// Create a new configuration error.
    pub fn config<S: Into<String>>(msg: S) -> Self {
        ConceptError::Config(msg.into())
    }

    /// Create a new not found error.
    pub fn not_found<S: Into<String>>(msg: S) -> Self {
        ConceptError::NotFound(msg.into())
    }

    /// Create a new generic error.
    pub fn other<S: Into<String>>(msg: S) -> Self {
        ConceptError::Other(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_construction() {
        let error = ConceptError::dictionary("line 1: missing term");
        assert_eq!(error.to_string(), "Dictionary error: line 1: missing term");

        let error = ConceptError::not_found("meddict");
        assert_eq!(error.to_string(), "File not found: meddict");

        let error = ConceptError::protocol("invalid method");
        assert_eq!(error.to_string(), "Protocol error: invalid method");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = io::Error::new(io::ErrorKind::NotFound, "File not found");
        let error = ConceptError::from(io_error);

        match error {
            ConceptError::Io(_) => {} // Expected
            _ => panic!("Expected IO error variant"),
        }
    }
}
