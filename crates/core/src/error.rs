//! Error types for kbsearch
//!
//! This module defines all error types used throughout the system.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.
//!
//! Malformed input (blank queries, blank keywords) is never an error: it is
//! normalized away before it reaches any of these paths.

use crate::types::EntryId;
use std::io;
use thiserror::Error;

/// Result type alias for kbsearch operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for kbsearch
#[derive(Debug, Error)]
pub enum Error {
    /// Entry absent from the backing document store
    #[error("Entry not found: {0}")]
    EntryNotFound(EntryId),

    /// Backend failure reported by a document store implementation
    #[error("Store error: {0}")]
    StoreError(String),

    /// Configuration could not be validated
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error (config file operations)
    #[error("I/O error: {0}")]
    IoError(#[from] io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl Error {
    /// Whether this error means "no such entry"
    ///
    /// The search pipeline uses this to drop candidates whose entry has
    /// disappeared from the store instead of failing the whole query.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::EntryNotFound(_))
    }

    /// Create a store error from any displayable cause
    pub fn store(msg: impl Into<String>) -> Self {
        Error::StoreError(msg.into())
    }

    /// Create a configuration error
    pub fn invalid_config(msg: impl Into<String>) -> Self {
        Error::InvalidConfig(msg.into())
    }
}

impl From<toml::de::Error> for Error {
    fn from(e: toml::de::Error) -> Self {
        Error::SerializationError(e.to_string())
    }
}

impl From<toml::ser::Error> for Error {
    fn from(e: toml::ser::Error) -> Self {
        Error::SerializationError(e.to_string())
    }
}
