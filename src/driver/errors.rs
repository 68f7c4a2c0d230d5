//! # Driver Errors
//!
//! Error types for the persistence contract.

use thiserror::Error;

/// Result type for driver operations
pub type DriverResult<T> = Result<T, DriverError>;

/// Persistence errors surfaced by a driver
#[derive(Debug, Clone, Error)]
pub enum DriverError {
    /// The named collection does not exist
    #[error("Collection '{0}' not found")]
    CollectionNotFound(String),

    /// The driver rejected a malformed query
    #[error("Bad query: {0}")]
    BadQuery(String),

    /// Backend failure
    #[error("Storage error: {0}")]
    Storage(String),
}

impl DriverError {
    /// Get the error code for logging
    pub fn code(&self) -> &'static str {
        match self {
            Self::CollectionNotFound(_) => "DOC_DRIVER_COLLECTION_NOT_FOUND",
            Self::BadQuery(_) => "DOC_DRIVER_BAD_QUERY",
            Self::Storage(_) => "DOC_DRIVER_STORAGE",
        }
    }
}
