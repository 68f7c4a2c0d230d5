//! # Rule Errors
//!
//! Error types for rule registration and resolution.

use thiserror::Error;

/// Result type for rule operations
pub type RuleResult<T> = Result<T, RuleError>;

/// Rule registry errors
#[derive(Debug, Clone, Error)]
pub enum RuleError {
    /// Rule name not present in the registry
    #[error("Unknown rule '{0}'")]
    UnknownRule(String),
}

impl RuleError {
    /// Get the error code for logging
    pub fn code(&self) -> &'static str {
        match self {
            Self::UnknownRule(_) => "DOC_UNKNOWN_RULE",
        }
    }
}
