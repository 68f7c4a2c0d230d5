//! # Hook Errors
//!
//! A hook failure carries the hook's own message text, unchanged.

use thiserror::Error;

/// Result type for hook execution
pub type HookResult<T> = Result<T, HookError>;

/// Hook pipeline errors
#[derive(Debug, Clone, Error)]
pub enum HookError {
    /// A callback reported failure; the message is surfaced verbatim
    #[error("{0}")]
    Failed(String),
}

impl HookError {
    /// Create a failure from a hook's message.
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }

    /// Get the error code for logging
    pub fn code(&self) -> &'static str {
        match self {
            Self::Failed(_) => "DOC_HOOK_FAILED",
        }
    }
}
