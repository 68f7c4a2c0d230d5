//! # Operation Errors
//!
//! Unified error type for the operations layer. Validation failures
//! carry the full structured error list; hook and driver failures pass
//! through unchanged.

use thiserror::Error;

use crate::driver::DriverError;
use crate::hooks::HookError;
use crate::validation::ValidationError;

/// Result type for operations
pub type OpResult<T> = Result<T, OpError>;

/// Operation errors
#[derive(Debug, Error)]
pub enum OpError {
    /// One or more rules failed; the write was not attempted
    #[error("Validation failed with {} error(s)", .0.len())]
    Validation(Vec<ValidationError>),

    /// A hook aborted the operation
    #[error(transparent)]
    Hook(#[from] HookError),

    /// The driver call failed
    #[error(transparent)]
    Driver(#[from] DriverError),
}

impl OpError {
    /// The validation errors, when this is a validation failure.
    pub fn validation_errors(&self) -> Option<&[ValidationError]> {
        match self {
            Self::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}
