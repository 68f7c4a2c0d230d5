//! Schema compile diagnostics
//!
//! Compile problems are non-fatal by design: the offending field is
//! corrected to a safe shape, the diagnostic is logged, and compilation
//! continues. Codes are catalogued in ERRORS.md.

use std::fmt;

use crate::observability::Logger;

/// Compile diagnostic codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompileCode {
    /// Field declared without a type (corrected to `string`)
    MissingType,
    /// Field declared with a type that has no `is<Type>` rule (corrected
    /// to `string`)
    UnknownType,
    /// Rule name not present in the registry (rule stripped)
    UnknownRule,
    /// Declaration shape not recognized (field corrected or dropped)
    InvalidDeclaration,
}

impl CompileCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingType => "DOC_SCHEMA_MISSING_TYPE",
            Self::UnknownType => "DOC_SCHEMA_UNKNOWN_TYPE",
            Self::UnknownRule => "DOC_SCHEMA_UNKNOWN_RULE",
            Self::InvalidDeclaration => "DOC_SCHEMA_INVALID_DECLARATION",
        }
    }
}

impl fmt::Display for CompileCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A single compile diagnostic with its field context.
#[derive(Debug, Clone)]
pub struct CompileDiagnostic {
    /// Diagnostic code
    pub code: CompileCode,
    /// Model being compiled
    pub model: String,
    /// Dotted path of the offending field
    pub path: String,
    /// Human-readable detail
    pub detail: String,
}

impl CompileDiagnostic {
    /// Create a diagnostic and log it at WARN.
    pub fn emit(
        code: CompileCode,
        model: impl Into<String>,
        path: impl Into<String>,
        detail: impl Into<String>,
    ) -> Self {
        let diagnostic = Self {
            code,
            model: model.into(),
            path: path.into(),
            detail: detail.into(),
        };
        Logger::warn(
            diagnostic.code.code(),
            &[
                ("detail", diagnostic.detail.as_str()),
                ("model", diagnostic.model.as_str()),
                ("path", diagnostic.path.as_str()),
            ],
        );
        diagnostic
    }
}

impl fmt::Display for CompileDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}.{}: {}",
            self.code, self.model, self.path, self.detail
        )
    }
}
