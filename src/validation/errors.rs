//! Validation errors
//!
//! Rule failures are returned to the caller as an ordered list of
//! structured errors in the wire shape `{status, title, detail, meta}`.
//! They are data, not exceptions.

use std::fmt;

use serde::Serialize;

/// Context for one rule failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ErrorMeta {
    /// Rule that failed
    pub rule: String,
    /// Model being validated
    pub model: String,
    /// Leaf field name
    pub field: String,
}

/// One rule failure.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationError {
    /// Always `"400"`
    pub status: String,
    /// Dotted path of the failed field, including array indices
    pub title: String,
    /// Failure message
    pub detail: String,
    /// Rule/model/field context
    pub meta: ErrorMeta,
}

impl ValidationError {
    /// Create a failure for a `(path, rule)` pair.
    pub fn new(
        title: impl Into<String>,
        detail: impl Into<String>,
        rule: impl Into<String>,
        model: impl Into<String>,
        field: impl Into<String>,
    ) -> Self {
        Self {
            status: "400".to_string(),
            title: title.into(),
            detail: detail.into(),
            meta: ErrorMeta {
                rule: rule.into(),
                model: model.into(),
                field: field.into(),
            },
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}.{}]: {}",
            self.title, self.meta.model, self.meta.rule, self.detail
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serializes_to_wire_shape() {
        let err = ValidationError::new("pets.0.age", "Value was not a number.", "isNumber", "user", "age");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["status"], "400");
        assert_eq!(json["title"], "pets.0.age");
        assert_eq!(json["detail"], "Value was not a number.");
        assert_eq!(json["meta"]["rule"], "isNumber");
        assert_eq!(json["meta"]["model"], "user");
        assert_eq!(json["meta"]["field"], "age");
    }
}
