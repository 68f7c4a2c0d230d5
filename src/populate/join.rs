//! Join descriptors
//!
//! The wire shape of a join stage handed to the driver. Callers may
//! also supply a fully custom descriptor, which passes through the
//! planner unchanged.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A populate request entry: a relation path or a custom join.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum PopulateItem {
    /// Dot-path of a model-reference field
    Path(String),
    /// Custom join descriptor, passed through unchanged
    Join(JoinSpec),
}

impl From<&str> for PopulateItem {
    fn from(path: &str) -> Self {
        Self::Path(path.to_string())
    }
}

/// A join descriptor in the external interface shape
/// `{as, from, localField|let, foreignField|pipeline}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JoinSpec {
    /// Foreign collection
    pub from: String,
    /// Output field the matches land in
    #[serde(rename = "as")]
    pub as_field: String,
    /// Local key path (equality join)
    #[serde(rename = "localField", skip_serializing_if = "Option::is_none")]
    pub local_field: Option<String>,
    /// Foreign key path (equality join)
    #[serde(rename = "foreignField", skip_serializing_if = "Option::is_none")]
    pub foreign_field: Option<String>,
    /// Variable bindings for a pipeline join
    #[serde(rename = "let", skip_serializing_if = "Option::is_none")]
    pub let_vars: Option<Value>,
    /// Sub-pipeline for a pipeline join
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<Value>,
}

/// Unwrap instructions for a planner-expanded join.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JoinTarget {
    /// Normalized path of the reference field being populated
    pub path: String,
    /// Whether the relation is to-one (unwrap the one-element array)
    pub to_one: bool,
}

/// One planned join: the driver descriptor plus, for expanded paths,
/// the unwrap target. Custom descriptors carry no target and are left
/// alone after the driver call.
#[derive(Debug, Clone, PartialEq)]
pub struct JoinStage {
    /// Descriptor handed to the driver
    pub spec: JoinSpec,
    /// Unwrap target for planner-expanded joins
    pub target: Option<JoinTarget>,
}
