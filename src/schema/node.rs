//! Compiled field tree
//!
//! The compiler lowers a raw nested declaration into a tree of
//! `FieldNode`s. Leaves carry resolved rules; composites carry their own
//! node-level rules plus either named children (object) or a single
//! element template (array). The tree is immutable after compilation.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

use crate::rules::RuleDescriptor;

/// Declared field types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    /// UTF-8 string
    String,
    /// 64-bit float
    Number,
    /// 64-bit signed integer
    Integer,
    /// Boolean
    Boolean,
    /// Epoch milliseconds (RFC 3339 strings are coerced)
    Date,
    /// Document identifier
    Id,
    /// Nested subdocument
    Object,
    /// Repeated sub-schema
    Array,
}

impl FieldType {
    /// Parse a declared type name.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "integer" => Some(Self::Integer),
            "boolean" => Some(Self::Boolean),
            "date" => Some(Self::Date),
            "id" => Some(Self::Id),
            "object" => Some(Self::Object),
            "array" => Some(Self::Array),
            _ => None,
        }
    }

    /// Returns the type name for diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Integer => "integer",
            Self::Boolean => "boolean",
            Self::Date => "date",
            Self::Id => "id",
            Self::Object => "object",
            Self::Array => "array",
        }
    }

    /// Name of the synthesized `is<Type>` rule for this type.
    pub fn rule_name(&self) -> &'static str {
        match self {
            Self::String => "isString",
            Self::Number => "isNumber",
            Self::Integer => "isInteger",
            Self::Boolean => "isBoolean",
            Self::Date => "isDate",
            Self::Id => "isId",
            Self::Object => "isObject",
            Self::Array => "isArray",
        }
    }
}

/// A declared default: a fixed value or a thunk evaluated per call.
#[derive(Clone)]
pub enum DefaultValue {
    /// Literal default from the declaration
    Fixed(Value),
    /// Computed default (timestamps, generated ids)
    Computed(Arc<dyn Fn() -> Value + Send + Sync>),
}

impl DefaultValue {
    /// Produce the default value, invoking the thunk if present.
    pub fn resolve(&self) -> Value {
        match self {
            Self::Fixed(v) => v.clone(),
            Self::Computed(f) => f(),
        }
    }
}

impl fmt::Debug for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(v) => f.debug_tuple("Fixed").field(v).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// A rule resolved at compile time: descriptor reference plus argument.
#[derive(Debug, Clone)]
pub struct CompiledRule {
    /// Rule name as declared
    pub name: String,
    /// Declared argument (`true` for argless rules)
    pub arg: Value,
    /// Resolved descriptor
    pub descriptor: Arc<RuleDescriptor>,
}

/// An index requested by a declaration, collected for the driver.
#[derive(Debug, Clone)]
pub struct IndexSpec {
    /// Dotted path of the indexed field
    pub path: String,
    /// The declared index argument, passed through unchanged
    pub spec: Value,
}

/// Node shape: leaf, object with named children, or array with one
/// element template.
#[derive(Debug, Clone)]
pub enum FieldKind {
    /// Scalar field
    Leaf,
    /// Subdocument with named children in declaration order
    Object {
        /// Child fields, declaration order
        children: Vec<FieldNode>,
    },
    /// Repeated sub-schema
    Array {
        /// The single element template
        element: Box<FieldNode>,
    },
}

/// One compiled schema unit.
#[derive(Debug, Clone)]
pub struct FieldNode {
    /// Field name (empty for the root)
    pub name: String,
    /// Normalized dotted path from the root (no array indices)
    pub path: String,
    /// Declared (or corrected) type
    pub field_type: FieldType,
    /// Resolved rules: the synthesized type rule first, then declared
    /// rules in declaration order
    pub rules: Vec<CompiledRule>,
    /// Declared default, if any
    pub default: Option<DefaultValue>,
    /// Apply the default on every write, not only inserting absences
    pub default_override: bool,
    /// Writable on insert only
    pub insert_only: bool,
    /// Never persisted
    pub virtual_field: bool,
    /// Injected timestamp field (subject to the per-call opt-out)
    pub timestamp: bool,
    /// Name of the referenced model, for population
    pub model_ref: Option<String>,
    /// Node shape
    pub kind: FieldKind,
}

impl FieldNode {
    /// Create a bare leaf node.
    pub fn leaf(name: impl Into<String>, path: impl Into<String>, field_type: FieldType) -> Self {
        Self {
            name: name.into(),
            path: path.into(),
            field_type,
            rules: Vec::new(),
            default: None,
            default_override: false,
            insert_only: false,
            virtual_field: false,
            timestamp: false,
            model_ref: None,
            kind: FieldKind::Leaf,
        }
    }

    /// Whether this node is a composite (object or array).
    pub fn is_composite(&self) -> bool {
        !matches!(self.kind, FieldKind::Leaf)
    }

    /// Named children for object nodes, empty otherwise.
    pub fn children(&self) -> &[FieldNode] {
        match &self.kind {
            FieldKind::Object { children } => children,
            _ => &[],
        }
    }

    /// The declared rule with the given name, if present.
    pub fn rule(&self, name: &str) -> Option<&CompiledRule> {
        self.rules.iter().find(|r| r.name == name)
    }

    /// Whether this field declares the given rule.
    pub fn has_rule(&self, name: &str) -> bool {
        self.rule(name).is_some()
    }

    /// Resolve a normalized dotted path (numeric segments already
    /// stripped) to a node in this subtree.
    pub fn descend(&self, path: &str) -> Option<&FieldNode> {
        if path.is_empty() {
            return Some(self);
        }
        let mut node = self;
        for segment in path.split('.') {
            node = node.step(segment)?;
        }
        Some(node)
    }

    // A path segment addresses an object child directly; array nodes are
    // transparent, the segment applies to their element template.
    fn step(&self, segment: &str) -> Option<&FieldNode> {
        match &self.kind {
            FieldKind::Object { children } => children.iter().find(|c| c.name == segment),
            FieldKind::Array { element } => element.step(segment),
            FieldKind::Leaf => None,
        }
    }

    /// Names of the root-level fields (used for whitelist computation).
    pub fn top_level_names(&self) -> Vec<String> {
        self.children().iter().map(|c| c.name.clone()).collect()
    }
}
