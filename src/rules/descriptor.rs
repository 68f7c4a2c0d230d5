//! Rule descriptors
//!
//! A descriptor bundles everything the validation engine needs to apply
//! one rule: the predicate, the optional value coercion that runs before
//! it, the failure message, and the empty-string exemption flag.

use std::fmt;
use std::sync::Arc;

use serde_json::Value;

/// Outcome of a predicate: `Ok(false)` is a plain rule failure,
/// `Err(message)` is a rule failure whose message text is surfaced
/// verbatim (used when a rule is given an argument of the wrong type).
pub type PredicateResult = Result<bool, String>;

/// Predicate function: `(value, arg, context) -> PredicateResult`
pub type PredicateFn = Arc<dyn Fn(&Value, &Value, &RuleContext<'_>) -> PredicateResult + Send + Sync>;

/// Coercion applied to the value before the predicate runs.
///
/// Returns `Some(coerced)` when the value was parsed, `None` to leave it
/// untouched. Must be idempotent: parsing an already-parsed value is a
/// no-op.
pub type TryParseFn = Arc<dyn Fn(&Value) -> Option<Value> + Send + Sync>;

/// Call-site information handed to predicates.
#[derive(Debug, Clone, Copy)]
pub struct RuleContext<'a> {
    /// Model being validated
    pub model: &'a str,
    /// Leaf field name
    pub field: &'a str,
    /// Normalized dotted path of the field
    pub path: &'a str,
    /// Whether the surrounding operation is an insert
    pub insert: bool,
}

/// Failure message for a rule: a fixed string or a formatter over
/// `(value, arg)`.
#[derive(Clone)]
pub enum RuleMessage {
    /// Fixed message text
    Fixed(String),
    /// Message computed from the offending value and the rule argument
    Formatter(Arc<dyn Fn(&Value, &Value) -> String + Send + Sync>),
}

impl RuleMessage {
    /// Create a fixed message
    pub fn fixed(text: impl Into<String>) -> Self {
        Self::Fixed(text.into())
    }

    /// Render the message for a failed value/argument pair
    pub fn render(&self, value: &Value, arg: &Value) -> String {
        match self {
            Self::Fixed(text) => text.clone(),
            Self::Formatter(f) => f(value, arg),
        }
    }
}

impl fmt::Debug for RuleMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(text) => f.debug_tuple("Fixed").field(text).finish(),
            Self::Formatter(_) => f.write_str("Formatter(..)"),
        }
    }
}

/// A registered rule.
#[derive(Clone)]
pub struct RuleDescriptor {
    /// Registered name (e.g. `required`, `isString`, `min`)
    pub name: String,
    /// The rule predicate
    pub predicate: PredicateFn,
    /// Optional coercion applied once before the predicate
    pub try_parse: Option<TryParseFn>,
    /// Failure message
    pub message: RuleMessage,
    /// Treat an empty string as valid without running the predicate
    pub ignore_empty_string: bool,
}

impl RuleDescriptor {
    /// Create a descriptor with no coercion and a fixed message.
    pub fn new(
        name: impl Into<String>,
        predicate: impl Fn(&Value, &Value, &RuleContext<'_>) -> PredicateResult + Send + Sync + 'static,
        message: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            predicate: Arc::new(predicate),
            try_parse: None,
            message: RuleMessage::fixed(message),
            ignore_empty_string: false,
        }
    }

    /// Attach a `tryParse` coercion.
    pub fn with_try_parse(
        mut self,
        parse: impl Fn(&Value) -> Option<Value> + Send + Sync + 'static,
    ) -> Self {
        self.try_parse = Some(Arc::new(parse));
        self
    }

    /// Replace the fixed message with a formatter.
    pub fn with_formatter(
        mut self,
        formatter: impl Fn(&Value, &Value) -> String + Send + Sync + 'static,
    ) -> Self {
        self.message = RuleMessage::Formatter(Arc::new(formatter));
        self
    }

    /// Mark empty strings as exempt from this rule.
    pub fn ignoring_empty_string(mut self) -> Self {
        self.ignore_empty_string = true;
        self
    }

    /// Apply the coercion, returning the (possibly) parsed value.
    pub fn parse(&self, value: &Value) -> Option<Value> {
        self.try_parse.as_ref().and_then(|p| p(value))
    }
}

// Descriptor holds closures; only the name and flags are printable.
impl fmt::Debug for RuleDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuleDescriptor")
            .field("name", &self.name)
            .field("has_try_parse", &self.try_parse.is_some())
            .field("ignore_empty_string", &self.ignore_empty_string)
            .finish()
    }
}
