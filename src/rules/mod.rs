//! Rule registry for docmap
//!
//! A rule is a named predicate with an optional pre-check coercion
//! (`tryParse`) and a failure message. The schema compiler resolves every
//! rule name once, at compile time, into a direct descriptor reference
//! stored on the field tree; unknown names are a compile-time diagnostic,
//! never a silent pass at validation time.
//!
//! # Design principles
//!
//! - Predicates are exact: the only coercion is the declared `tryParse`
//! - `tryParse` is idempotent (parsing a parsed value is a no-op)
//! - A predicate error carries its message verbatim to the caller

mod builtin;
mod descriptor;
mod errors;
mod registry;

pub use descriptor::{
    PredicateFn, PredicateResult, RuleContext, RuleDescriptor, RuleMessage, TryParseFn,
};
pub use errors::{RuleError, RuleResult};
pub use registry::RuleRegistry;
