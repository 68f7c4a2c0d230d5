//! Visibility resolver for docmap
//!
//! Merges layered blacklist/whitelist directives into one deterministic
//! exclusion projection (see VISIBILITY.md). Directive layers
//! concatenate in a fixed precedence order: referenced-model blacklists
//! (deepest first), then the model's own static blacklist, then the
//! call's dynamic override. Processing is strictly left-to-right, so a
//! later directive can re-exclude a path an earlier one whitelisted.
//! Order sensitivity is the point, not an accident.

mod directive;
mod projection;
mod resolver;

pub use directive::Directive;
pub use projection::Projection;
pub use resolver::VisibilityResolver;
