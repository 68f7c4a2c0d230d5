//! Exclusion projections
//!
//! The working blacklist set after directive processing, and its
//! rendering as a store exclusion projection (`{path: 0, ...}`).
//!
//! Directives apply strictly left-to-right. A plain entry adds its path
//! to the set (re-adding an existing path keeps its position); a
//! negated entry removes its exact path only, so descendants that were
//! excluded independently stay excluded.

use serde_json::{Map, Value};

use crate::paths;

use super::directive::Directive;

/// The resolved exclusion set, insertion-ordered.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Projection {
    excluded: Vec<String>,
}

impl Projection {
    /// Process directives left-to-right into a projection.
    pub fn from_directives<I>(directives: I) -> Self
    where
        I: IntoIterator<Item = Directive>,
    {
        let mut excluded: Vec<String> = Vec::new();
        for directive in directives {
            if directive.negated {
                // Whitelist the exact path, nothing else.
                excluded.retain(|path| *path != directive.path);
            } else if !excluded.contains(&directive.path) {
                excluded.push(directive.path);
            }
        }
        Self { excluded }
    }

    /// The raw excluded paths, in insertion order.
    pub fn paths(&self) -> &[String] {
        &self.excluded
    }

    /// Whether no paths are excluded.
    pub fn is_empty(&self) -> bool {
        self.excluded.is_empty()
    }

    /// Effective visibility test: a path is excluded when it or any of
    /// its ancestors is in the set. Indices are stripped before
    /// matching.
    pub fn is_excluded(&self, path: &str) -> bool {
        let normalized = paths::strip_indices(path);
        self.excluded
            .iter()
            .any(|entry| paths::is_self_or_descendant(&normalized, entry))
    }

    /// Excluded paths with redundant children collapsed into their
    /// ancestors. A store rejects a projection carrying both a field
    /// and its parent; dropping the child changes nothing about the
    /// effective visibility.
    pub fn normalized_paths(&self) -> Vec<String> {
        self.excluded
            .iter()
            .filter(|path| {
                !self
                    .excluded
                    .iter()
                    .any(|other| paths::is_ancestor(other, path))
            })
            .cloned()
            .collect()
    }

    /// Render as a store exclusion projection: `path -> 0`.
    pub fn to_exclusion_map(&self) -> Map<String, Value> {
        self.normalized_paths()
            .into_iter()
            .map(|path| (path, Value::from(0)))
            .collect()
    }
}
