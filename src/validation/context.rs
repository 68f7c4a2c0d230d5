//! Validation context
//!
//! Ephemeral per-call state: the operation kind, the active write
//! blacklist (normalized, index-free), and the timestamp opt-out.
//! Constructed fresh for every call and discarded afterwards.

use std::collections::HashSet;

use crate::model::Model;
use crate::paths;

/// The write operation being validated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    /// New document
    Insert,
    /// Partial update of an existing document
    Update,
}

impl Action {
    /// Returns the operation name
    pub fn name(&self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
        }
    }
}

/// Per-call validation state.
#[derive(Debug, Clone)]
pub struct ValidationContext {
    /// The operation being validated
    pub action: Action,
    /// Active blacklist, normalized (indices stripped; negations are
    /// dropped, negation is a read-side concept)
    pub blacklist: HashSet<String>,
    /// Whether injected timestamp fields recompute on this call
    pub timestamps: bool,
}

impl ValidationContext {
    /// Build a context from an explicit blacklist.
    pub fn new<I, S>(action: Action, blacklist: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let blacklist = blacklist
            .into_iter()
            .filter(|entry| !entry.as_ref().starts_with('-'))
            .map(|entry| paths::strip_indices(entry.as_ref()))
            .filter(|entry| !entry.is_empty())
            .collect();
        Self {
            action,
            blacklist,
            timestamps: true,
        }
    }

    /// Build a context from a model's current blacklist for `action`.
    /// The blacklist is read fresh here, on every call.
    pub fn for_model(model: &Model, action: Action) -> Self {
        let list = match action {
            Action::Insert => model.insert_blacklist(),
            Action::Update => model.update_blacklist(),
        };
        Self::new(action, list)
    }

    /// Disable (or re-enable) timestamp recomputation for this call.
    pub fn with_timestamps(mut self, enabled: bool) -> Self {
        self.timestamps = enabled;
        self
    }

    /// Whether defaults for absent fields apply.
    pub fn insert_mode(&self) -> bool {
        self.action == Action::Insert
    }

    /// Whether a normalized path is blacklisted.
    pub fn is_blacklisted(&self, path: &str) -> bool {
        self.blacklist.contains(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blacklist_is_normalized() {
        let ctx = ValidationContext::new(Action::Insert, ["pets.0.age", "-dog", "animals.cat"]);
        assert!(ctx.is_blacklisted("pets.age"));
        assert!(ctx.is_blacklisted("animals.cat"));
        assert!(!ctx.is_blacklisted("dog"));
    }

    #[test]
    fn test_insert_mode() {
        assert!(ValidationContext::new(Action::Insert, Vec::<String>::new()).insert_mode());
        assert!(!ValidationContext::new(Action::Update, Vec::<String>::new()).insert_mode());
    }
}
