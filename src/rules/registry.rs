//! Rule registry
//!
//! Name-keyed store of rule descriptors. Constructed once per process
//! (or per test), consulted by the schema compiler at model-definition
//! time. Registration is last-writer-wins, which is how a caller
//! overrides a built-in message or predicate.

use std::collections::HashMap;
use std::sync::Arc;

use super::builtin;
use super::descriptor::RuleDescriptor;
use super::errors::{RuleError, RuleResult};

/// Name → rule descriptor table.
#[derive(Debug, Clone)]
pub struct RuleRegistry {
    rules: HashMap<String, Arc<RuleDescriptor>>,
}

impl RuleRegistry {
    /// Create a registry preloaded with the built-in rule set.
    pub fn new() -> Self {
        let mut registry = Self::empty();
        for descriptor in builtin::all() {
            registry.register(descriptor);
        }
        registry
    }

    /// Create a registry with no rules at all.
    pub fn empty() -> Self {
        Self {
            rules: HashMap::new(),
        }
    }

    /// Register a rule under its descriptor name (replaces any existing
    /// rule of the same name).
    pub fn register(&mut self, descriptor: RuleDescriptor) {
        self.rules
            .insert(descriptor.name.clone(), Arc::new(descriptor));
    }

    /// Resolve a rule by name.
    pub fn resolve(&self, name: &str) -> RuleResult<Arc<RuleDescriptor>> {
        self.rules
            .get(name)
            .cloned()
            .ok_or_else(|| RuleError::UnknownRule(name.to_string()))
    }

    /// Whether a rule with this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.rules.contains_key(name)
    }

    /// Number of registered rules.
    pub fn len(&self) -> usize {
        self.rules.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

impl Default for RuleRegistry {
    fn default() -> Self {
        Self::new()
    }
}
