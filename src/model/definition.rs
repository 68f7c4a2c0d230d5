//! Model definitions
//!
//! The caller-facing description of a model: the raw field declaration
//! plus blacklists, custom messages, hooks, and configuration. Consumed
//! once by `ModelRegistry::define`.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use crate::hooks::{Hook, HookPoint, HookSet};

/// Model-level configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Inject `createdAt`/`updatedAt` fields (default: true)
    pub timestamps: bool,
    /// Collection name override (default: the model name)
    pub collection: Option<String>,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            timestamps: true,
            collection: None,
        }
    }
}

/// Everything needed to define a model.
#[derive(Debug)]
pub struct ModelDefinition {
    /// Model name (and default collection name)
    pub name: String,
    /// Raw nested field declaration (see SCHEMA.md)
    pub fields: Value,
    /// Paths hidden from inserts
    pub insert_blacklist: Vec<String>,
    /// Paths hidden from updates
    pub update_blacklist: Vec<String>,
    /// Paths hidden from reads
    pub find_blacklist: Vec<String>,
    /// Custom failure messages: path → rule → message
    pub messages: HashMap<String, HashMap<String, String>>,
    /// Hooks, fixed at definition time
    pub hooks: HookSet,
    /// Model configuration
    pub config: ModelConfig,
}

impl ModelDefinition {
    /// Create a definition with the given name and field declaration.
    pub fn new(name: impl Into<String>, fields: Value) -> Self {
        Self {
            name: name.into(),
            fields,
            insert_blacklist: Vec::new(),
            update_blacklist: Vec::new(),
            find_blacklist: Vec::new(),
            messages: HashMap::new(),
            hooks: HookSet::new(),
            config: ModelConfig::default(),
        }
    }

    /// Set the read blacklist.
    pub fn find_blacklist(mut self, paths: &[&str]) -> Self {
        self.find_blacklist = paths.iter().map(|p| p.to_string()).collect();
        self
    }

    /// Set the insert blacklist.
    pub fn insert_blacklist(mut self, paths: &[&str]) -> Self {
        self.insert_blacklist = paths.iter().map(|p| p.to_string()).collect();
        self
    }

    /// Set the update blacklist.
    pub fn update_blacklist(mut self, paths: &[&str]) -> Self {
        self.update_blacklist = paths.iter().map(|p| p.to_string()).collect();
        self
    }

    /// Override the failure message for one `(path, rule)` pair.
    pub fn message(
        mut self,
        path: impl Into<String>,
        rule: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        self.messages
            .entry(path.into())
            .or_default()
            .insert(rule.into(), text.into());
        self
    }

    /// Register a hook.
    pub fn hook(mut self, point: HookPoint, hook: Arc<dyn Hook>) -> Self {
        self.hooks.add(point, hook);
        self
    }

    /// Enable or disable timestamp injection.
    pub fn timestamps(mut self, enabled: bool) -> Self {
        self.config.timestamps = enabled;
        self
    }

    /// Override the collection name.
    pub fn collection(mut self, name: impl Into<String>) -> Self {
        self.config.collection = Some(name.into());
        self
    }
}
