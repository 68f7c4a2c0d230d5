//! Model registry
//!
//! Name-keyed store of defined models. The registry is append-only in
//! normal use; redefining a name is last-writer-wins and must be
//! serialized by the caller. Cross-model references hold only the name
//! and resolve against the registry at first use, so declaration order
//! between referencing models does not matter.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use crate::observability::Logger;
use crate::rules::RuleRegistry;
use crate::schema::SchemaCompiler;

use super::definition::ModelDefinition;
use super::model::Model;

/// Injectable name → model store.
#[derive(Debug)]
pub struct ModelRegistry {
    rules: RuleRegistry,
    models: RwLock<HashMap<String, Arc<Model>>>,
}

impl ModelRegistry {
    /// Create a registry with the built-in rule set.
    pub fn new() -> Self {
        Self::with_rules(RuleRegistry::new())
    }

    /// Create a registry with a caller-supplied rule set.
    pub fn with_rules(rules: RuleRegistry) -> Self {
        Self {
            rules,
            models: RwLock::new(HashMap::new()),
        }
    }

    /// The rule registry models compile against.
    pub fn rules(&self) -> &RuleRegistry {
        &self.rules
    }

    /// Compile and register a model. Compile problems are logged and
    /// auto-corrected, never fatal; they are also recorded on the model.
    pub fn define(&self, definition: ModelDefinition) -> Arc<Model> {
        let compiler = SchemaCompiler::new(&self.rules);
        let compiled = compiler.compile(
            &definition.name,
            &definition.fields,
            definition.config.timestamps,
        );

        let collection = definition
            .config
            .collection
            .clone()
            .unwrap_or_else(|| definition.name.clone());

        let model = Arc::new(Model::new(
            definition.name.clone(),
            collection,
            compiled.tree,
            definition.insert_blacklist,
            definition.update_blacklist,
            definition.find_blacklist,
            definition.messages,
            definition.hooks,
            compiled.indexes,
            compiled.diagnostics,
            definition.config.timestamps,
        ));

        let replaced = {
            let mut models = match self.models.write() {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
            models.insert(definition.name.clone(), Arc::clone(&model)).is_some()
        };

        if replaced {
            Logger::warn("MODEL_REDEFINED", &[("model", definition.name.as_str())]);
        } else {
            Logger::info("MODEL_DEFINED", &[("model", definition.name.as_str())]);
        }

        model
    }

    /// Look up a model by name.
    pub fn get(&self, name: &str) -> Option<Arc<Model>> {
        let models = match self.models.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        models.get(name).cloned()
    }

    /// Names of every defined model (unordered).
    pub fn names(&self) -> Vec<String> {
        let models = match self.models.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        models.keys().cloned().collect()
    }
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}
