//! Population planning and unwrapping
//!
//! `plan` turns a populate list into driver join stages plus the
//! referenced models' visibility directives. `apply` post-processes the
//! driver's results: joins land in a reserved sibling field so that a
//! to-one miss can fall back to the stored foreign key.

use serde_json::Value;

use crate::model::{Model, ModelRegistry};
use crate::observability::Logger;
use crate::paths;
use crate::schema::FieldKind;
use crate::visibility::Directive;

use super::join::{JoinSpec, JoinStage, JoinTarget, PopulateItem};

/// The outcome of planning a populate list.
#[derive(Debug, Clone, Default)]
pub struct PopulationPlan {
    /// Join stages for the driver, in request order
    pub stages: Vec<JoinStage>,
    /// Referenced-model visibility directives, prefixed under the
    /// populated paths
    pub directives: Vec<String>,
}

/// Expands populate requests against a model registry.
pub struct PopulationPlanner<'a> {
    registry: &'a ModelRegistry,
}

impl<'a> PopulationPlanner<'a> {
    /// Create a planner backed by the given registry.
    pub fn new(registry: &'a ModelRegistry) -> Self {
        Self { registry }
    }

    /// Expand a populate list. Bad entries are logged and skipped.
    pub fn plan(&self, model: &Model, items: &[PopulateItem]) -> PopulationPlan {
        let mut plan = PopulationPlan::default();

        for item in items {
            match item {
                PopulateItem::Join(spec) => plan.stages.push(JoinStage {
                    spec: spec.clone(),
                    target: None,
                }),
                PopulateItem::Path(raw) => {
                    let path = paths::strip_indices(raw);
                    self.expand_path(model, &path, &mut plan);
                }
            }
        }

        plan
    }

    fn expand_path(&self, model: &Model, path: &str, plan: &mut PopulationPlan) {
        let Some(node) = model.tree().descend(path) else {
            Logger::warn(
                "POPULATE_UNKNOWN_PATH",
                &[("model", model.name()), ("path", path)],
            );
            return;
        };

        let (reference, to_one) = match &node.kind {
            FieldKind::Leaf => match &node.model_ref {
                Some(name) => (name.clone(), true),
                None => {
                    Logger::warn(
                        "POPULATE_NOT_A_REFERENCE",
                        &[("model", model.name()), ("path", path)],
                    );
                    return;
                }
            },
            FieldKind::Array { element } => match &element.model_ref {
                Some(name) => (name.clone(), false),
                None => {
                    Logger::warn(
                        "POPULATE_NOT_A_REFERENCE",
                        &[("model", model.name()), ("path", path)],
                    );
                    return;
                }
            },
            FieldKind::Object { .. } => {
                Logger::warn(
                    "POPULATE_NOT_A_REFERENCE",
                    &[("model", model.name()), ("path", path)],
                );
                return;
            }
        };

        let Some(foreign) = self.registry.get(&reference) else {
            Logger::warn(
                "CONFIG_UNKNOWN_MODEL",
                &[
                    ("model", model.name()),
                    ("path", path),
                    ("reference", reference.as_str()),
                ],
            );
            return;
        };

        plan.stages.push(JoinStage {
            spec: JoinSpec {
                from: foreign.collection().to_string(),
                as_field: staging_field(path),
                local_field: Some(path.to_string()),
                foreign_field: Some("_id".to_string()),
                let_vars: None,
                pipeline: None,
            },
            target: Some(JoinTarget {
                path: path.to_string(),
                to_one,
            }),
        });

        plan.directives.extend(
            Directive::parse_list(foreign.find_blacklist().iter().map(String::as_str))
                .into_iter()
                .map(|d| d.prefixed(path).render()),
        );
    }
}

/// Reserved sibling field join matches land in before unwrapping.
fn staging_field(path: &str) -> String {
    format!("_populated_{}", path.replace('.', "_"))
}

/// Unwrap join results on documents returned by the driver.
///
/// To-one: a one-element match array replaces the reference field; a
/// miss leaves the stored foreign key in place. To-many: the match
/// array replaces the field as-is. Custom join stages (no target) are
/// left untouched.
pub fn apply(documents: Vec<Value>, stages: &[JoinStage]) -> Vec<Value> {
    documents
        .into_iter()
        .map(|doc| apply_one(doc, stages))
        .collect()
}

fn apply_one(mut doc: Value, stages: &[JoinStage]) -> Value {
    for stage in stages {
        let Some(target) = &stage.target else {
            continue;
        };
        let staged = doc
            .as_object_mut()
            .and_then(|map| map.remove(&stage.spec.as_field));
        let Some(Value::Array(matches)) = staged else {
            continue;
        };

        if target.to_one {
            if let Some(first) = matches.into_iter().next() {
                set_path(&mut doc, &target.path, first);
            }
        } else {
            set_path(&mut doc, &target.path, Value::Array(matches));
        }
    }
    doc
}

/// Read a nested value by dot-path (objects only).
pub(crate) fn lookup<'v>(doc: &'v Value, path: &str) -> Option<&'v Value> {
    let mut current = doc;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

fn set_path(doc: &mut Value, path: &str, value: Value) {
    let (parent, leaf) = match path.rsplit_once('.') {
        Some((parent, leaf)) => (Some(parent), leaf),
        None => (None, path),
    };
    let slot = match parent {
        None => Some(doc),
        Some(parent_path) => lookup_mut(doc, parent_path),
    };
    if let Some(Value::Object(map)) = slot {
        map.insert(leaf.to_string(), value);
    }
}

fn lookup_mut<'v>(doc: &'v mut Value, path: &str) -> Option<&'v mut Value> {
    let mut current = doc;
    for segment in path.split('.') {
        current = current.as_object_mut()?.get_mut(segment)?;
    }
    Some(current)
}
