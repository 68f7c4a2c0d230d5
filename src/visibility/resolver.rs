//! Visibility resolver
//!
//! Concatenates directive layers in precedence order and processes
//! them into a projection:
//!
//! 1. referenced-model blacklists, deepest model first, each entry
//!    prefixed with the referencing field's path; skipped entirely
//!    under a subtree the model's own blacklist already excludes
//! 2. extra merged directives supplied by the population planner
//! 3. the model's own find blacklist (read fresh)
//! 4. the call's override directives
//!
//! Later entries win at the same path. With an empty override list the
//! result depends only on the blacklists, so repeated calls are stable.

use crate::model::{Model, ModelRegistry};
use crate::observability::Logger;
use crate::paths;
use crate::schema::{FieldKind, FieldNode};

use super::directive::Directive;
use super::projection::Projection;

/// Resolves projections against a model registry.
pub struct VisibilityResolver<'a> {
    registry: &'a ModelRegistry,
}

impl<'a> VisibilityResolver<'a> {
    /// Create a resolver backed by the given registry.
    pub fn new(registry: &'a ModelRegistry) -> Self {
        Self { registry }
    }

    /// Resolve the final exclusion projection for a read.
    pub fn resolve_projection(&self, model: &Model, overrides: &[String]) -> Projection {
        self.resolve_with(model, &[], overrides)
    }

    /// Resolve with extra merged directives (from population planning)
    /// inserted between the deep-model layer and the model's own
    /// blacklist.
    pub fn resolve_with(
        &self,
        model: &Model,
        merged: &[String],
        overrides: &[String],
    ) -> Projection {
        let mut directives: Vec<Directive> = Vec::new();

        let mut visited = vec![model.name().to_string()];
        self.merge_referenced(model, "", &mut directives, &mut visited);

        directives.extend(Directive::parse_list(merged.iter().map(String::as_str)));
        directives.extend(Directive::parse_list(
            model.find_blacklist().iter().map(String::as_str),
        ));
        directives.extend(Directive::parse_list(overrides.iter().map(String::as_str)));

        Projection::from_directives(directives)
    }

    /// Post-order walk over reference fields: recurse first so the
    /// deepest model's entries land first in the concatenation.
    fn merge_referenced(
        &self,
        model: &Model,
        prefix: &str,
        directives: &mut Vec<Directive>,
        visited: &mut Vec<String>,
    ) {
        let own_blacklist: Vec<String> = model
            .find_blacklist()
            .iter()
            .map(|raw| Directive::parse(raw))
            .filter(|d| !d.negated)
            .map(|d| d.path)
            .collect();

        for (field_path, ref_name) in reference_fields(model.tree()) {
            // A blacklisted parent short-circuits descent: deep model
            // blacklists are not merged under an excluded subtree.
            if own_blacklist
                .iter()
                .any(|entry| paths::is_self_or_descendant(&field_path, entry))
            {
                continue;
            }

            let Some(referenced) = self.registry.get(&ref_name) else {
                Logger::warn(
                    "CONFIG_UNKNOWN_MODEL",
                    &[
                        ("model", model.name()),
                        ("path", field_path.as_str()),
                        ("reference", ref_name.as_str()),
                    ],
                );
                continue;
            };

            if visited.iter().any(|name| name == referenced.name()) {
                continue;
            }
            visited.push(referenced.name().to_string());

            let full_prefix = paths::join(prefix, &field_path);
            self.merge_referenced(&referenced, &full_prefix, directives, visited);
            directives.extend(
                Directive::parse_list(referenced.find_blacklist().iter().map(String::as_str))
                    .into_iter()
                    .map(|d| d.prefixed(&full_prefix)),
            );

            visited.pop();
        }
    }
}

/// Reference fields in a tree: `(normalized field path, model name)`.
fn reference_fields(tree: &FieldNode) -> Vec<(String, String)> {
    let mut out = Vec::new();
    collect_references(tree, &mut out);
    out
}

fn collect_references(node: &FieldNode, out: &mut Vec<(String, String)>) {
    match &node.kind {
        FieldKind::Object { children } => {
            for child in children {
                if let Some(reference) = &child.model_ref {
                    out.push((child.path.clone(), reference.clone()));
                }
                collect_references(child, out);
            }
        }
        FieldKind::Array { element } => {
            if let Some(reference) = &element.model_ref {
                out.push((element.path.clone(), reference.clone()));
            }
            collect_references(element, out);
        }
        FieldKind::Leaf => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ModelDefinition;
    use serde_json::json;

    #[test]
    fn test_base_blacklist_only() {
        let registry = ModelRegistry::new();
        let model = registry.define(
            ModelDefinition::new("user", json!({ "name": { "type": "string" } }))
                .find_blacklist(&["password", "sessions.token"]),
        );

        let projection = VisibilityResolver::new(&registry).resolve_projection(&model, &[]);
        assert_eq!(projection.paths(), ["password", "sessions.token"]);
    }

    #[test]
    fn test_referenced_model_blacklist_is_prefixed() {
        let registry = ModelRegistry::new();
        registry.define(
            ModelDefinition::new("user", json!({ "name": { "type": "string" } }))
                .find_blacklist(&["password"]),
        );
        let post = registry.define(
            ModelDefinition::new(
                "post",
                json!({ "title": { "type": "string" }, "author": { "model": "user" } }),
            )
            .find_blacklist(&["draft"]),
        );

        let projection = VisibilityResolver::new(&registry).resolve_projection(&post, &[]);
        assert_eq!(projection.paths(), ["author.password", "draft"]);
    }

    #[test]
    fn test_blacklisted_parent_short_circuits_merge() {
        let registry = ModelRegistry::new();
        registry.define(
            ModelDefinition::new("user", json!({ "name": { "type": "string" } }))
                .find_blacklist(&["password"]),
        );
        let post = registry.define(
            ModelDefinition::new(
                "post",
                json!({ "meta": { "author": { "model": "user" } } }),
            )
            .find_blacklist(&["meta"]),
        );

        let projection = VisibilityResolver::new(&registry).resolve_projection(&post, &[]);
        // No meta.author.password: the excluded subtree is not merged.
        assert_eq!(projection.paths(), ["meta"]);
    }

    #[test]
    fn test_override_wins_over_static_blacklist() {
        let registry = ModelRegistry::new();
        let model = registry.define(
            ModelDefinition::new("user", json!({ "name": { "type": "string" } }))
                .find_blacklist(&["dog", "animals.cat", "pets.age"]),
        );

        let projection = VisibilityResolver::new(&registry)
            .resolve_projection(&model, &["-dog".to_string(), "pets.name".to_string()]);
        assert!(!projection.is_excluded("dog"));
        assert!(projection.is_excluded("pets.name"));
        assert!(projection.is_excluded("animals.cat"));
        assert!(projection.is_excluded("pets.age"));
    }

    #[test]
    fn test_static_blacklist_wins_over_deep_negation() {
        let registry = ModelRegistry::new();
        registry.define(
            ModelDefinition::new("user", json!({ "name": { "type": "string" } }))
                .find_blacklist(&["-secret"]),
        );
        let post = registry.define(
            ModelDefinition::new("post", json!({ "author": { "model": "user" } }))
                .find_blacklist(&["author.secret"]),
        );

        // The deep entry (-author.secret) comes first; the model's own
        // blacklist re-excludes it afterwards.
        let projection = VisibilityResolver::new(&registry).resolve_projection(&post, &[]);
        assert!(projection.is_excluded("author.secret"));
    }

    #[test]
    fn test_cyclic_references_terminate() {
        let registry = ModelRegistry::new();
        registry.define(
            ModelDefinition::new("a", json!({ "peer": { "model": "b" } }))
                .find_blacklist(&["hidden"]),
        );
        let a = registry.get("a").unwrap();
        registry.define(
            ModelDefinition::new("b", json!({ "peer": { "model": "a" } }))
                .find_blacklist(&["secret"]),
        );

        let projection = VisibilityResolver::new(&registry).resolve_projection(&a, &[]);
        assert!(projection.is_excluded("peer.secret"));
        assert!(projection.is_excluded("hidden"));
        // The cycle is cut after one level.
        assert!(!projection.is_excluded("peer.peer.hidden"));
    }
}
