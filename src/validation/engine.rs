//! Validation engine
//!
//! Depth-first recursive walk over the compiled field tree. Children
//! are visited in declaration order; errors come out in that order too.
//! The walk is a pure transform: it reads the input and builds a new
//! pruned value, so the same input can be validated repeatedly.

use serde_json::{Map, Value};

use crate::model::Model;
use crate::paths;
use crate::rules::RuleContext;
use crate::schema::{CompiledRule, FieldKind, FieldNode};

use super::context::ValidationContext;
use super::errors::ValidationError;

/// Validates documents against one model's field tree.
pub struct ValidationEngine<'a> {
    model: &'a Model,
}

impl<'a> ValidationEngine<'a> {
    /// Create an engine for the given model.
    pub fn new(model: &'a Model) -> Self {
        Self { model }
    }

    /// Validate a document, or an array of documents, against the
    /// model. Returns the ordered error list and a pruned copy of the
    /// input; the input itself is never touched.
    pub fn validate(&self, data: &Value, ctx: &ValidationContext) -> (Vec<ValidationError>, Value) {
        match data {
            Value::Array(items) => {
                let mut errors = Vec::new();
                let mut out = Vec::with_capacity(items.len());
                for (index, item) in items.iter().enumerate() {
                    let (item_errors, pruned) =
                        self.validate_document(item, &index.to_string(), ctx);
                    errors.extend(item_errors);
                    out.push(pruned);
                }
                (errors, Value::Array(out))
            }
            other => self.validate_document(other, "", ctx),
        }
    }

    fn validate_document(
        &self,
        data: &Value,
        display_prefix: &str,
        ctx: &ValidationContext,
    ) -> (Vec<ValidationError>, Value) {
        let mut errors = Vec::new();
        let input = data.as_object();
        let mut out = Map::new();
        for child in self.model.tree().children() {
            let value = input.and_then(|map| map.get(&child.name));
            let display = paths::join(display_prefix, &child.name);
            if let Some(pruned) = self.walk_field(child, value, &display, ctx, &mut errors) {
                out.insert(child.name.clone(), pruned);
            }
        }
        (errors, Value::Object(out))
    }

    /// Validate one field. Returns the pruned output value, or `None`
    /// when the field contributes no key to the output.
    fn walk_field(
        &self,
        node: &FieldNode,
        value: Option<&Value>,
        display: &str,
        ctx: &ValidationContext,
        errors: &mut Vec<ValidationError>,
    ) -> Option<Value> {
        if node.virtual_field {
            return None;
        }

        let timestamps_suppressed = node.timestamp && !ctx.timestamps;
        let default_override = node.default_override && !timestamps_suppressed;

        let absent = value.map_or(true, Value::is_null);
        let mut current: Option<Value> = value.cloned();
        if let Some(default) = &node.default {
            if !timestamps_suppressed && (default_override || (ctx.insert_mode() && absent)) {
                current = Some(default.resolve());
            }
        }

        // Blacklisted fields are silently skipped; a default-override
        // field survives its blacklist entry.
        if ctx.is_blacklisted(&node.path) && !default_override {
            return None;
        }

        if !ctx.insert_mode() && node.insert_only {
            return None;
        }

        match &node.kind {
            FieldKind::Leaf => self.walk_leaf(node, current, display, ctx, errors),
            FieldKind::Object { children } => {
                self.walk_object(node, children, current, display, ctx, errors)
            }
            FieldKind::Array { element } => {
                self.walk_array(node, element, current, display, ctx, errors)
            }
        }
    }

    fn walk_leaf(
        &self,
        node: &FieldNode,
        current: Option<Value>,
        display: &str,
        ctx: &ValidationContext,
        errors: &mut Vec<ValidationError>,
    ) -> Option<Value> {
        let provided = current.is_some();
        let mut value = current.unwrap_or(Value::Null);
        errors.extend(self.run_rules(node, &mut value, display, ctx));
        if provided {
            Some(value)
        } else {
            None
        }
    }

    fn walk_object(
        &self,
        node: &FieldNode,
        children: &[FieldNode],
        current: Option<Value>,
        display: &str,
        ctx: &ValidationContext,
        errors: &mut Vec<ValidationError>,
    ) -> Option<Value> {
        let provided = current.is_some();
        let mut value = current.unwrap_or(Value::Null);
        errors.extend(self.run_rules(node, &mut value, display, ctx));

        // Children are visited when input is present or on insert,
        // independently of container rule failures.
        if !provided && !ctx.insert_mode() {
            return None;
        }

        let input = value.as_object();
        let mut out = Map::new();
        for child in children {
            let child_value = input.and_then(|map| map.get(&child.name));
            let child_display = paths::join(display, &child.name);
            if let Some(pruned) = self.walk_field(child, child_value, &child_display, ctx, errors)
            {
                out.insert(child.name.clone(), pruned);
            }
        }

        if provided {
            if value.is_object() {
                Some(Value::Object(out))
            } else {
                // Wrong-typed input is mirrored; the type error is
                // already recorded.
                Some(value)
            }
        } else if !out.is_empty() {
            // Defaults materialized an absent subdocument on insert.
            Some(Value::Object(out))
        } else {
            None
        }
    }

    fn walk_array(
        &self,
        node: &FieldNode,
        element: &FieldNode,
        current: Option<Value>,
        display: &str,
        ctx: &ValidationContext,
        errors: &mut Vec<ValidationError>,
    ) -> Option<Value> {
        let Some(raw) = current else {
            let mut value = Value::Null;
            errors.extend(self.run_rules(node, &mut value, display, ctx));
            return None;
        };

        if raw.is_null() {
            let mut value = Value::Null;
            errors.extend(self.run_rules(node, &mut value, display, ctx));
            return Some(Value::Null);
        }

        // Non-array input is coerced to a single-element array before
        // the container rules run.
        let mut value = if raw.is_array() {
            raw
        } else {
            Value::Array(vec![raw])
        };
        errors.extend(self.run_rules(node, &mut value, display, ctx));

        let items = match value {
            Value::Array(items) => items,
            other => return Some(other),
        };

        // Re-index while walking; skipped items are omitted, but empty
        // element objects are kept.
        let mut out = Vec::with_capacity(items.len());
        for (index, item) in items.iter().enumerate() {
            let child_display = paths::join(display, &index.to_string());
            if let Some(pruned) =
                self.walk_field(element, Some(item), &child_display, ctx, errors)
            {
                out.push(pruned);
            }
        }
        Some(Value::Array(out))
    }

    /// Apply a field's rules in order, coercing through each rule's
    /// `tryParse` first so later predicates see the parsed value. A
    /// `required` failure suppresses every other error for the field.
    fn run_rules(
        &self,
        node: &FieldNode,
        value: &mut Value,
        display: &str,
        ctx: &ValidationContext,
    ) -> Vec<ValidationError> {
        let mut out = Vec::new();
        for rule in &node.rules {
            if let Some(parsed) = rule.descriptor.parse(value) {
                *value = parsed;
            }

            if value.is_null() && rule.name != "required" {
                continue;
            }
            if rule.descriptor.ignore_empty_string && value.as_str() == Some("") {
                continue;
            }

            let rule_ctx = RuleContext {
                model: self.model.name(),
                field: &node.name,
                path: &node.path,
                insert: ctx.insert_mode(),
            };
            let failure = match (rule.descriptor.predicate)(value, &rule.arg, &rule_ctx) {
                Ok(true) => None,
                Ok(false) => Some(self.detail_for(node, rule, value)),
                // Predicate errors carry their message verbatim.
                Err(message) => Some(message),
            };

            if let Some(detail) = failure {
                let error = ValidationError::new(
                    display,
                    detail,
                    &rule.name,
                    self.model.name(),
                    &node.name,
                );
                if rule.name == "required" {
                    return vec![error];
                }
                out.push(error);
            }
        }
        out
    }

    fn detail_for(&self, node: &FieldNode, rule: &CompiledRule, value: &Value) -> String {
        match self.model.message_for(&node.path, &rule.name) {
            Some(custom) => custom.to_string(),
            None => rule.descriptor.message.render(value, &rule.arg),
        }
    }
}
