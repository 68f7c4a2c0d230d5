//! Schema compiler
//!
//! Lowers a raw nested declaration (SCHEMA.md) into a compiled
//! `FieldNode` tree. Rule names resolve to descriptor references here,
//! once, so validation never does string dispatch. Declaration problems
//! are corrected and logged, never fatal.

use std::sync::Arc;

use chrono::Utc;
use serde_json::{Map, Value};

use crate::paths;
use crate::rules::RuleRegistry;

use super::errors::{CompileCode, CompileDiagnostic};
use super::node::{CompiledRule, DefaultValue, FieldKind, FieldNode, FieldType, IndexSpec};

/// Result of compiling one declaration.
#[derive(Debug, Clone)]
pub struct CompiledSchema {
    /// Root of the field tree (an object node whose children are the
    /// top-level fields)
    pub tree: FieldNode,
    /// Non-fatal problems found during compilation
    pub diagnostics: Vec<CompileDiagnostic>,
    /// Index specs collected from `index` options, for the driver
    pub indexes: Vec<IndexSpec>,
}

/// Compiles raw field declarations against a rule registry.
pub struct SchemaCompiler<'a> {
    rules: &'a RuleRegistry,
}

impl<'a> SchemaCompiler<'a> {
    /// Create a compiler backed by the given rule registry.
    pub fn new(rules: &'a RuleRegistry) -> Self {
        Self { rules }
    }

    /// Compile a declaration for the named model.
    ///
    /// Injects the identifier field and, when `timestamps` is set, the
    /// `createdAt` (insert-only) and `updatedAt` fields, unless the
    /// declaration already carries fields of those names.
    pub fn compile(&self, model: &str, declaration: &Value, timestamps: bool) -> CompiledSchema {
        let mut session = Session {
            model,
            rules: self.rules,
            diagnostics: Vec::new(),
            indexes: Vec::new(),
        };

        let mut children = match declaration.as_object() {
            Some(map) => map
                .iter()
                .map(|(name, decl)| session.compile_field(name, name, decl))
                .collect(),
            None => {
                session.diagnose(
                    CompileCode::InvalidDeclaration,
                    "",
                    "declaration root must be a mapping of fields",
                );
                Vec::new()
            }
        };

        if !children.iter().any(|c| c.name == "_id") {
            children.insert(0, session.identifier_field());
        }
        if timestamps {
            if !children.iter().any(|c| c.name == "createdAt") {
                children.push(session.timestamp_field("createdAt", true));
            }
            if !children.iter().any(|c| c.name == "updatedAt") {
                children.push(session.timestamp_field("updatedAt", false));
            }
        }

        let mut tree = FieldNode::leaf("", "", FieldType::Object);
        tree.kind = FieldKind::Object { children };

        CompiledSchema {
            tree,
            diagnostics: session.diagnostics,
            indexes: session.indexes,
        }
    }
}

struct Session<'a> {
    model: &'a str,
    rules: &'a RuleRegistry,
    diagnostics: Vec<CompileDiagnostic>,
    indexes: Vec<IndexSpec>,
}

impl<'a> Session<'a> {
    fn diagnose(&mut self, code: CompileCode, path: &str, detail: impl Into<String>) {
        self.diagnostics
            .push(CompileDiagnostic::emit(code, self.model, path, detail));
    }

    fn compile_field(&mut self, name: &str, path: &str, decl: &Value) -> FieldNode {
        match decl {
            Value::Array(items) => self.compile_array(name, path, items),
            Value::Object(map) => {
                if is_leaf_declaration(map) {
                    self.compile_leaf(name, path, map)
                } else if is_subdocument_declaration(map) {
                    self.compile_subdocument(name, path, map)
                } else {
                    // A mapping of plain option values with no type:
                    // treat as a leaf and let the missing type surface.
                    self.compile_leaf(name, path, map)
                }
            }
            other => {
                self.diagnose(
                    CompileCode::InvalidDeclaration,
                    path,
                    format!("expected a mapping or one-element array, got {}", kind_of(other)),
                );
                self.string_leaf(name, path)
            }
        }
    }

    fn compile_array(&mut self, name: &str, path: &str, items: &[Value]) -> FieldNode {
        if items.len() != 1 {
            self.diagnose(
                CompileCode::InvalidDeclaration,
                path,
                format!(
                    "array declarations take exactly one element template, got {}",
                    items.len()
                ),
            );
        }

        // The reserved `schema` key inside the element mapping holds the
        // array container's own node-level rules.
        let (element_decl, node_options) = match items.first() {
            Some(Value::Object(map)) if map.contains_key("schema") => {
                let mut stripped = map.clone();
                let options = stripped.remove("schema");
                (Some(Value::Object(stripped)), options)
            }
            Some(template) => (Some(template.clone()), None),
            None => (None, None),
        };

        let element = match &element_decl {
            Some(decl) => self.compile_field(name, path, decl),
            None => self.string_leaf(name, path),
        };

        let mut node = FieldNode::leaf(name, path, FieldType::Array);
        node.kind = FieldKind::Array {
            element: Box::new(element),
        };
        self.push_type_rule(&mut node, FieldType::Array);
        if let Some(Value::Object(options)) = &node_options {
            self.apply_options(&mut node, options);
        }
        node
    }

    fn compile_subdocument(&mut self, name: &str, path: &str, map: &Map<String, Value>) -> FieldNode {
        let children = map
            .iter()
            .filter(|(key, _)| key.as_str() != "schema")
            .map(|(key, decl)| self.compile_field(key, &paths::join(path, key), decl))
            .collect();

        let mut node = FieldNode::leaf(name, path, FieldType::Object);
        node.kind = FieldKind::Object { children };
        self.push_type_rule(&mut node, FieldType::Object);
        if let Some(Value::Object(options)) = map.get("schema") {
            self.apply_options(&mut node, options);
        }
        node
    }

    fn compile_leaf(&mut self, name: &str, path: &str, map: &Map<String, Value>) -> FieldNode {
        let model_ref = map.get("model").and_then(Value::as_str);

        let field_type = if model_ref.is_some() {
            FieldType::Id
        } else {
            match map.get("type") {
                Some(Value::String(type_name)) => match FieldType::from_name(type_name) {
                    Some(t) => t,
                    None => {
                        self.diagnose(
                            CompileCode::UnknownType,
                            path,
                            format!("unknown type '{}', using string", type_name),
                        );
                        FieldType::String
                    }
                },
                Some(other) => {
                    self.diagnose(
                        CompileCode::InvalidDeclaration,
                        path,
                        format!("type must be a string, got {}", kind_of(other)),
                    );
                    FieldType::String
                }
                None => {
                    self.diagnose(
                        CompileCode::MissingType,
                        path,
                        "field declared without a type, using string",
                    );
                    FieldType::String
                }
            }
        };

        let mut node = FieldNode::leaf(name, path, field_type);
        node.model_ref = model_ref.map(str::to_string);
        self.push_type_rule(&mut node, field_type);
        self.apply_options(&mut node, map);
        node
    }

    /// Process option keys and declared rules, in declaration order.
    fn apply_options(&mut self, node: &mut FieldNode, map: &Map<String, Value>) {
        for (key, value) in map {
            match key.as_str() {
                "type" | "model" | "image" => {}
                "default" => node.default = Some(DefaultValue::Fixed(value.clone())),
                "defaultOverride" => node.default_override = value.as_bool().unwrap_or(false),
                "insertOnly" => node.insert_only = value.as_bool().unwrap_or(false),
                "virtual" => node.virtual_field = value.as_bool().unwrap_or(false),
                "index" => self.indexes.push(IndexSpec {
                    path: node.path.clone(),
                    spec: value.clone(),
                }),
                "schema" => self.diagnose(
                    CompileCode::InvalidDeclaration,
                    &node.path.clone(),
                    "the reserved 'schema' key only applies to containers",
                ),
                rule_name => match self.rules.resolve(rule_name) {
                    Ok(descriptor) => node.rules.push(CompiledRule {
                        name: rule_name.to_string(),
                        arg: value.clone(),
                        descriptor,
                    }),
                    Err(_) => self.diagnose(
                        CompileCode::UnknownRule,
                        &node.path.clone(),
                        format!("rule '{}' is not registered, stripped", rule_name),
                    ),
                },
            }
        }
    }

    fn push_type_rule(&mut self, node: &mut FieldNode, field_type: FieldType) {
        match self.rules.resolve(field_type.rule_name()) {
            Ok(descriptor) => node.rules.push(CompiledRule {
                name: field_type.rule_name().to_string(),
                arg: Value::Bool(true),
                descriptor,
            }),
            Err(_) => {
                // A registry without the type rule cannot check this
                // type at all; fall back to string where possible.
                self.diagnose(
                    CompileCode::UnknownType,
                    &node.path.clone(),
                    format!("no '{}' rule registered", field_type.rule_name()),
                );
                if field_type != FieldType::String {
                    if let Ok(descriptor) = self.rules.resolve(FieldType::String.rule_name()) {
                        node.field_type = FieldType::String;
                        node.rules.push(CompiledRule {
                            name: FieldType::String.rule_name().to_string(),
                            arg: Value::Bool(true),
                            descriptor,
                        });
                    }
                }
            }
        }
    }

    fn identifier_field(&mut self) -> FieldNode {
        let mut node = FieldNode::leaf("_id", "_id", FieldType::Id);
        node.insert_only = true;
        self.push_type_rule(&mut node, FieldType::Id);
        node
    }

    fn timestamp_field(&mut self, name: &str, insert_only: bool) -> FieldNode {
        let mut node = FieldNode::leaf(name, name, FieldType::Date);
        node.insert_only = insert_only;
        node.timestamp = true;
        node.default = Some(DefaultValue::Computed(Arc::new(|| {
            Value::from(Utc::now().timestamp_millis())
        })));
        node.default_override = true;
        self.push_type_rule(&mut node, FieldType::Date);
        node
    }

    fn string_leaf(&mut self, name: &str, path: &str) -> FieldNode {
        let mut node = FieldNode::leaf(name, path, FieldType::String);
        self.push_type_rule(&mut node, FieldType::String);
        node
    }
}

/// A mapping declares a leaf when it names a scalar type or a model.
fn is_leaf_declaration(map: &Map<String, Value>) -> bool {
    matches!(map.get("type"), Some(Value::String(_)))
        || matches!(map.get("model"), Some(Value::String(_)))
}

/// A mapping declares a subdocument when it has at least one field and
/// every non-reserved value is itself a declaration (mapping or array).
fn is_subdocument_declaration(map: &Map<String, Value>) -> bool {
    let mut any = false;
    for (key, value) in map {
        if key == "schema" {
            continue;
        }
        if !matches!(value, Value::Object(_) | Value::Array(_)) {
            return false;
        }
        any = true;
    }
    any
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn compile(declaration: Value) -> CompiledSchema {
        let registry = RuleRegistry::new();
        SchemaCompiler::new(&registry).compile("user", &declaration, true)
    }

    #[test]
    fn test_leaf_gets_type_rule_first() {
        let compiled = compile(json!({
            "name": { "type": "string", "required": true, "minLength": 2 }
        }));
        let name = compiled.tree.descend("name").unwrap();
        let rule_names: Vec<&str> = name.rules.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(rule_names, vec!["isString", "required", "minLength"]);
        assert!(compiled.diagnostics.is_empty());
    }

    #[test]
    fn test_missing_type_defaults_to_string() {
        let compiled = compile(json!({ "nickname": { "required": true } }));
        let node = compiled.tree.descend("nickname").unwrap();
        assert_eq!(node.field_type, FieldType::String);
        assert_eq!(compiled.diagnostics.len(), 1);
        assert_eq!(compiled.diagnostics[0].code, CompileCode::MissingType);
    }

    #[test]
    fn test_unknown_type_is_corrected() {
        let compiled = compile(json!({ "payload": { "type": "blob" } }));
        let node = compiled.tree.descend("payload").unwrap();
        assert_eq!(node.field_type, FieldType::String);
        assert_eq!(compiled.diagnostics[0].code, CompileCode::UnknownType);
    }

    #[test]
    fn test_unknown_rule_is_stripped() {
        let compiled = compile(json!({
            "name": { "type": "string", "sparkles": true }
        }));
        let node = compiled.tree.descend("name").unwrap();
        assert!(!node.has_rule("sparkles"));
        assert_eq!(compiled.diagnostics[0].code, CompileCode::UnknownRule);
    }

    #[test]
    fn test_option_keys_are_not_rules() {
        let compiled = compile(json!({
            "secret": {
                "type": "string",
                "default": "hunter2",
                "insertOnly": true,
                "virtual": true,
                "image": { "formats": ["png"] }
            }
        }));
        let node = compiled.tree.descend("secret").unwrap();
        assert!(node.insert_only);
        assert!(node.virtual_field);
        assert!(matches!(node.default, Some(DefaultValue::Fixed(_))));
        assert_eq!(node.rules.len(), 1); // just isString
        assert!(compiled.diagnostics.is_empty());
    }

    #[test]
    fn test_subdocument_children_in_order() {
        let compiled = compile(json!({
            "address": {
                "city": { "type": "string" },
                "zip": { "type": "string" }
            }
        }));
        let address = compiled.tree.descend("address").unwrap();
        assert_eq!(address.field_type, FieldType::Object);
        let names: Vec<&str> = address.children().iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["city", "zip"]);
    }

    #[test]
    fn test_container_schema_options() {
        let compiled = compile(json!({
            "address": {
                "schema": { "required": true },
                "city": { "type": "string" }
            }
        }));
        let address = compiled.tree.descend("address").unwrap();
        assert!(address.has_rule("required"));
        assert!(address.has_rule("isObject"));
        // `schema` is not a child field.
        assert_eq!(address.children().len(), 1);
    }

    #[test]
    fn test_array_template_and_node_rules() {
        let compiled = compile(json!({
            "colors": [{ "type": "string", "schema": { "required": true } }]
        }));
        let colors = compiled.tree.descend("colors").unwrap();
        assert_eq!(colors.field_type, FieldType::Array);
        assert!(colors.has_rule("required"));
        match &colors.kind {
            FieldKind::Array { element } => {
                assert_eq!(element.field_type, FieldType::String);
                assert!(!element.has_rule("required"));
            }
            _ => panic!("expected array node"),
        }
    }

    #[test]
    fn test_array_of_subdocuments_paths_skip_indices() {
        let compiled = compile(json!({
            "pets": [{ "name": { "type": "string" }, "age": { "type": "number" } }]
        }));
        let age = compiled.tree.descend("pets.age").unwrap();
        assert_eq!(age.path, "pets.age");
    }

    #[test]
    fn test_model_reference_compiles_to_id() {
        let compiled = compile(json!({ "author": { "model": "user" } }));
        let author = compiled.tree.descend("author").unwrap();
        assert_eq!(author.field_type, FieldType::Id);
        assert_eq!(author.model_ref.as_deref(), Some("user"));
    }

    #[test]
    fn test_default_field_injection() {
        let compiled = compile(json!({ "name": { "type": "string" } }));
        let id = compiled.tree.descend("_id").unwrap();
        assert!(id.insert_only);
        let created = compiled.tree.descend("createdAt").unwrap();
        assert!(created.insert_only);
        assert!(created.default_override);
        assert!(created.timestamp);
        let updated = compiled.tree.descend("updatedAt").unwrap();
        assert!(!updated.insert_only);
        assert!(updated.default_override);
    }

    #[test]
    fn test_timestamps_can_be_disabled() {
        let registry = RuleRegistry::new();
        let compiled = SchemaCompiler::new(&registry).compile(
            "user",
            &json!({ "name": { "type": "string" } }),
            false,
        );
        assert!(compiled.tree.descend("createdAt").is_none());
        assert!(compiled.tree.descend("updatedAt").is_none());
        assert!(compiled.tree.descend("_id").is_some());
    }

    #[test]
    fn test_declared_id_is_not_replaced() {
        let compiled = compile(json!({ "_id": { "type": "string" } }));
        let id = compiled.tree.descend("_id").unwrap();
        assert_eq!(id.field_type, FieldType::String);
        assert!(!id.insert_only);
    }

    #[test]
    fn test_index_specs_are_collected() {
        let compiled = compile(json!({
            "email": { "type": "string", "index": "unique" }
        }));
        assert_eq!(compiled.indexes.len(), 1);
        assert_eq!(compiled.indexes[0].path, "email");
        assert_eq!(compiled.indexes[0].spec, json!("unique"));
    }
}
