//! Validation Invariant Tests
//!
//! - A `required` failure yields exactly one error for its field
//! - Blacklisted fields are pruned silently, never nulled
//! - Output mirrors input shape (arrays stay arrays, index-compacted)
//! - `tryParse` coercions are idempotent
//! - Validation is a pure transform: the input is never mutated

use docmap::model::{ModelDefinition, ModelRegistry};
use docmap::validation::{Action, ValidationContext, ValidationEngine};
use serde_json::json;

// =============================================================================
// Helper Functions
// =============================================================================

fn menagerie() -> (ModelRegistry, std::sync::Arc<docmap::model::Model>) {
    let registry = ModelRegistry::new();
    let model = registry.define(
        ModelDefinition::new(
            "owner",
            json!({
                "dog": { "type": "string" },
                "pet": { "type": "string" },
                "pets": [{
                    "name": { "type": "string" },
                    "age": { "type": "number" }
                }],
                "animals": {
                    "cat": { "type": "string" },
                    "dog": { "type": "string" }
                }
            }),
        )
        .timestamps(false),
    );
    (registry, model)
}

// =============================================================================
// Required Short-Circuit
// =============================================================================

/// A field with `required` plus other rules reports only the required
/// failure when the value is missing; sibling fields stay quiet.
#[test]
fn test_required_reports_a_single_error() {
    let registry = ModelRegistry::new();
    let model = registry.define(
        ModelDefinition::new(
            "user",
            json!({
                "name": { "type": "string", "required": true },
                "colors": [{ "type": "string" }]
            }),
        )
        .timestamps(false),
    );

    let engine = ValidationEngine::new(&model);
    let ctx = ValidationContext::new(Action::Insert, Vec::<String>::new());
    let (errors, _) = engine.validate(&json!({}), &ctx);

    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].title, "name");
    assert_eq!(errors[0].meta.rule, "required");
    assert_eq!(errors[0].status, "400");
}

/// With a present value that fails several rules, every failure is
/// reported; required does not suppress anything it did not cause.
#[test]
fn test_non_required_failures_accumulate() {
    let registry = ModelRegistry::new();
    let model = registry.define(
        ModelDefinition::new(
            "user",
            json!({
                "code": { "type": "string", "required": true, "minLength": 4, "regex": "^[a-z]+$" }
            }),
        )
        .timestamps(false),
    );

    let engine = ValidationEngine::new(&model);
    let ctx = ValidationContext::new(Action::Insert, Vec::<String>::new());
    let (errors, _) = engine.validate(&json!({ "code": "A1" }), &ctx);

    let rules: Vec<&str> = errors.iter().map(|e| e.meta.rule.as_str()).collect();
    assert_eq!(rules, vec!["minLength", "regex"]);
}

// =============================================================================
// Blacklist Pruning
// =============================================================================

/// Blacklisted paths disappear from the output without errors, across
/// scalars, array elements, and subdocument members.
#[test]
fn test_blacklist_prunes_across_shapes() {
    let (_registry, model) = menagerie();
    let engine = ValidationEngine::new(&model);
    let ctx = ValidationContext::new(Action::Update, ["dog", "animals.cat", "pets.age"]);

    let input = json!({
        "dog": "Bruce",
        "pet": "Freddy",
        "pets": [{ "name": "Pluto", "age": 5 }],
        "animals": { "cat": "Ginger", "dog": "Max" }
    });
    let (errors, pruned) = engine.validate(&input, &ctx);

    assert!(errors.is_empty());
    assert_eq!(
        pruned,
        json!({
            "pet": "Freddy",
            "pets": [{ "name": "Pluto" }],
            "animals": { "dog": "Max" }
        })
    );
}

/// The input document is untouched by validation.
#[test]
fn test_validation_does_not_mutate_input() {
    let (_registry, model) = menagerie();
    let engine = ValidationEngine::new(&model);
    let ctx = ValidationContext::new(Action::Update, ["dog"]);

    let input = json!({ "dog": "Bruce", "pet": "Freddy" });
    let snapshot = input.clone();
    let _ = engine.validate(&input, &ctx);
    assert_eq!(input, snapshot);
}

/// Blacklist membership ignores array indices: `pets.0.age` and
/// `pets.age` are the same decision.
#[test]
fn test_blacklist_matching_strips_indices() {
    let (_registry, model) = menagerie();
    let engine = ValidationEngine::new(&model);
    let ctx = ValidationContext::new(Action::Update, ["pets.0.age"]);

    let (_, pruned) = engine.validate(
        &json!({ "pets": [{ "name": "a", "age": 1 }, { "name": "b", "age": 2 }] }),
        &ctx,
    );
    assert_eq!(pruned["pets"], json!([{ "name": "a" }, { "name": "b" }]));
}

// =============================================================================
// Shape Preservation
// =============================================================================

/// Arrays validate element-wise and come back as arrays; an empty
/// array round-trips with zero errors.
#[test]
fn test_array_round_trip() {
    let registry = ModelRegistry::new();
    let model = registry.define(
        ModelDefinition::new("user", json!({ "colors": [{ "type": "string" }] }))
            .timestamps(false),
    );
    let engine = ValidationEngine::new(&model);
    let ctx = ValidationContext::new(Action::Insert, Vec::<String>::new());

    let (errors, pruned) = engine.validate(&json!({ "colors": [] }), &ctx);
    assert!(errors.is_empty());
    assert_eq!(pruned["colors"], json!([]));

    let (errors, pruned) =
        engine.validate(&json!({ "colors": ["red", "green", "blue"] }), &ctx);
    assert!(errors.is_empty());
    assert_eq!(pruned["colors"], json!(["red", "green", "blue"]));
}

/// Element objects that lose every member to the blacklist are
/// retained as empty objects, not dropped.
#[test]
fn test_fully_masked_elements_are_kept_empty() {
    let (_registry, model) = menagerie();
    let engine = ValidationEngine::new(&model);
    let ctx = ValidationContext::new(Action::Update, ["pets.name", "pets.age"]);

    let (_, pruned) = engine.validate(&json!({ "pets": [{ "name": "a", "age": 1 }] }), &ctx);
    assert_eq!(pruned["pets"], json!([{}]));
}

/// A top-level array of documents validates per element and keeps the
/// array shape.
#[test]
fn test_document_array_shape() {
    let registry = ModelRegistry::new();
    let model = registry.define(
        ModelDefinition::new("user", json!({ "name": { "type": "string", "required": true } }))
            .timestamps(false),
    );
    let engine = ValidationEngine::new(&model);
    let ctx = ValidationContext::new(Action::Insert, Vec::<String>::new());

    let (errors, pruned) = engine.validate(&json!([{ "name": "a" }, {}, { "name": "c" }]), &ctx);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].title, "1.name");
    assert_eq!(pruned.as_array().unwrap().len(), 3);
}

// =============================================================================
// Coercion
// =============================================================================

/// Parsing an already-parsed value is a no-op for every built-in
/// coercion.
#[test]
fn test_try_parse_is_idempotent() {
    let registry = docmap::rules::RuleRegistry::new();
    let cases = [
        ("isNumber", json!("42")),
        ("isInteger", json!("-7")),
        ("isDate", json!("2021-06-01T12:00:00Z")),
    ];
    for (rule, raw) in cases {
        let descriptor = registry.resolve(rule).unwrap();
        let once = descriptor.parse(&raw).unwrap();
        // Second application leaves the value alone.
        assert!(
            descriptor.parse(&once).is_none(),
            "{} re-parsed its own output",
            rule
        );
    }
}

/// Coerced values flow into later rule predicates and into the pruned
/// output.
#[test]
fn test_coercion_side_effects_reach_output() {
    let registry = ModelRegistry::new();
    let model = registry.define(
        ModelDefinition::new(
            "event",
            json!({ "at": { "type": "date" }, "count": { "type": "integer", "min": 1 } }),
        )
        .timestamps(false),
    );
    let engine = ValidationEngine::new(&model);
    let ctx = ValidationContext::new(Action::Insert, Vec::<String>::new());

    let (errors, pruned) = engine.validate(
        &json!({ "at": "2021-06-01T12:00:00Z", "count": "3" }),
        &ctx,
    );
    assert!(errors.is_empty());
    assert_eq!(pruned["at"], json!(1622548800000i64));
    assert_eq!(pruned["count"], json!(3));
}

// =============================================================================
// Rule Argument Errors
// =============================================================================

/// A rule given an argument of the wrong type surfaces its own message
/// text verbatim.
#[test]
fn test_typed_argument_misuse_propagates_verbatim() {
    let registry = ModelRegistry::new();
    let model = registry.define(
        ModelDefinition::new("user", json!({ "age": { "type": "number", "min": "ten" } }))
            .timestamps(false),
    );
    let engine = ValidationEngine::new(&model);
    let ctx = ValidationContext::new(Action::Insert, Vec::<String>::new());

    let (errors, _) = engine.validate(&json!({ "age": 5 }), &ctx);
    assert_eq!(errors.len(), 1);
    assert_eq!(errors[0].detail, "The min rule requires a numeric argument.");
}
