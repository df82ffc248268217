//! Differences between dialects, exercised through the public API.
use polydraft::{Draft, Validator};
use serde_json::{json, Value};
use test_case::test_case;

fn compile(draft: Draft, schema: &Value) -> Validator {
    Validator::options()
        .with_draft(draft)
        .compile(schema)
        .expect("Is a valid schema")
}

#[test]
fn schema_declaration_beats_the_default() {
    let schema = json!({
        "$schema": "http://json-schema.org/draft-04/schema#",
        "type": "integer"
    });
    let validator = Validator::compile(&schema).expect("Is a valid schema");
    assert_eq!(validator.draft(), Draft::Draft4);
    // Draft 4 integers are strict
    assert!(!validator.is_valid(&json!(1.0)));
}

#[test_case(Draft::Draft3)]
#[test_case(Draft::Draft4)]
fn boolean_exclusive_bounds(draft: Draft) {
    let schema = json!({"maximum": 10, "exclusiveMaximum": true});
    let validator = compile(draft, &schema);
    assert!(validator.is_valid(&json!(9)));
    assert!(!validator.is_valid(&json!(10)));
}

#[test_case(Draft::Draft6)]
#[test_case(Draft::Draft7)]
#[test_case(Draft::Draft201909)]
#[test_case(Draft::Draft202012)]
#[test_case(Draft::DraftNext)]
fn numeric_exclusive_bounds(draft: Draft) {
    let schema = json!({"exclusiveMaximum": 10});
    let validator = compile(draft, &schema);
    assert!(validator.is_valid(&json!(9)));
    assert!(!validator.is_valid(&json!(10)));
}

#[test]
fn divisible_by_is_multiple_of() {
    let validator = compile(Draft::Draft3, &json!({"divisibleBy": 3}));
    assert!(validator.is_valid(&json!(9)));
    assert!(!validator.is_valid(&json!(10)));
    // And it does not exist past draft 3
    let validator = compile(Draft::Draft4, &json!({"divisibleBy": 3}));
    assert!(validator.is_valid(&json!(10)));
}

#[test]
fn dual_shape_items_against_2020_12_split() {
    let tuple = json!({"items": [{"type": "integer"}], "additionalItems": {"type": "string"}});
    let validator = compile(Draft::Draft7, &tuple);
    assert!(validator.is_valid(&json!([1, "a"])));
    assert!(!validator.is_valid(&json!([1, 2])));

    let split = json!({"prefixItems": [{"type": "integer"}], "items": {"type": "string"}});
    let validator = compile(Draft::Draft202012, &split);
    assert!(validator.is_valid(&json!([1, "a"])));
    assert!(!validator.is_valid(&json!([1, 2])));
}

#[test]
fn id_keyword_spelling() {
    // Draft 4 reads `id`, later drafts `$id`
    let schema = json!({
        "id": "http://example.com/root",
        "properties": {"a": {"$ref": "#/definitions/x"}},
        "definitions": {"x": {"type": "null"}}
    });
    let validator = compile(Draft::Draft4, &schema);
    assert!(validator.is_valid(&json!({"a": null})));
    assert!(!validator.is_valid(&json!({"a": 1})));
}

#[test]
fn content_keywords_assert_only_in_draft_7() {
    let schema = json!({"contentEncoding": "base64"});
    assert!(!compile(Draft::Draft7, &schema).is_valid(&json!("***")));
    for draft in [Draft::Draft201909, Draft::Draft202012, Draft::DraftNext] {
        assert!(compile(draft, &schema).is_valid(&json!("***")));
    }
}

#[test]
fn unevaluated_requires_2019_09() {
    let schema = json!({"unevaluatedProperties": false});
    assert!(compile(Draft::Draft7, &schema).is_valid(&json!({"a": 1})));
    assert!(!compile(Draft::Draft201909, &schema).is_valid(&json!({"a": 1})));
}

#[test]
fn draft_next_resolves_its_meta_schema() {
    let schema = json!({
        "$schema": "https://json-schema.org/draft/next/schema",
        "propertyDependencies": {"kind": {"file": {"required": ["path"]}}}
    });
    let validator = Validator::compile(&schema).expect("Is a valid schema");
    assert_eq!(validator.draft(), Draft::DraftNext);
    assert!(!validator.is_valid(&json!({"kind": "file"})));
    assert!(validator.is_valid(&json!({"kind": "file", "path": "/x"})));
}

#[test]
fn vocabulary_listing_per_draft() {
    let uris: Vec<&str> = Draft::Draft202012
        .vocabularies()
        .into_iter()
        .map(|(_, uri)| uri)
        .collect();
    assert!(uris.contains(&"https://json-schema.org/draft/2020-12/vocab/unevaluated"));
    assert!(uris.contains(&"https://json-schema.org/draft/2020-12/vocab/format-annotation"));
    let uris: Vec<&str> = Draft::Draft7
        .vocabularies()
        .into_iter()
        .map(|(_, uri)| uri)
        .collect();
    // Pre-2019 drafts have a single identifier for everything
    assert!(uris.iter().all(|uri| *uri == "http://json-schema.org/draft-07/schema"));
}

#[test]
fn older_drafts_resolve_their_meta_schemas_offline() {
    for (draft, meta) in [
        (Draft::Draft4, "http://json-schema.org/draft-04/schema#"),
        (Draft::Draft6, "http://json-schema.org/draft-06/schema#"),
        (Draft::Draft7, "http://json-schema.org/draft-07/schema#"),
    ] {
        let schema = json!({"$ref": meta});
        let validator = compile(draft, &schema);
        assert!(
            validator.is_valid(&json!({"minLength": 1})),
            "{:?} meta-schema rejects a valid schema",
            draft
        );
        assert!(
            !validator.is_valid(&json!({"minLength": -1})),
            "{:?} meta-schema accepts a broken schema",
            draft
        );
    }
}
