// tests/validator_tests.rs

use mpath::typeahead::{DataType, ResolvedType};
use mpath::{Engine, Error, SchemaError, TypeaheadNode, Validation};

const SCHEMA: &str = r#"{
    "Orders": {"type": {"kind": "list", "element": {"kind": "record", "fields": {
        "id": "number",
        "name": "string",
        "tags": {"kind": "list", "element": "string"},
        "meta": {"kind": "record", "fields": {"code": "string"}}
    }}}},
    "Customer": {"type": {"kind": "record", "fields": {
        "name": "string",
        "age": "number",
        "flags": {"kind": "list", "element": "bool"}
    }}},
    "Payload": {"type": "string"},
    "Extra": {"type": "any"},
    "Count": {"type": "number"},
    "Out": {"type": "bool", "requires": ["Orders"]},
    "Next": {"type": "number", "requires": ["Out"]}
}"#;

fn validate(query: &str) -> Validation {
    Engine::default().validate(query, SCHEMA, "Out").unwrap()
}

fn errors(query: &str) -> Vec<String> {
    validate(query)
        .typeahead
        .errors()
        .into_iter()
        .map(String::from)
        .collect()
}

fn resolved(query: &str) -> Option<ResolvedType> {
    let validation = validate(query);
    assert!(
        validation.typeahead.is_valid(),
        "{query}: {:?}",
        validation.typeahead.errors()
    );
    validation.typeahead.resolved
}

fn single(data_type: DataType) -> Option<ResolvedType> {
    Some(ResolvedType::single(data_type))
}

fn array(data_type: DataType) -> Option<ResolvedType> {
    Some(ResolvedType::array(data_type))
}

// ============================================================================
// Field Resolution
// ============================================================================

#[test]
fn test_record_fields() {
    assert_eq!(resolved("$.Customer.name"), single(DataType::String));
    assert_eq!(resolved("$.customer.AGE"), single(DataType::Number));
    assert_eq!(resolved("$.Customer.flags"), array(DataType::Bool));
}

#[test]
fn test_list_fields_broadcast() {
    assert_eq!(resolved("$.Orders"), array(DataType::Record));
    assert_eq!(resolved("$.Orders.name"), array(DataType::String));
    assert_eq!(resolved("$.Orders.meta.code"), array(DataType::String));
}

#[test]
fn test_second_array_is_rejected() {
    assert_eq!(
        errors("$.Orders.tags"),
        vec!["cannot address into an array a second time"]
    );
}

#[test]
fn test_unknown_fields_stay_unknown() {
    assert_eq!(resolved("$.Extra.a.b"), single(DataType::Unknown));
}

#[test]
fn test_missing_field_marks_the_rest_unreachable() {
    let validation = validate("$.Customer.nope.Count()");
    let parts = &validation.typeahead.parts;
    assert_eq!(parts.len(), 3);
    assert_eq!(parts[1].error.as_deref(), Some("field nope does not exist"));
    assert_eq!(
        parts[2].error.as_deref(),
        Some("cannot continue due to previous error")
    );
    assert_eq!(parts[2].string, "Count()");
    assert_eq!(validation.typeahead.resolved, None);
}

#[test]
fn test_scalar_has_no_fields() {
    assert_eq!(
        errors("$.Payload.length"),
        vec!["cannot address 'length' into string"]
    );
}

// ============================================================================
// Blocked Fields and Required Data
// ============================================================================

#[test]
fn test_target_and_dependents_are_blocked() {
    assert_eq!(errors("$.Out"), vec!["field Out is not available"]);
    assert_eq!(errors("$.next.Add(1)"), vec![
        "field next is not available",
        "cannot continue due to previous error"
    ]);
    assert!(validate("$.Orders.Count()").typeahead.is_valid());
}

#[test]
fn test_blocked_fields_still_count_as_required() {
    assert_eq!(validate("$.Next").data_map.required_data, vec!["Next"]);
}

#[test]
fn test_required_data_collects_root_fields() {
    let validation = validate("{OR,@.Count.Equal(1),$.Customer.age.Greater($.Count)}");
    assert!(validation.typeahead.is_valid());
    assert_eq!(validation.data_map.required_data, vec!["Count", "Customer"]);
}

#[test]
fn test_filter_fields_are_not_required() {
    let validation = validate("$.Orders[@.id.Greater(1)].name");
    assert_eq!(validation.data_map.required_data, vec!["Orders"]);
}

#[test]
fn test_unknown_target() {
    let err = Engine::default()
        .validate("$.Orders", SCHEMA, "Missing")
        .unwrap_err();
    assert_eq!(
        err,
        Error::Schema(SchemaError::UnknownTarget("Missing".to_string()))
    );
}

// ============================================================================
// Functions
// ============================================================================

#[test]
fn test_function_return_types() {
    assert_eq!(resolved("$.Orders.id.Sum()"), single(DataType::Number));
    assert_eq!(resolved("$.Orders.First().meta.code"), single(DataType::String));
    assert_eq!(resolved("$.Orders.Index(0).id"), single(DataType::Number));
    assert_eq!(resolved("$.Customer.name.AsJSON()"), single(DataType::String));
    assert_eq!(resolved("$.Customer.name.AnyOf($.Orders.name)"), single(DataType::Bool));
}

#[test]
fn test_wrong_subject_continues_with_return_type() {
    let validation = validate("$.Customer.name.Sum().Add(1)");
    assert_eq!(
        validation.typeahead.errors(),
        vec!["Sum cannot be called on string, it needs a number or list of numbers"]
    );
    assert_eq!(validation.typeahead.resolved, single(DataType::Number));
}

#[test]
fn test_function_errors_are_joined() {
    assert_eq!(
        errors("$.Customer.name.Add('x', 2)"),
        vec![
            "Add cannot be called on string, it needs a number; \
             Add takes 1 parameters, got 2; \
             parameter 1 of Add must be number, got string"
        ]
    );
}

#[test]
fn test_fixed_parameters_must_be_single() {
    assert_eq!(
        errors("$.Customer.age.Add($.Orders.id)"),
        vec!["parameter 1 of Add must be a single number, got list of number"]
    );
}

#[test]
fn test_unknown_function_breaks_the_chain() {
    assert_eq!(
        errors("$.Customer.name.Frist().x"),
        vec![
            "unknown function 'Frist'",
            "cannot continue due to previous error"
        ]
    );
}

#[test]
fn test_opaque_results_cannot_be_addressed() {
    assert_eq!(
        errors("$.Payload.ParseJSON().a"),
        vec!["cannot address 'a' into a function result of unknown type"]
    );
    assert_eq!(resolved("$.Payload.ParseJSON()"), single(DataType::Unknown));
}

// ============================================================================
// Filters and Groups
// ============================================================================

#[test]
fn test_filter_keeps_the_list_type() {
    assert_eq!(
        resolved("$.Orders[@.id.Greater(1)].name"),
        array(DataType::String)
    );
    assert_eq!(
        resolved("$.Orders[{OR,@.name.Prefix('a'),@.meta.code.Equal($.Customer.name)}]"),
        array(DataType::Record)
    );
}

#[test]
fn test_filter_needs_a_list() {
    assert_eq!(
        errors("$.Customer[@.age.Greater(1)]"),
        vec!["filter needs a list, got record"]
    );
}

#[test]
fn test_group_operands_must_be_predicates() {
    assert_eq!(
        errors("{AND,$.Customer.age}"),
        vec!["path must end in a predicate returning a single bool, got number"]
    );
    assert_eq!(
        errors("{OR,$.Customer.flags}"),
        vec!["path must end in a predicate returning a single bool, got list of bool"]
    );
    assert_eq!(
        errors("{AND,$.Extra.flag}"),
        vec!["path must end in a predicate returning a single bool, got unknown"]
    );
}

#[test]
fn test_opaque_results_are_not_predicates() {
    assert_eq!(
        errors("{AND,$.Payload.ParseJSON()}"),
        vec!["path must end in a predicate returning a single bool, got unknown"]
    );
    assert_eq!(
        errors("$.Orders[@.name.ParseJSON()]"),
        vec!["path must end in a predicate returning a single bool, got unknown"]
    );
    assert!(validate("{AND,$.Payload.ParseJSON().Equal('x')}").typeahead.is_valid());
}

#[test]
fn test_filter_body_must_be_a_predicate() {
    assert_eq!(
        errors("$.Orders[@.id]"),
        vec!["path must end in a predicate returning a single bool, got number"]
    );
}

#[test]
fn test_invalid_operator_is_reported_on_the_group() {
    let validation = validate("{ANDD,$.Customer.age.Equal(1)}");
    assert_eq!(
        validation.typeahead.error.as_deref(),
        Some("unknown logical operator 'ANDD'")
    );
    assert!(validation.typeahead.parts[0].is_valid());
}

// ============================================================================
// Typeahead Output
// ============================================================================

fn part<'a>(node: &'a TypeaheadNode, index: usize) -> &'a TypeaheadNode {
    &node.parts[index]
}

#[test]
fn test_available_suggestions() {
    let validation = validate("$.Customer");
    let customer = part(&validation.typeahead, 0);
    let available = customer.available.as_ref().unwrap();
    assert_eq!(available.fields, vec!["age", "flags", "name"]);
    assert!(!available.filters);

    let validation = validate("$.Orders");
    let available = part(&validation.typeahead, 0).available.as_ref().unwrap();
    assert!(available.filters);
    assert_eq!(
        available.functions,
        vec!["Any", "AsJSON", "Count", "First", "Index", "Last"]
    );
}

#[test]
fn test_serialized_shape() {
    let validation = validate("$.Customer.name");
    let json = serde_json::to_value(&validation).unwrap();

    assert_eq!(json["dataMap"]["string"], "$.Customer.name");
    assert_eq!(json["dataMap"]["requiredData"], serde_json::json!(["Customer"]));
    assert_eq!(json["typeahead"]["string"], "$.Customer.name");
    assert_eq!(
        json["typeahead"]["parts"][1]["type"],
        serde_json::json!({"dataType": "string"})
    );
    assert!(json["typeahead"].get("error").is_none());
}
