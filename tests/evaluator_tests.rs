// tests/evaluator_tests.rs

use std::collections::BTreeMap;
use std::str::FromStr;

use mpath::ast::{Filter, LogicalOperation, Operation, Path, PathIdent, PathPart};
use mpath::{Codecs, EvalError, Evaluator, Key, Record, Value, evaluate};
use rust_decimal::Decimal;

fn data(json: &str) -> Value {
    Value::from_json(serde_json::from_str(json).unwrap()).unwrap()
}

fn eval(query: &str, doc: &Value) -> Result<Value, String> {
    evaluate(query, doc, doc).map_err(|e| e.to_string())
}

fn eval_err(query: &str, doc: &Value) -> EvalError {
    match evaluate(query, doc, doc) {
        Err(mpath::Error::Eval(e)) => e,
        other => panic!("expected an evaluation error, got {other:?}"),
    }
}

fn dec(s: &str) -> Value {
    Value::Number(Decimal::from_str(s).unwrap())
}

fn list() -> Value {
    data(
        r#"{"list": [
            {"id": 0, "name": "a"},
            {"id": 1, "name": "b"},
            {"id": 2, "name": "c"},
            {"name": "no id"},
            {"id": 4, "name": "d"}
        ]}"#,
    )
}

// ============================================================================
// Field Access
// ============================================================================

#[test]
fn test_simple_field_access() {
    let doc = data(r#"{"user": {"name": "Alice"}}"#);
    assert_eq!(eval("$.user.name", &doc), Ok(Value::from("Alice")));
}

#[test]
fn test_field_names_ignore_case() {
    let doc = data(r#"{"User": {"Name": "Alice"}}"#);
    assert_eq!(eval("$.user.NAME", &doc), Ok(Value::from("Alice")));
}

#[test]
fn test_map_keys_are_looked_up_by_string_form() {
    let mut map = BTreeMap::new();
    map.insert(Key::from("Alpha"), Value::from(1));
    map.insert(Key::from(true), Value::from(2));
    let doc = Value::Record(Record::new().with("m", Value::Map(map)));

    assert_eq!(eval("$.m.alpha", &doc), Ok(Value::from(1)));
    assert_eq!(eval("$.m.true", &doc), Ok(Value::from(2)));
}

#[test]
fn test_broadcast_drops_elements_without_the_field() {
    assert_eq!(
        eval("$.list.id", &list()),
        Ok(Value::from(vec![0, 1, 2, 4]))
    );
}

#[test]
fn test_broadcast_sum_with_parameter() {
    assert_eq!(eval("$.list.id.Sum(10)", &list()), Ok(Value::from(17)));
}

#[test]
fn test_missing_key_is_distinct_from_type_errors() {
    let doc = data(r#"{"a": 1}"#);
    assert_eq!(eval_err("$.b", &doc), EvalError::KeyNotFound("b".to_string()));
    assert!(matches!(eval_err("$.a.b", &doc), EvalError::TypeError(_)));
    assert_eq!(
        eval_err("$.list.missing", &list()),
        EvalError::KeyNotFound("missing".to_string())
    );
}

#[test]
fn test_null_short_circuits_the_path() {
    let doc = data(r#"{"n": null}"#);
    assert_eq!(eval("$.n.x.y.Count()", &doc), Ok(Value::Null));
}

#[test]
fn test_current_and_root_are_separate() {
    let current = data(r#"{"x": "current"}"#);
    let root = data(r#"{"x": "root"}"#);
    assert_eq!(
        evaluate("@.x", &current, &root).unwrap(),
        Value::from("current")
    );
    assert_eq!(evaluate("$.x", &current, &root).unwrap(), Value::from("root"));
}

// ============================================================================
// Filters
// ============================================================================

#[test]
fn test_filter_sequence() {
    let doc = data(r#"{"list": [{"id": 1, "n": "a"}, {"id": 2, "n": "b"}, {"id": 3, "n": "c"}]}"#);
    assert_eq!(
        eval("$.list[@.id.Greater(1)].n", &doc),
        Ok(Value::from(vec!["b", "c"]))
    );
    assert_eq!(
        eval("$.list[@.id.Equal(2)].First().n", &doc),
        Ok(Value::from("b"))
    );
}

#[test]
fn test_filter_group_with_root_parameter() {
    let doc = data(r#"{"want": 3, "list": [{"id": 1}, {"id": 3}]}"#);
    assert_eq!(
        eval("$.list[{OR,@.id.Equal($.want),@.id.Equal(7)}].Count()", &doc),
        Ok(Value::from(1))
    );
}

#[test]
fn test_filter_record_passes_or_nulls() {
    let doc = data(r#"{"user": {"age": 30, "name": "Ann"}}"#);
    assert_eq!(
        eval("$.user[@.age.Greater(18)].name", &doc),
        Ok(Value::from("Ann"))
    );
    assert_eq!(eval("$.user[@.age.Greater(40)].name", &doc), Ok(Value::Null));
}

#[test]
fn test_filter_rejects_scalars() {
    let doc = data(r#"{"a": 1}"#);
    assert!(matches!(
        eval_err("$.a[@.Equal(1)]", &doc),
        EvalError::TypeError(_)
    ));
}

#[test]
fn test_root_in_filter_is_rejected_at_runtime() {
    let body = Path {
        parts: vec![PathPart::Ident(PathIdent::new("a"))],
        start_at_root: true,
        is_filter_body: true,
        must_end_in_predicate: true,
    };
    let query = Operation::Path(Path {
        parts: vec![
            PathPart::Ident(PathIdent::new("list")),
            PathPart::Filter(Filter {
                predicate: LogicalOperation::implicit(Operation::Path(body)),
            }),
        ],
        start_at_root: true,
        ..Path::default()
    });

    let doc = data(r#"{"a": true, "list": [1]}"#);
    let codecs = Codecs::default();
    assert_eq!(
        Evaluator::new(&codecs).evaluate(&query, &doc, &doc),
        Err(EvalError::RootInFilter)
    );
}

// ============================================================================
// Logical Operations
// ============================================================================

#[test]
fn test_nested_and_groups() {
    assert_eq!(
        eval("{AND,{AND,$.index.Equal(6)}}", &data(r#"{"index": 6}"#)),
        Ok(Value::Bool(true))
    );
    assert_eq!(
        eval("{AND,{AND,$.index.Equal(6)}}", &data(r#"{"index": 5}"#)),
        Ok(Value::Bool(false))
    );
}

#[test]
fn test_short_circuit_skips_failing_operands() {
    let doc = data(r#"{"a": 1}"#);
    assert_eq!(eval("{OR,$.a.Equal(1),$.missing.Equal(2)}", &doc), Ok(Value::Bool(true)));
    assert_eq!(eval("{AND,$.a.Equal(2),$.missing.Equal(2)}", &doc), Ok(Value::Bool(false)));
    assert_eq!(
        eval_err("{AND,$.a.Equal(1),$.missing.Equal(2)}", &doc),
        EvalError::KeyNotFound("missing".to_string())
    );
}

#[test]
fn test_non_boolean_operands_count_as_false() {
    let doc = data(r#"{"a": 1, "b": 1}"#);
    assert_eq!(eval("{AND,$.a}", &doc), Ok(Value::Bool(false)));
    assert_eq!(eval("{OR,$.a,$.b.Equal(1)}", &doc), Ok(Value::Bool(true)));
    assert_eq!(eval("{OR,$.a}", &doc), Ok(Value::Bool(false)));
}

#[test]
fn test_invalid_operator_fails_when_reached() {
    let doc = data(r#"{"a": 1}"#);
    assert_eq!(
        eval_err("{ANDD,$.a.Equal(1)}", &doc),
        EvalError::InvalidOperator("ANDD".to_string())
    );
}

// ============================================================================
// Functions
// ============================================================================

#[test]
fn test_unknown_function_fails_when_reached() {
    let doc = data(r#"{"a": 1}"#);
    let err = eval_err("$.a.Frist()", &doc);
    assert_eq!(err, EvalError::UnrecognisedFunction("Frist".to_string()));
    assert!(err.to_string().contains("unrecognised function"));
}

#[test]
fn test_function_errors_name_the_function() {
    let doc = data(r#"{"s": "text"}"#);
    let err = eval_err("$.s.Less(1)", &doc);
    let EvalError::Function { name, source } = &err else {
        panic!("expected a function error, got {err:?}");
    };
    assert_eq!(name, "Less");
    assert!(matches!(**source, EvalError::TypeError(_)));
}

#[test]
fn test_first_of_list_is_any_of_list() {
    let doc = data(r#"{"numbers": [3.5, 1, 2]}"#);
    assert_eq!(
        eval("$.numbers.First().AnyOf($.numbers)", &doc),
        Ok(Value::Bool(true))
    );
}

#[test]
fn test_sequence_parameters_flatten() {
    let doc = list();
    assert_eq!(eval("$.list.First().id.AnyOf($.list.id)", &doc), Ok(Value::Bool(true)));
    assert_eq!(eval("$.list.id.Sum($.list.id)", &doc), Ok(Value::from(14)));
}

#[test]
fn test_comparisons_accept_null_parameters() {
    let doc = data(r#"{"a": 1, "b": null, "xs": [null, 1]}"#);
    assert_eq!(eval("$.a.Equal($.b)", &doc), Ok(Value::Bool(false)));
    assert_eq!(eval("$.a.NotEqual($.b)", &doc), Ok(Value::Bool(true)));
    assert_eq!(eval("$.a.AnyOf($.b, 1)", &doc), Ok(Value::Bool(true)));
    assert_eq!(eval("$.a.AnyOf($.xs)", &doc), Ok(Value::Bool(true)));
    assert_eq!(eval("$.a.AnyOf($.b, 2)", &doc), Ok(Value::Bool(false)));
}

#[test]
fn test_decimal_arithmetic_is_exact() {
    let doc = data(r#"{"a": 0.1}"#);
    assert_eq!(eval("$.a.Add(0.2)", &doc), Ok(dec("0.3")));
    assert_eq!(eval("$.a.Add(0.2).Equal(0.3)", &doc), Ok(Value::Bool(true)));
}
