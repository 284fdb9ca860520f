// tests/function_tests.rs

use std::str::FromStr;
use std::sync::Arc;

use mpath::{
    CodecError, Codecs, Engine, EvalError, Format, FormatCodec, Record, Value, evaluate,
};
use rust_decimal::Decimal;

fn data(json: &str) -> Value {
    Value::from_json(serde_json::from_str(json).unwrap()).unwrap()
}

fn call(query: &str, json: &str) -> Result<Value, EvalError> {
    let doc = data(json);
    match evaluate(query, &doc, &doc) {
        Ok(value) => Ok(value),
        Err(mpath::Error::Eval(e)) => Err(e),
        Err(other) => panic!("unexpected error kind: {other}"),
    }
}

/// The error raised inside the named function.
fn inner_error(query: &str, json: &str, function: &str) -> EvalError {
    match call(query, json) {
        Err(EvalError::Function { name, source }) => {
            assert_eq!(name, function);
            *source
        }
        other => panic!("expected an error from {function}, got {other:?}"),
    }
}

fn dec(s: &str) -> Value {
    Value::Number(Decimal::from_str(s).unwrap())
}

// ============================================================================
// Comparison
// ============================================================================

#[test]
fn test_equality() {
    let json = r#"{"n": 1.50, "s": "x", "b": true}"#;
    assert_eq!(call("$.n.Equal(1.5)", json), Ok(Value::Bool(true)));
    assert_eq!(call("$.s.Equal('x')", json), Ok(Value::Bool(true)));
    assert_eq!(call("$.b.Equal(true)", json), Ok(Value::Bool(true)));
    assert_eq!(call("$.s.NotEqual('y')", json), Ok(Value::Bool(true)));
    assert_eq!(call("$.n.Equal('1.5')", json), Ok(Value::Bool(false)));
}

#[test]
fn test_ordering() {
    let json = r#"{"n": 5}"#;
    assert_eq!(call("$.n.Less(6)", json), Ok(Value::Bool(true)));
    assert_eq!(call("$.n.LessOrEqual(5)", json), Ok(Value::Bool(true)));
    assert_eq!(call("$.n.Greater(5)", json), Ok(Value::Bool(false)));
    assert_eq!(call("$.n.GreaterOrEqual(5)", json), Ok(Value::Bool(true)));
}

#[test]
fn test_ordering_rejects_string_parameters() {
    let err = inner_error("$.n.Less('6')", r#"{"n": 5}"#, "Less");
    assert!(matches!(err, EvalError::TypeError(_)));
}

#[test]
fn test_string_matching() {
    let json = r#"{"s": "abcDEF"}"#;
    assert_eq!(call("$.s.Contains('cD')", json), Ok(Value::Bool(true)));
    assert_eq!(call("$.s.NotContains('cD')", json), Ok(Value::Bool(false)));
    assert_eq!(call("$.s.Prefix('abc')", json), Ok(Value::Bool(true)));
    assert_eq!(call("$.s.NotPrefix('abc')", json), Ok(Value::Bool(false)));
    assert_eq!(call("$.s.Suffix('DEF')", json), Ok(Value::Bool(true)));
    assert_eq!(call("$.s.NotSuffix('def')", json), Ok(Value::Bool(true)));
}

#[test]
fn test_any_of_mixed_parameters() {
    let json = r#"{"s": "b", "n": 2, "opts": ["a", "b"]}"#;
    assert_eq!(call("$.s.AnyOf('a', 1, true)", json), Ok(Value::Bool(false)));
    assert_eq!(call("$.s.AnyOf($.opts)", json), Ok(Value::Bool(true)));
    assert_eq!(call("$.n.AnyOf(1, 2.0)", json), Ok(Value::Bool(true)));
}

// ============================================================================
// Sequences
// ============================================================================

#[test]
fn test_count_and_any() {
    let json = r#"{"l": [1, 2, 3], "empty": [], "r": {"a": 1, "b": 2}, "n": null}"#;
    assert_eq!(call("$.l.Count()", json), Ok(Value::from(3)));
    assert_eq!(call("$.r.Count()", json), Ok(Value::from(2)));
    assert_eq!(call("$.l.Any()", json), Ok(Value::Bool(true)));
    assert_eq!(call("$.empty.Any()", json), Ok(Value::Bool(false)));
    assert_eq!(call("$.empty.Count()", json), Ok(Value::from(0)));
}

#[test]
fn test_first_last_index() {
    let json = r#"{"l": ["a", "b", "c"], "empty": []}"#;
    assert_eq!(call("$.l.First()", json), Ok(Value::from("a")));
    assert_eq!(call("$.l.Last()", json), Ok(Value::from("c")));
    assert_eq!(call("$.l.Index(1)", json), Ok(Value::from("b")));
    assert_eq!(
        inner_error("$.l.Index(3)", json, "Index"),
        EvalError::IndexOutOfRange {
            index: "3".to_string(),
            len: 3
        }
    );
    assert!(matches!(
        inner_error("$.l.Index(0.5)", json, "Index"),
        EvalError::IndexOutOfRange { .. }
    ));
    assert_eq!(
        inner_error("$.empty.First()", json, "First"),
        EvalError::EmptySequence
    );
}

#[test]
fn test_first_needs_a_list() {
    let err = inner_error("$.s.First()", r#"{"s": "abc"}"#, "First");
    assert!(matches!(err, EvalError::TypeError(_)));
}

// ============================================================================
// Reductions and Arithmetic
// ============================================================================

#[test]
fn test_reductions() {
    let json = r#"{"l": [1, 2], "n": 4}"#;
    assert_eq!(call("$.l.Sum()", json), Ok(Value::from(3)));
    assert_eq!(call("$.l.Avg()", json), Ok(dec("1.5")));
    assert_eq!(call("$.l.Max(10)", json), Ok(Value::from(10)));
    assert_eq!(call("$.l.Min(0.5)", json), Ok(dec("0.5")));
    assert_eq!(call("$.n.Sum(1)", json), Ok(Value::from(5)));
    assert_eq!(call("$.l.Sum($.l, $.n)", json), Ok(Value::from(10)));
}

#[test]
fn test_reduction_rejects_non_numbers() {
    let err = inner_error("$.l.Sum()", r#"{"l": [1, "2"]}"#, "Sum");
    assert!(matches!(err, EvalError::TypeError(_)));
}

#[test]
fn test_arithmetic() {
    let json = r#"{"n": 7}"#;
    assert_eq!(call("$.n.Add(1)", json), Ok(Value::from(8)));
    assert_eq!(call("$.n.Sub(10)", json), Ok(Value::from(-3)));
    assert_eq!(call("$.n.Mul(0.5)", json), Ok(dec("3.5")));
    assert_eq!(call("$.n.Div(4)", json), Ok(dec("1.75")));
    assert_eq!(call("$.n.Mod(3)", json), Ok(Value::from(1)));
    assert_eq!(
        inner_error("$.n.Div(0)", json, "Div"),
        EvalError::DivisionByZero
    );
}

#[test]
fn test_aliases_and_case() {
    let json = r#"{"l": [2, 4], "n": 9}"#;
    assert_eq!(call("$.l.Average()", json), Ok(Value::from(3)));
    assert_eq!(call("$.l.maximum()", json), Ok(Value::from(4)));
    assert_eq!(call("$.n.Subtract(1)", json), Ok(Value::from(8)));
    assert_eq!(call("$.n.MODULO(4)", json), Ok(Value::from(1)));
    assert_eq!(call("$.n.equal(9)", json), Ok(Value::Bool(true)));
}

// ============================================================================
// Strings
// ============================================================================

#[test]
fn test_trim_and_slice() {
    let json = r#"{"s": "abcDEF"}"#;
    assert_eq!(call("$.s.TrimLeft(2)", json), Ok(Value::from("cDEF")));
    assert_eq!(call("$.s.TrimRight(2)", json), Ok(Value::from("abcD")));
    assert_eq!(call("$.s.Left(2)", json), Ok(Value::from("ab")));
    assert_eq!(call("$.s.Right(2)", json), Ok(Value::from("EF")));
    assert_eq!(call("$.s.Left(99)", json), Ok(Value::from("abcDEF")));
    assert_eq!(call("$.s.TrimLeft(-1)", json), Ok(Value::from("abcDEF")));
}

#[test]
fn test_slicing_counts_characters() {
    let json = r#"{"s": "héllo"}"#;
    assert_eq!(call("$.s.Left(2)", json), Ok(Value::from("hé")));
    assert_eq!(call("$.s.TrimRight(3)", json), Ok(Value::from("hé")));
}

#[test]
fn test_replacement() {
    let json = r#"{"s": "a1b22c"}"#;
    assert_eq!(call("$.s.ReplaceAll('b', 'B')", json), Ok(Value::from("a1B22c")));
    assert_eq!(call("$.s.ReplaceRegex('[0-9]+', '#')", json), Ok(Value::from("a#b#c")));
    assert_eq!(call("$.s.DoesMatchRegex('^a[0-9]')", json), Ok(Value::Bool(true)));
    assert_eq!(call("$.s.DoesMatchRegex('^[0-9]')", json), Ok(Value::Bool(false)));
}

#[test]
fn test_invalid_regex() {
    let err = inner_error("$.s.DoesMatchRegex('(')", r#"{"s": "x"}"#, "DoesMatchRegex");
    assert!(matches!(err, EvalError::Regex(_)));
}

// ============================================================================
// Arity and Parameter Types
// ============================================================================

#[test]
fn test_arity_is_checked() {
    assert_eq!(
        inner_error("$.n.Add()", r#"{"n": 1}"#, "Add"),
        EvalError::Arity {
            expected: "1".to_string(),
            found: 0
        }
    );
    assert_eq!(
        inner_error("$.s.AnyOf()", r#"{"s": "a"}"#, "AnyOf"),
        EvalError::Arity {
            expected: "at least 1".to_string(),
            found: 0
        }
    );
}

#[test]
fn test_fixed_arity_counts_flattened_values() {
    let err = inner_error("$.n.Add($.l)", r#"{"n": 1, "l": [1, 2]}"#, "Add");
    assert_eq!(
        err,
        EvalError::Arity {
            expected: "1".to_string(),
            found: 2
        }
    );
}

#[test]
fn test_parameter_types_are_checked() {
    let err = inner_error("$.n.Add('x')", r#"{"n": 1}"#, "Add");
    assert!(matches!(err, EvalError::TypeError(_)));
}

// ============================================================================
// Codecs
// ============================================================================

#[test]
fn test_parse_json() {
    let json = r#"{"s": "{\"a\": {\"b\": 2.50}}"}"#;
    assert_eq!(call("$.s.ParseJSON().a.b", json), Ok(dec("2.5")));
}

#[test]
fn test_parse_toml() {
    let json = r#"{"s": "name = 'x'\ncount = 3"}"#;
    assert_eq!(call("$.s.ParseTOML().count", json), Ok(Value::from(3)));
    assert_eq!(call("$.s.parsetoml().name", json), Ok(Value::from("x")));
}

#[test]
fn test_parse_xml() {
    let json = r#"{"s": "<order><item>a</item><item>b</item></order>"}"#;
    assert_eq!(
        call("$.s.ParseXML().order.item", json),
        Ok(Value::from(vec!["a", "b"]))
    );
}

#[test]
fn test_malformed_documents() {
    let err = inner_error("$.s.ParseJSON()", r#"{"s": "{"}"#, "ParseJSON");
    assert!(matches!(
        err,
        EvalError::Codec(CodecError::Parse {
            format: Format::Json,
            ..
        })
    ));
}

#[test]
fn test_yaml_needs_a_registered_codec() {
    let err = inner_error("$.s.ParseYAML()", r#"{"s": "a: 1"}"#, "ParseYAML");
    assert_eq!(err, EvalError::Codec(CodecError::Missing(Format::Yaml)));
}

struct FixedYaml;

impl FormatCodec for FixedYaml {
    fn format(&self) -> Format {
        Format::Yaml
    }

    fn parse(&self, text: &str) -> Result<Value, CodecError> {
        Ok(Value::Record(Record::new().with("text", text)))
    }
}

#[test]
fn test_registered_yaml_codec_is_used() {
    let engine = Engine::default().with_codecs(Codecs::default().with_codec(Arc::new(FixedYaml)));
    let doc = data(r#"{"s": "a: 1"}"#);
    assert_eq!(
        engine.evaluate("$.s.ParseYAML().text", &doc, &doc).unwrap(),
        Value::from("a: 1")
    );
}

#[test]
fn test_as_json_sorts_keys() {
    let json = r#"{"r": {"b": 1.10, "a": ["x", null, false]}}"#;
    assert_eq!(
        call("$.r.AsJSON()", json),
        Ok(Value::from(r#"{"a":["x",null,false],"b":1.10}"#))
    );
}
