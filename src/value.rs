use std::{collections::BTreeMap, fmt, str::FromStr};

use rust_decimal::Decimal;

/// A dynamic value produced and consumed by mpath evaluation.
///
/// The variant fixes the container capability of a value once: records answer
/// field lookups, maps answer key lookups, sequences expose their elements.
/// Every number is held as an exact [`Decimal`]; native floats never appear.
///
/// # Examples
///
/// ```
/// use mpath::{Record, Value};
///
/// let item = Value::Record(Record::new().with("id", 1).with("name", "first"));
/// let list = Value::Sequence(vec![item.clone(), item]);
///
/// assert_eq!(list.kind(), mpath::ValueKind::Sequence);
/// assert!(!list.is_zero());
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Absent value
    #[default]
    Null,

    /// Boolean
    Bool(bool),

    /// Exact decimal number
    Number(Decimal),

    /// UTF-8 string
    String(String),

    /// Named fields in declaration order
    Record(Record),

    /// Keyed entries whose keys are convertible to strings
    Map(BTreeMap<Key, Value>),

    /// Ordered elements
    Sequence(Vec<Value>),
}

/// The container shape of a [`Value`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueKind {
    Null,
    Bool,
    Number,
    String,
    Record,
    Map,
    Sequence,
}

impl fmt::Display for ValueKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ValueKind::Null => "null",
            ValueKind::Bool => "bool",
            ValueKind::Number => "number",
            ValueKind::String => "string",
            ValueKind::Record => "record",
            ValueKind::Map => "map",
            ValueKind::Sequence => "sequence",
        };
        f.write_str(name)
    }
}

/// A map key. Lookups compare against the key's string form.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Key {
    Bool(bool),
    Number(Decimal),
    String(String),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Bool(b) => write!(f, "{b}"),
            Key::Number(n) => write!(f, "{n}"),
            Key::String(s) => f.write_str(s),
        }
    }
}

impl From<&str> for Key {
    fn from(s: &str) -> Self {
        Key::String(s.to_string())
    }
}

impl From<String> for Key {
    fn from(s: String) -> Self {
        Key::String(s)
    }
}

impl From<i64> for Key {
    fn from(n: i64) -> Self {
        Key::Number(Decimal::from(n))
    }
}

impl From<bool> for Key {
    fn from(b: bool) -> Self {
        Key::Bool(b)
    }
}

/// Struct-like value with named fields kept in insertion order.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Record {
    fields: Vec<(String, Value)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts a field, replacing an existing field with the exact same name.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        let value = value.into();
        match self.fields.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = value,
            None => self.fields.push((name, value)),
        }
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.fields.iter().map(|(n, v)| (n.as_str(), v))
    }
}

impl FromIterator<(String, Value)> for Record {
    fn from_iter<I: IntoIterator<Item = (String, Value)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (name, value) in iter {
            record.insert(name, value);
        }
        record
    }
}

/// Values that expose named fields.
pub trait RecordLike {
    /// Case-insensitive field lookup; an exact match wins over a folded one.
    fn field(&self, name: &str) -> Option<&Value>;

    fn field_names(&self) -> Vec<&str>;

    /// True when every field holds its zero value.
    fn is_zero_record(&self) -> bool;
}

/// Values that expose entries under keys convertible to strings.
pub trait MapLike {
    /// Case-insensitive lookup against each key's string form.
    fn lookup(&self, name: &str) -> Option<&Value>;
}

/// Values that expose an ordered run of elements.
pub trait SequenceLike {
    fn elements(&self) -> &[Value];
}

impl RecordLike for Record {
    fn field(&self, name: &str) -> Option<&Value> {
        self.fields
            .iter()
            .find(|(n, _)| n == name)
            .or_else(|| self.fields.iter().find(|(n, _)| fold_eq(n, name)))
            .map(|(_, v)| v)
    }

    fn field_names(&self) -> Vec<&str> {
        self.fields.iter().map(|(n, _)| n.as_str()).collect()
    }

    fn is_zero_record(&self) -> bool {
        self.fields.iter().all(|(_, v)| v.is_zero())
    }
}

impl MapLike for BTreeMap<Key, Value> {
    fn lookup(&self, name: &str) -> Option<&Value> {
        let mut folded = None;
        for (key, value) in self {
            let key = key.to_string();
            if key == name {
                return Some(value);
            }
            if folded.is_none() && fold_eq(&key, name) {
                folded = Some(value);
            }
        }
        folded
    }
}

impl SequenceLike for Vec<Value> {
    fn elements(&self) -> &[Value] {
        self
    }
}

/// Unicode-aware case-insensitive comparison.
pub(crate) fn fold_eq(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b)
        || a.chars()
            .flat_map(char::to_lowercase)
            .eq(b.chars().flat_map(char::to_lowercase))
}

impl Value {
    pub fn kind(&self) -> ValueKind {
        match self {
            Value::Null => ValueKind::Null,
            Value::Bool(_) => ValueKind::Bool,
            Value::Number(_) => ValueKind::Number,
            Value::String(_) => ValueKind::String,
            Value::Record(_) => ValueKind::Record,
            Value::Map(_) => ValueKind::Map,
            Value::Sequence(_) => ValueKind::Sequence,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Zero-ness: null, false, 0, "", empty containers, and records whose
    /// fields are all zero.
    pub fn is_zero(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Bool(b) => !b,
            Value::Number(n) => n.is_zero(),
            Value::String(s) => s.is_empty(),
            Value::Record(r) => r.is_zero_record(),
            Value::Map(m) => m.is_empty(),
            Value::Sequence(s) => s.is_empty(),
        }
    }

    pub fn as_decimal(&self) -> Option<Decimal> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_record(&self) -> Option<&dyn RecordLike> {
        match self {
            Value::Record(r) => Some(r),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&dyn MapLike> {
        match self {
            Value::Map(m) => Some(m),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(s) => Some(s.elements()),
            _ => None,
        }
    }

    /// Converts parsed JSON, keeping every number as the exact decimal
    /// written in the source text.
    pub fn from_json(json: serde_json::Value) -> Result<Value, ValueError> {
        Ok(match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => Value::Number(parse_decimal(&n.to_string())?),
            serde_json::Value::String(s) => Value::String(s),
            serde_json::Value::Array(items) => Value::Sequence(
                items
                    .into_iter()
                    .map(Value::from_json)
                    .collect::<Result<_, _>>()?,
            ),
            serde_json::Value::Object(obj) => Value::Record(
                obj.into_iter()
                    .map(|(k, v)| Value::from_json(v).map(|v| (k, v)))
                    .collect::<Result<_, _>>()?,
            ),
        })
    }
}

/// Errors raised while building values from external data.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValueError {
    /// The number does not fit the exact decimal representation
    #[error("number '{0}' cannot be represented as an exact decimal")]
    NumberOutOfRange(String),
}

/// Parses decimal text, accepting scientific notation.
pub fn parse_decimal(text: &str) -> Result<Decimal, ValueError> {
    Decimal::from_str(text)
        .or_else(|_| Decimal::from_scientific(text))
        .map_err(|_| ValueError::NumberOutOfRange(text.to_string()))
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<Decimal> for Value {
    fn from(n: Decimal) -> Self {
        Value::Number(n)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(Decimal::from(n))
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(Decimal::from(n))
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(Decimal::from(n))
    }
}

impl From<usize> for Value {
    fn from(n: usize) -> Self {
        Value::Number(Decimal::from(n))
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Value::Record(r)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::Sequence(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map_or(Value::Null, Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_lookup_prefers_exact_then_folds_case() {
        let record = Record::new().with("Name", "upper").with("name", "lower");
        assert_eq!(record.field("name"), Some(&Value::from("lower")));
        assert_eq!(record.field("NAME"), Some(&Value::from("upper")));
        assert_eq!(record.field("missing"), None);
    }

    #[test]
    fn map_lookup_uses_key_string_form() {
        let mut map = BTreeMap::new();
        map.insert(Key::from(7), Value::from("seven"));
        map.insert(Key::from(true), Value::from("yes"));
        map.insert(Key::from("Label"), Value::from("x"));

        assert_eq!(map.lookup("7"), Some(&Value::from("seven")));
        assert_eq!(map.lookup("TRUE"), Some(&Value::from("yes")));
        assert_eq!(map.lookup("label"), Some(&Value::from("x")));
    }

    #[test]
    fn zero_record_is_all_zero_fields() {
        let zero = Record::new().with("a", 0).with("b", "").with("c", false);
        assert!(Value::Record(zero).is_zero());

        let nonzero = Record::new().with("a", 0).with("b", "x");
        assert!(!Value::Record(nonzero).is_zero());
    }

    #[test]
    fn json_numbers_stay_exact() {
        let json: serde_json::Value = serde_json::from_str(r#"{"a": 0.1, "b": 1e3, "c": [2]}"#).unwrap();
        let value = Value::from_json(json).unwrap();
        let Value::Record(record) = value else {
            panic!("expected record");
        };
        assert_eq!(record.field("a"), Some(&Value::Number(Decimal::from_str("0.1").unwrap())));
        assert_eq!(record.field("b"), Some(&Value::from(1000)));
        assert_eq!(record.field("c"), Some(&Value::from(vec![2])));
    }
}
