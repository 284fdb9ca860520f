//! Evaluation semantics of the catalog.

use regex::Regex;
use rust_decimal::{Decimal, prelude::ToPrimitive};

use crate::{
    codec::{Codecs, Format},
    evaluator::EvalError,
    functions::{Arity, FunctionName, ParamType, descriptor},
    value::Value,
};

/// Calls `name` on `subject`.
///
/// `params` holds the parameter values after sequence-valued paths have been
/// flattened; `declared` is the number of parameters written in the query,
/// which is what arity is checked against.
pub fn call(
    name: FunctionName,
    subject: Value,
    params: &[Value],
    declared: usize,
    codecs: &Codecs,
) -> Result<Value, EvalError> {
    let arity = descriptor(name).arity;
    if !arity.accepts_count(declared) {
        return Err(EvalError::Arity {
            expected: arity.describe(),
            found: declared,
        });
    }
    // A path parameter may flatten into more or fewer values than written.
    if let Arity::Fixed(expected) = arity
        && params.len() != expected.len()
    {
        return Err(EvalError::Arity {
            expected: arity.describe(),
            found: params.len(),
        });
    }
    check_param_types(&arity, params)?;

    use FunctionName as F;
    match name {
        F::Equal => Ok(Value::Bool(values_equal(&subject, &params[0]))),
        F::NotEqual => Ok(Value::Bool(!values_equal(&subject, &params[0]))),

        F::Less => compare(&subject, &params[0], |a, b| a < b),
        F::LessOrEqual => compare(&subject, &params[0], |a, b| a <= b),
        F::Greater => compare(&subject, &params[0], |a, b| a > b),
        F::GreaterOrEqual => compare(&subject, &params[0], |a, b| a >= b),

        F::Contains => match_text(&subject, &params[0], |s, p| s.contains(p)),
        F::NotContains => match_text(&subject, &params[0], |s, p| !s.contains(p)),
        F::Prefix => match_text(&subject, &params[0], |s, p| s.starts_with(p)),
        F::NotPrefix => match_text(&subject, &params[0], |s, p| !s.starts_with(p)),
        F::Suffix => match_text(&subject, &params[0], |s, p| s.ends_with(p)),
        F::NotSuffix => match_text(&subject, &params[0], |s, p| !s.ends_with(p)),

        F::AnyOf => Ok(Value::Bool(params.iter().any(|p| values_equal(&subject, p)))),

        F::Count => count(&subject),
        F::Any => any(&subject),
        F::First => sequence(&subject)?
            .first()
            .cloned()
            .ok_or(EvalError::EmptySequence),
        F::Last => sequence(&subject)?
            .last()
            .cloned()
            .ok_or(EvalError::EmptySequence),
        F::Index => index(&subject, &params[0]),

        F::Sum | F::Avg | F::Max | F::Min => reduce(name, &subject, params),

        F::Add => arithmetic(&subject, &params[0], Decimal::checked_add),
        F::Sub => arithmetic(&subject, &params[0], Decimal::checked_sub),
        F::Mul => arithmetic(&subject, &params[0], Decimal::checked_mul),
        F::Div => divide(&subject, &params[0], Decimal::checked_div),
        F::Mod => divide(&subject, &params[0], Decimal::checked_rem),

        F::TrimLeft => slice(&subject, &params[0], |s, n| s.chars().skip(n).collect()),
        F::TrimRight => slice(&subject, &params[0], |s, n| {
            let len = s.chars().count();
            s.chars().take(len - n).collect()
        }),
        F::Left => slice(&subject, &params[0], |s, n| s.chars().take(n).collect()),
        F::Right => slice(&subject, &params[0], |s, n| {
            let len = s.chars().count();
            s.chars().skip(len - n).collect()
        }),
        F::ReplaceAll => {
            let s = text(&subject)?;
            Ok(Value::String(s.replace(text(&params[0])?, text(&params[1])?)))
        }
        F::ReplaceRegex => {
            let s = text(&subject)?;
            let re = regex(text(&params[0])?)?;
            Ok(Value::String(
                re.replace_all(s, text(&params[1])?).into_owned(),
            ))
        }
        F::DoesMatchRegex => {
            let s = text(&subject)?;
            let re = regex(text(&params[0])?)?;
            Ok(Value::Bool(re.is_match(s)))
        }

        F::ParseJson => Ok(codecs.parse(Format::Json, text(&subject)?)?),
        F::ParseXml => Ok(codecs.parse(Format::Xml, text(&subject)?)?),
        F::ParseYaml => Ok(codecs.parse(Format::Yaml, text(&subject)?)?),
        F::ParseToml => Ok(codecs.parse(Format::Toml, text(&subject)?)?),
        F::AsJson => Ok(Value::String(codecs.as_json(&subject))),
    }
}

fn check_param_types(arity: &Arity, params: &[Value]) -> Result<(), EvalError> {
    for (i, param) in params.iter().enumerate() {
        let Some(expected) = arity.param_at(i) else {
            continue;
        };
        let ok = match expected {
            ParamType::Number => matches!(param, Value::Number(_)),
            ParamType::String => matches!(param, Value::String(_)),
            ParamType::Scalar => matches!(
                param,
                Value::Number(_) | Value::String(_) | Value::Bool(_) | Value::Null
            ),
        };
        if !ok {
            return Err(EvalError::TypeError(format!(
                "parameter {} must be {expected}, got {}",
                i + 1,
                param.kind()
            )));
        }
    }
    Ok(())
}

/// Numbers compare by decimal value, everything else natively. Values of
/// different kinds are never equal.
pub fn values_equal(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x == y,
        (Value::String(x), Value::String(y)) => x == y,
        (Value::Bool(x), Value::Bool(y)) => x == y,
        (Value::Null, Value::Null) => true,
        _ => false,
    }
}

fn number(value: &Value) -> Result<Decimal, EvalError> {
    value
        .as_decimal()
        .ok_or_else(|| EvalError::TypeError(format!("expected a number, got {}", value.kind())))
}

fn text(value: &Value) -> Result<&str, EvalError> {
    value
        .as_str()
        .ok_or_else(|| EvalError::TypeError(format!("expected a string, got {}", value.kind())))
}

fn sequence(value: &Value) -> Result<&[Value], EvalError> {
    value
        .as_sequence()
        .ok_or_else(|| EvalError::TypeError(format!("expected a list, got {}", value.kind())))
}

fn regex(pattern: &str) -> Result<Regex, EvalError> {
    Regex::new(pattern).map_err(|e| EvalError::Regex(e.to_string()))
}

fn compare(
    subject: &Value,
    param: &Value,
    op: fn(&Decimal, &Decimal) -> bool,
) -> Result<Value, EvalError> {
    Ok(Value::Bool(op(&number(subject)?, &number(param)?)))
}

fn match_text(
    subject: &Value,
    param: &Value,
    op: fn(&str, &str) -> bool,
) -> Result<Value, EvalError> {
    Ok(Value::Bool(op(text(subject)?, text(param)?)))
}

fn count(subject: &Value) -> Result<Value, EvalError> {
    let n = match subject {
        Value::Null => 0,
        Value::Sequence(items) => items.len(),
        Value::Record(record) => record.len(),
        Value::Map(map) => map.len(),
        other => {
            return Err(EvalError::TypeError(format!(
                "cannot count a {}",
                other.kind()
            )));
        }
    };
    Ok(Value::from(n))
}

/// Non-emptiness for sequences and maps. A record answers with its own
/// zero-ness instead.
fn any(subject: &Value) -> Result<Value, EvalError> {
    match subject {
        Value::Null => Ok(Value::Bool(false)),
        Value::Sequence(items) => Ok(Value::Bool(!items.is_empty())),
        Value::Map(map) => Ok(Value::Bool(!map.is_empty())),
        Value::Record(_) => Ok(Value::Bool(subject.is_zero())),
        other => Err(EvalError::TypeError(format!(
            "Any() needs a list or record, got {}",
            other.kind()
        ))),
    }
}

fn index(subject: &Value, param: &Value) -> Result<Value, EvalError> {
    let items = sequence(subject)?;
    let n = number(param)?;
    let out_of_range = || EvalError::IndexOutOfRange {
        index: n.to_string(),
        len: items.len(),
    };
    if !n.fract().is_zero() {
        return Err(out_of_range());
    }
    let i = n.to_usize().ok_or_else(out_of_range)?;
    items.get(i).cloned().ok_or_else(out_of_range)
}

fn reduce(name: FunctionName, subject: &Value, params: &[Value]) -> Result<Value, EvalError> {
    let mut pool = match subject {
        Value::Sequence(items) => items.iter().map(number).collect::<Result<Vec<_>, _>>()?,
        other => vec![number(other)?],
    };
    for param in params {
        pool.push(number(param)?);
    }

    let (first, rest) = match pool.split_first() {
        None => return Ok(Value::Number(Decimal::ZERO)),
        Some((first, [])) => return Ok(Value::Number(*first)),
        Some(split) => split,
    };

    let result = match name {
        FunctionName::Max => rest.iter().fold(*first, |acc, n| acc.max(*n)),
        FunctionName::Min => rest.iter().fold(*first, |acc, n| acc.min(*n)),
        FunctionName::Avg => {
            let sum = checked_sum(*first, rest)?;
            sum.checked_div(Decimal::from(pool.len()))
                .ok_or(EvalError::Overflow)?
        }
        _ => checked_sum(*first, rest)?,
    };
    Ok(Value::Number(result))
}

fn checked_sum(first: Decimal, rest: &[Decimal]) -> Result<Decimal, EvalError> {
    rest.iter().try_fold(first, |acc, n| {
        acc.checked_add(*n).ok_or(EvalError::Overflow)
    })
}

fn arithmetic(
    subject: &Value,
    param: &Value,
    op: fn(Decimal, Decimal) -> Option<Decimal>,
) -> Result<Value, EvalError> {
    op(number(subject)?, number(param)?)
        .map(Value::Number)
        .ok_or(EvalError::Overflow)
}

fn divide(
    subject: &Value,
    param: &Value,
    op: fn(Decimal, Decimal) -> Option<Decimal>,
) -> Result<Value, EvalError> {
    let divisor = number(param)?;
    if divisor.is_zero() {
        return Err(EvalError::DivisionByZero);
    }
    arithmetic(subject, param, op)
}

/// Applies `op` with `n` clamped to the string's length in characters.
fn slice(subject: &Value, param: &Value, op: fn(&str, usize) -> String) -> Result<Value, EvalError> {
    let s = text(subject)?;
    let n = number(param)?.trunc();
    let len = s.chars().count();
    let n = if n.is_sign_negative() {
        0
    } else {
        n.to_usize().map_or(len, |n| n.min(len))
    };
    Ok(Value::String(op(s, n)))
}
