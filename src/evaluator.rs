use tracing::trace;

use crate::{
    ast::{
        Filter, Function, FunctionRef, LogicalOperation, LogicalOperator, Operation, Parameter,
        Path, PathIdent, PathPart,
    },
    codec::{CodecError, Codecs},
    functions::builtins,
    value::{Value, ValueKind},
};

/// Errors that can occur during evaluation.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    /// Field absent from a record or map, or from every element of a list
    #[error("key not found: '{0}'")]
    KeyNotFound(String),

    /// Value of the wrong kind for the operation
    #[error("type error: {0}")]
    TypeError(String),

    #[error("cannot use '$' (root) inside filter")]
    RootInFilter,

    #[error("unrecognised function '{0}'")]
    UnrecognisedFunction(String),

    #[error("unrecognised logical operator '{0}'")]
    InvalidOperator(String),

    /// Failure inside a function call
    #[error("{name}: {source}")]
    Function {
        name: String,
        source: Box<EvalError>,
    },

    #[error("expected {expected} parameters, got {found}")]
    Arity { expected: String, found: usize },

    #[error("index {index} out of range for list of length {len}")]
    IndexOutOfRange { index: String, len: usize },

    #[error("list is empty")]
    EmptySequence,

    #[error("division by zero")]
    DivisionByZero,

    #[error("numeric overflow")]
    Overflow,

    #[error("invalid regular expression: {0}")]
    Regex(String),

    #[error(transparent)]
    Codec(#[from] CodecError),
}

/// Evaluates operation trees against a current value and a root value.
///
/// Trees are immutable, so one tree may be evaluated by many evaluators at
/// once.
#[derive(Debug, Clone, Copy)]
pub struct Evaluator<'a> {
    codecs: &'a Codecs,
}

impl<'a> Evaluator<'a> {
    pub fn new(codecs: &'a Codecs) -> Self {
        Evaluator { codecs }
    }

    /// Evaluates a query. `@` reads `current`, `$` reads `root`.
    ///
    /// # Examples
    ///
    /// ```
    /// use mpath::{Codecs, Record, Value, parse};
    /// use mpath::evaluator::Evaluator;
    ///
    /// let data = Value::Record(Record::new().with("index", 6));
    /// let query = parse("{AND,{AND,$.index.Equal(6)}}").unwrap();
    ///
    /// let codecs = Codecs::default();
    /// let result = Evaluator::new(&codecs).evaluate(&query, &data, &data).unwrap();
    /// assert_eq!(result, Value::Bool(true));
    /// ```
    pub fn evaluate(
        &self,
        operation: &Operation,
        current: &Value,
        root: &Value,
    ) -> Result<Value, EvalError> {
        match operation {
            Operation::Path(path) => self.eval_path(path, current, root),
            Operation::Logical(logical) => self.eval_logical(logical, current, root),
        }
    }

    pub fn eval_path(&self, path: &Path, current: &Value, root: &Value) -> Result<Value, EvalError> {
        trace!(path = %path, "evaluating path");

        let mut value = if path.start_at_root {
            if path.is_filter_body {
                return Err(EvalError::RootInFilter);
            }
            root.clone()
        } else {
            current.clone()
        };

        for part in &path.parts {
            if value.is_null() {
                return Ok(Value::Null);
            }
            value = match part {
                PathPart::Ident(ident) => self.eval_ident(ident, value)?,
                PathPart::Filter(filter) => self.eval_filter(filter, value, root)?,
                PathPart::Function(func) => self.eval_function(func, value, current, root)?,
            };
        }
        Ok(value)
    }

    fn eval_ident(&self, ident: &PathIdent, value: Value) -> Result<Value, EvalError> {
        let name = ident.name.as_str();
        match &value {
            Value::Record(_) | Value::Map(_) => {
                lookup(&value, name).ok_or_else(|| EvalError::KeyNotFound(name.to_string()))
            }
            Value::Sequence(items) => {
                let found: Vec<Value> = items.iter().filter_map(|item| lookup(item, name)).collect();
                if found.is_empty() {
                    return Err(EvalError::KeyNotFound(name.to_string()));
                }
                Ok(Value::Sequence(found))
            }
            other => Err(EvalError::TypeError(format!(
                "cannot read field '{name}' of a {}",
                other.kind()
            ))),
        }
    }

    fn eval_filter(&self, filter: &Filter, value: Value, root: &Value) -> Result<Value, EvalError> {
        match value {
            Value::Sequence(items) => {
                let mut kept = Vec::new();
                for item in items {
                    if self.eval_logical(&filter.predicate, &item, root)? == Value::Bool(true) {
                        kept.push(item);
                    }
                }
                Ok(Value::Sequence(kept))
            }
            record @ (Value::Record(_) | Value::Map(_)) => {
                if self.eval_logical(&filter.predicate, &record, root)? == Value::Bool(true) {
                    Ok(record)
                } else {
                    Ok(Value::Null)
                }
            }
            other => Err(EvalError::TypeError(format!(
                "cannot filter a {}",
                other.kind()
            ))),
        }
    }

    /// AND stops at the first operand that is not `true`, OR at the first
    /// that is. Non-boolean results count as false.
    pub fn eval_logical(
        &self,
        logical: &LogicalOperation,
        current: &Value,
        root: &Value,
    ) -> Result<Value, EvalError> {
        let is_and = match &logical.operator {
            LogicalOperator::And => true,
            LogicalOperator::Or => false,
            LogicalOperator::Invalid(spelled) => {
                return Err(EvalError::InvalidOperator(spelled.clone()));
            }
        };

        for operand in &logical.operands {
            let holds = self.evaluate(operand, current, root)? == Value::Bool(true);
            if is_and && !holds {
                return Ok(Value::Bool(false));
            }
            if !is_and && holds {
                return Ok(Value::Bool(true));
            }
        }
        Ok(Value::Bool(is_and))
    }

    fn eval_function(
        &self,
        func: &Function,
        subject: Value,
        current: &Value,
        root: &Value,
    ) -> Result<Value, EvalError> {
        let name = match &func.name {
            FunctionRef::Known(name) => *name,
            FunctionRef::Unknown(spelled) => {
                return Err(EvalError::UnrecognisedFunction(spelled.clone()));
            }
        };

        let mut params = Vec::with_capacity(func.parameters.len());
        for parameter in &func.parameters {
            match parameter {
                Parameter::Number { value, .. } => params.push(Value::Number(*value)),
                Parameter::String(s) => params.push(Value::String(s.clone())),
                Parameter::Bool(b) => params.push(Value::Bool(*b)),
                Parameter::Path(path) => match self.eval_path(path, current, root)? {
                    Value::Sequence(items) => params.extend(items),
                    value => params.push(value),
                },
            }
        }

        trace!(function = %name, subject = %subject.kind(), params = params.len(), "calling function");
        builtins::call(name, subject, &params, func.parameters.len(), self.codecs).map_err(|e| {
            EvalError::Function {
                name: name.to_string(),
                source: Box::new(e),
            }
        })
    }
}

/// Case-insensitive field or key lookup on a record or map.
fn lookup(value: &Value, name: &str) -> Option<Value> {
    match value.kind() {
        ValueKind::Record => value.as_record()?.field(name).cloned(),
        ValueKind::Map => value.as_map()?.lookup(name).cloned(),
        _ => None,
    }
}
