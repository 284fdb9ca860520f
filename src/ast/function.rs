use std::fmt;

use rust_decimal::Decimal;

use crate::{
    ast::{Node, OperationKind, Path, quote},
    functions::FunctionName,
};

/// Built-in function call on the value produced by the preceding parts.
///
/// # Examples
/// ```text
/// Equal("x")
/// Sum(10, $.extra)
/// First()
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Function {
    pub name: FunctionRef,
    pub parameters: Vec<Parameter>,
}

impl Node for Function {
    fn kind(&self) -> OperationKind {
        OperationKind::Function
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", self.name)?;
        for (i, param) in self.parameters.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{param}")?;
        }
        f.write_str(")")
    }
}

/// Resolved catalog entry, or the unknown name as written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunctionRef {
    Known(FunctionName),
    Unknown(String),
}

impl FunctionRef {
    pub fn is_valid(&self) -> bool {
        matches!(self, FunctionRef::Known(_))
    }
}

impl fmt::Display for FunctionRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FunctionRef::Known(name) => name.fmt(f),
            FunctionRef::Unknown(spelled) => f.write_str(spelled),
        }
    }
}

/// Function argument.
#[derive(Debug, Clone, PartialEq)]
pub enum Parameter {
    /// Numeric literal with the text it was written as
    Number { value: Decimal, text: String },
    String(String),
    Bool(bool),
    /// Nested path, evaluated against the same current/root pair as the call
    Path(Path),
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Parameter::Number { text, .. } => f.write_str(text),
            Parameter::String(s) => f.write_str(&quote(s)),
            Parameter::Bool(b) => write!(f, "{b}"),
            Parameter::Path(p) => p.fmt(f),
        }
    }
}
