use std::fmt;

use crate::{functions::FunctionName, typeahead::DataType};

/// Parameter type accepted at one position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Number,
    String,
    /// Number, string or bool
    Scalar,
}

impl ParamType {
    pub fn accepts(self, data: DataType) -> bool {
        match self {
            ParamType::Number => data == DataType::Number,
            ParamType::String => data == DataType::String,
            ParamType::Scalar => data.is_scalar(),
        }
    }
}

impl fmt::Display for ParamType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ParamType::Number => "number",
            ParamType::String => "string",
            ParamType::Scalar => "number, string or bool",
        })
    }
}

/// Parameter count and types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Arity {
    /// Exactly these parameters
    Fixed(&'static [ParamType]),
    /// At least `min` parameters, all of one type. Sequence-valued path
    /// parameters are flattened into repeated parameters.
    Variadic { min: usize, of: ParamType },
}

impl Arity {
    pub fn describe(&self) -> String {
        match self {
            Arity::Fixed(params) => params.len().to_string(),
            Arity::Variadic { min, .. } => format!("at least {min}"),
        }
    }

    /// Type expected at `index`, if that position exists.
    pub fn param_at(&self, index: usize) -> Option<ParamType> {
        match self {
            Arity::Fixed(params) => params.get(index).copied(),
            Arity::Variadic { of, .. } => Some(*of),
        }
    }

    pub fn accepts_count(&self, count: usize) -> bool {
        match self {
            Arity::Fixed(params) => params.len() == count,
            Arity::Variadic { min, .. } => count >= *min,
        }
    }
}

/// Values a function may be called on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubjectType {
    Any,
    /// A single number, string or bool
    Scalar,
    Number,
    String,
    /// A single number or a sequence of numbers
    Numbers,
    Sequence,
    SequenceOrRecord,
}

impl SubjectType {
    /// Whether a subject of `data` (a sequence when `array`) is accepted.
    /// Unknown subjects are accepted; nothing can be said about them.
    pub fn accepts(self, data: DataType, array: bool) -> bool {
        if data == DataType::Unknown {
            return true;
        }
        match self {
            SubjectType::Any => true,
            SubjectType::Scalar => !array && data.is_scalar(),
            SubjectType::Number => !array && data == DataType::Number,
            SubjectType::String => !array && data == DataType::String,
            SubjectType::Numbers => data == DataType::Number,
            SubjectType::Sequence => array,
            SubjectType::SequenceOrRecord => array || data == DataType::Record,
        }
    }
}

impl fmt::Display for SubjectType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SubjectType::Any => "any value",
            SubjectType::Scalar => "a number, string or bool",
            SubjectType::Number => "a number",
            SubjectType::String => "a string",
            SubjectType::Numbers => "a number or list of numbers",
            SubjectType::Sequence => "a list",
            SubjectType::SequenceOrRecord => "a list or record",
        })
    }
}

/// Static return type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReturnType {
    Bool,
    Number,
    String,
    /// One element of the subject list
    Element,
    /// Nothing is known about the result
    Unknown,
}

/// Validator-facing description of a catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionDescriptor {
    pub name: FunctionName,
    pub subject: SubjectType,
    pub arity: Arity,
    pub returns: ReturnType,
    /// The result is drawn from the subject, so its schema is known
    pub returns_known_values: bool,
}

const NONE: &[ParamType] = &[];
const ONE_SCALAR: &[ParamType] = &[ParamType::Scalar];
const ONE_NUMBER: &[ParamType] = &[ParamType::Number];
const ONE_STRING: &[ParamType] = &[ParamType::String];
const TWO_STRINGS: &[ParamType] = &[ParamType::String, ParamType::String];

const fn entry(
    name: FunctionName,
    subject: SubjectType,
    arity: Arity,
    returns: ReturnType,
) -> FunctionDescriptor {
    FunctionDescriptor {
        name,
        subject,
        arity,
        returns,
        returns_known_values: matches!(returns, ReturnType::Element),
    }
}

/// Catalog descriptor for a function.
pub const fn descriptor(name: FunctionName) -> FunctionDescriptor {
    use FunctionName as F;
    use ReturnType as R;
    use SubjectType as S;

    match name {
        F::Equal | F::NotEqual => entry(name, S::Scalar, Arity::Fixed(ONE_SCALAR), R::Bool),
        F::Less | F::LessOrEqual | F::Greater | F::GreaterOrEqual => {
            entry(name, S::Number, Arity::Fixed(ONE_NUMBER), R::Bool)
        }
        F::Contains | F::NotContains | F::Prefix | F::NotPrefix | F::Suffix | F::NotSuffix => {
            entry(name, S::String, Arity::Fixed(ONE_STRING), R::Bool)
        }
        F::AnyOf => entry(
            name,
            S::Scalar,
            Arity::Variadic {
                min: 1,
                of: ParamType::Scalar,
            },
            R::Bool,
        ),
        F::Count => entry(name, S::SequenceOrRecord, Arity::Fixed(NONE), R::Number),
        F::Any => entry(name, S::SequenceOrRecord, Arity::Fixed(NONE), R::Bool),
        F::First | F::Last => entry(name, S::Sequence, Arity::Fixed(NONE), R::Element),
        F::Index => entry(name, S::Sequence, Arity::Fixed(ONE_NUMBER), R::Element),
        F::Sum | F::Avg | F::Max | F::Min => entry(
            name,
            S::Numbers,
            Arity::Variadic {
                min: 0,
                of: ParamType::Number,
            },
            R::Number,
        ),
        F::Add | F::Sub | F::Div | F::Mul | F::Mod => {
            entry(name, S::Number, Arity::Fixed(ONE_NUMBER), R::Number)
        }
        F::TrimLeft | F::TrimRight | F::Left | F::Right => {
            entry(name, S::String, Arity::Fixed(ONE_NUMBER), R::String)
        }
        F::ReplaceAll | F::ReplaceRegex => {
            entry(name, S::String, Arity::Fixed(TWO_STRINGS), R::String)
        }
        F::DoesMatchRegex => entry(name, S::String, Arity::Fixed(ONE_STRING), R::Bool),
        F::ParseJson | F::ParseXml | F::ParseYaml | F::ParseToml => {
            entry(name, S::String, Arity::Fixed(NONE), R::Unknown)
        }
        F::AsJson => entry(name, S::Any, Arity::Fixed(NONE), R::String),
    }
}

/// Names of the functions callable on a subject of the given type, sorted.
pub fn callable_on(data: DataType, array: bool) -> Vec<String> {
    let mut names: Vec<String> = FunctionName::ALL
        .iter()
        .filter(|name| descriptor(**name).subject.accepts(data, array))
        .map(|name| name.as_str().to_string())
        .collect();
    names.sort();
    names
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn element_returns_are_known_values() {
        assert!(descriptor(FunctionName::First).returns_known_values);
        assert!(descriptor(FunctionName::Index).returns_known_values);
        assert!(!descriptor(FunctionName::ParseJson).returns_known_values);
        assert!(!descriptor(FunctionName::Count).returns_known_values);
    }

    #[test]
    fn callable_on_number_lists_includes_reductions_only() {
        let names = callable_on(DataType::Number, true);
        assert!(names.contains(&"Sum".to_string()));
        assert!(names.contains(&"First".to_string()));
        assert!(!names.contains(&"Add".to_string()));
        assert!(!names.contains(&"Equal".to_string()));
    }
}
