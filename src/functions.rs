//! Built-in function catalog.
//!
//! Every function is called on a subject (the value produced by the path so
//! far) with zero or more parameters. [`catalog`] describes each entry's
//! accepted subject, parameter signature and return type for the validator;
//! [`builtins`] holds the evaluation semantics.
//!
//! Names are matched case-insensitively and several entries have aliases
//! (`Avg`/`Average`, `Sub`/`Subtract`, ...). An unknown name is not a parse
//! error: the call node keeps it as [`FunctionRef::Unknown`](crate::ast::FunctionRef).

pub mod builtins;
pub mod catalog;

use std::fmt;

pub use catalog::{Arity, FunctionDescriptor, ParamType, ReturnType, SubjectType, descriptor};

/// Catalog entry names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FunctionName {
    // Equality
    Equal,
    NotEqual,

    // Ordering
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,

    // String match
    Contains,
    NotContains,
    Prefix,
    NotPrefix,
    Suffix,
    NotSuffix,

    // Set membership
    AnyOf,

    // Sequence query
    Count,
    Any,
    First,
    Last,
    Index,

    // Reduction
    Sum,
    Avg,
    Max,
    Min,

    // Arithmetic
    Add,
    Sub,
    Div,
    Mul,
    Mod,

    // String transform
    TrimLeft,
    TrimRight,
    Left,
    Right,
    ReplaceAll,
    ReplaceRegex,
    DoesMatchRegex,

    // Format codecs
    ParseJson,
    ParseXml,
    ParseYaml,
    ParseToml,
    AsJson,
}

impl FunctionName {
    pub const ALL: &'static [FunctionName] = &[
        FunctionName::Equal,
        FunctionName::NotEqual,
        FunctionName::Less,
        FunctionName::LessOrEqual,
        FunctionName::Greater,
        FunctionName::GreaterOrEqual,
        FunctionName::Contains,
        FunctionName::NotContains,
        FunctionName::Prefix,
        FunctionName::NotPrefix,
        FunctionName::Suffix,
        FunctionName::NotSuffix,
        FunctionName::AnyOf,
        FunctionName::Count,
        FunctionName::Any,
        FunctionName::First,
        FunctionName::Last,
        FunctionName::Index,
        FunctionName::Sum,
        FunctionName::Avg,
        FunctionName::Max,
        FunctionName::Min,
        FunctionName::Add,
        FunctionName::Sub,
        FunctionName::Div,
        FunctionName::Mul,
        FunctionName::Mod,
        FunctionName::TrimLeft,
        FunctionName::TrimRight,
        FunctionName::Left,
        FunctionName::Right,
        FunctionName::ReplaceAll,
        FunctionName::ReplaceRegex,
        FunctionName::DoesMatchRegex,
        FunctionName::ParseJson,
        FunctionName::ParseXml,
        FunctionName::ParseYaml,
        FunctionName::ParseToml,
        FunctionName::AsJson,
    ];

    /// Canonical spelling.
    pub fn as_str(self) -> &'static str {
        match self {
            FunctionName::Equal => "Equal",
            FunctionName::NotEqual => "NotEqual",
            FunctionName::Less => "Less",
            FunctionName::LessOrEqual => "LessOrEqual",
            FunctionName::Greater => "Greater",
            FunctionName::GreaterOrEqual => "GreaterOrEqual",
            FunctionName::Contains => "Contains",
            FunctionName::NotContains => "NotContains",
            FunctionName::Prefix => "Prefix",
            FunctionName::NotPrefix => "NotPrefix",
            FunctionName::Suffix => "Suffix",
            FunctionName::NotSuffix => "NotSuffix",
            FunctionName::AnyOf => "AnyOf",
            FunctionName::Count => "Count",
            FunctionName::Any => "Any",
            FunctionName::First => "First",
            FunctionName::Last => "Last",
            FunctionName::Index => "Index",
            FunctionName::Sum => "Sum",
            FunctionName::Avg => "Avg",
            FunctionName::Max => "Max",
            FunctionName::Min => "Min",
            FunctionName::Add => "Add",
            FunctionName::Sub => "Sub",
            FunctionName::Div => "Div",
            FunctionName::Mul => "Mul",
            FunctionName::Mod => "Mod",
            FunctionName::TrimLeft => "TrimLeft",
            FunctionName::TrimRight => "TrimRight",
            FunctionName::Left => "Left",
            FunctionName::Right => "Right",
            FunctionName::ReplaceAll => "ReplaceAll",
            FunctionName::ReplaceRegex => "ReplaceRegex",
            FunctionName::DoesMatchRegex => "DoesMatchRegex",
            FunctionName::ParseJson => "ParseJSON",
            FunctionName::ParseXml => "ParseXML",
            FunctionName::ParseYaml => "ParseYAML",
            FunctionName::ParseToml => "ParseTOML",
            FunctionName::AsJson => "AsJSON",
        }
    }

    /// Case-insensitive lookup, including aliases.
    pub fn lookup(name: &str) -> Option<FunctionName> {
        let alias = match name.to_ascii_lowercase().as_str() {
            "average" => Some(FunctionName::Avg),
            "maximum" => Some(FunctionName::Max),
            "minimum" => Some(FunctionName::Min),
            "subtract" => Some(FunctionName::Sub),
            "divide" => Some(FunctionName::Div),
            "multiply" => Some(FunctionName::Mul),
            "modulo" => Some(FunctionName::Mod),
            _ => None,
        };
        alias.or_else(|| {
            Self::ALL
                .iter()
                .copied()
                .find(|f| f.as_str().eq_ignore_ascii_case(name))
        })
    }
}

impl fmt::Display for FunctionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
