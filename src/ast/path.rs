use std::fmt;

use crate::ast::{Filter, Function, Node, OperationKind};

/// A chain of parts starting at the root (`$`) or the current value (`@`).
///
/// # Example
/// ```text
/// $.list[@.active.Equal(true)].Count()
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Path {
    pub parts: Vec<PathPart>,

    /// Start from the root document (`$`) instead of the current value (`@`)
    pub start_at_root: bool,

    /// Operand of a filter body; root access is forbidden
    pub is_filter_body: bool,

    /// Operand of a logical group; the last part must yield a single boolean
    pub must_end_in_predicate: bool,
}

impl Node for Path {
    fn kind(&self) -> OperationKind {
        OperationKind::Path
    }
}

impl fmt::Display for Path {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(if self.start_at_root { "$" } else { "@" })?;
        for part in &self.parts {
            match part {
                PathPart::Ident(ident) => write!(f, ".{ident}")?,
                PathPart::Function(func) => write!(f, ".{func}")?,
                PathPart::Filter(filter) => write!(f, "{filter}")?,
            }
        }
        Ok(())
    }
}

/// One step of a [`Path`].
#[derive(Debug, Clone, PartialEq)]
pub enum PathPart {
    Ident(PathIdent),
    Filter(Filter),
    Function(Function),
}

impl PathPart {
    pub fn kind(&self) -> OperationKind {
        match self {
            PathPart::Ident(i) => i.kind(),
            PathPart::Filter(f) => f.kind(),
            PathPart::Function(f) => f.kind(),
        }
    }
}

impl fmt::Display for PathPart {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathPart::Ident(i) => i.fmt(f),
            PathPart::Filter(filter) => filter.fmt(f),
            PathPart::Function(func) => func.fmt(f),
        }
    }
}

/// Field name, matched case-insensitively against record fields and map keys.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PathIdent {
    pub name: String,
}

impl PathIdent {
    pub fn new(name: impl Into<String>) -> Self {
        PathIdent { name: name.into() }
    }
}

impl Node for PathIdent {
    fn kind(&self) -> OperationKind {
        OperationKind::PathIdent
    }
}

impl fmt::Display for PathIdent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}
