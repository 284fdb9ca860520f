//! # mpath - Operation Tree
//!
//! This module defines the operation tree produced by the parser for mpath, a
//! small typed path language for reading values out of JSON-like data.
//!
//! ## Architecture Overview
//!
//! - **[tokens]** - Lexical tokens produced by the lexer
//! - **[path]** - Paths and the field identifiers they are built from
//! - **[filter]** - Per-element predicates (`[...]`)
//! - **[logical]** - AND/OR groups (`{AND,...}`)
//! - **[function]** - Built-in function calls and their parameters
//!
//! ## Quick Start
//!
//! ```text
//! $.list[@.id.Equal(1)].First().name
//! ```
//!
//! Starting at the root document, this selects `list`, keeps the elements
//! whose `id` equals 1, takes the first of them and reads its `name`.
//!
//! ## Core Concepts
//!
//! ### Roots
//!
//! - `$` - the original root document
//! - `@` - the value at the current point; inside a filter, the element under test
//!
//! ### Node kinds
//!
//! Every query is either a [`Path`] or a [`LogicalOperation`]. Paths are built
//! from [`PathIdent`], [`Filter`] and [`Function`] parts. Each node renders back
//! to a canonical string through `Display` and reports its [`OperationKind`].
//!
//! ### Invalid markers
//!
//! Misspelled `AND`/`OR` keywords and unknown function names parse
//! successfully. The node carries an invalid marker instead, which the
//! validator reports per node and the evaluator rejects when reached.
//!
//! ## Examples
//!
//! ### Broadcast field access
//!
//! ```text
//! $.list.id.Sum()
//! ```
//!
//! ### Logical groups
//!
//! ```text
//! {OR,$.status.Equal("open"),{AND,$.age.Greater(18),$.verified.Equal(true)}}
//! ```
pub mod filter;
pub mod function;
pub mod logical;
pub mod path;
pub mod tokens;

use std::fmt;

pub use filter::Filter;
pub use function::{Function, FunctionRef, Parameter};
pub use logical::{LogicalOperation, LogicalOperator};
pub use path::{Path, PathIdent, PathPart};
pub use tokens::Token;

/// Variant tag shared by every node of the operation tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Path,
    PathIdent,
    Filter,
    LogicalOperation,
    Function,
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            OperationKind::Path => "Path",
            OperationKind::PathIdent => "PathIdent",
            OperationKind::Filter => "Filter",
            OperationKind::LogicalOperation => "LogicalOperation",
            OperationKind::Function => "Function",
        };
        f.write_str(name)
    }
}

/// Common contract of operation tree nodes: a variant tag and a canonical
/// rendering (through `Display`).
pub trait Node: fmt::Display {
    fn kind(&self) -> OperationKind;

    /// Canonical text of this node. Re-parsing it yields an equivalent tree.
    fn render(&self) -> String {
        self.to_string()
    }
}

/// A complete query, or an operand of a logical group.
#[derive(Debug, Clone, PartialEq)]
pub enum Operation {
    Path(Path),
    Logical(LogicalOperation),
}

impl Node for Operation {
    fn kind(&self) -> OperationKind {
        match self {
            Operation::Path(p) => p.kind(),
            Operation::Logical(l) => l.kind(),
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Operation::Path(p) => p.fmt(f),
            Operation::Logical(l) => l.fmt(f),
        }
    }
}

/// Quotes a string literal using the escapes the lexer understands.
pub(crate) fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            '\0' => out.push_str("\\0"),
            c if c.is_control() => out.push_str(&format!("\\u{:04x}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
    out
}
