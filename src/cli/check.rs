//! Check and evaluate mpath queries against JSON input

use crate::{Engine, ast::Node};

use super::{CliError, parse_input, render};

/// Options for the eval and check commands
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    /// The mpath query to execute
    pub query: String,
    /// JSON input, bound to `@`
    pub input: Option<String>,
    /// JSON root document, bound to `$`; defaults to the input
    pub root: Option<String>,
    /// Pretty-print the output
    pub pretty: bool,
    /// Only validate syntax, don't execute
    pub syntax_only: bool,
}

/// Result of a check operation
#[derive(Debug, Clone, PartialEq)]
pub enum CheckResult {
    /// Syntax validation passed; holds the canonical query text
    SyntaxValid(String),
    /// Query executed successfully; holds the JSON output
    Success(String),
}

/// Execute an mpath check or eval operation
pub fn execute_check(engine: &Engine, options: &CheckOptions) -> Result<CheckResult, CliError> {
    let operation = engine.parse(&options.query)?;
    if options.syntax_only {
        return Ok(CheckResult::SyntaxValid(operation.render()));
    }

    let input = parse_input(options.input.as_deref().ok_or(CliError::NoInput)?)?;
    let root = match &options.root {
        Some(text) => parse_input(text)?,
        None => input.clone(),
    };

    let result = engine.evaluate(&options.query, &input, &root)?;
    Ok(CheckResult::Success(render(&result, options.pretty)))
}
