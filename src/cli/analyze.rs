//! Validate queries against schemas and list their dependencies

use std::fs;

use crate::Engine;

use super::CliError;

/// Options for the validate command
#[derive(Debug, Clone, Default)]
pub struct ValidateOptions {
    pub query: String,
    /// Schema document text
    pub schema: String,
    /// Schema key the query feeds
    pub target: String,
    pub pretty: bool,
}

/// Schema text from an argument that is either inline JSON or a file path
pub fn load_schema(arg: &str) -> Result<String, CliError> {
    if arg.trim_start().starts_with('{') {
        Ok(arg.to_owned())
    } else {
        Ok(fs::read_to_string(arg)?)
    }
}

/// Validate a query; returns the validation result as JSON
pub fn execute_validate(engine: &Engine, options: &ValidateOptions) -> Result<String, CliError> {
    let validation = engine.validate(&options.query, &options.schema, &options.target)?;
    let json = if options.pretty {
        serde_json::to_string_pretty(&validation)?
    } else {
        serde_json::to_string(&validation)?
    };
    Ok(json)
}

/// Dependency chains of a query, one dot-joined chain per entry
pub fn execute_deps(engine: &Engine, query: &str) -> Result<Vec<String>, CliError> {
    Ok(engine
        .dependencies(query)?
        .into_iter()
        .map(|chain| chain.join("."))
        .collect())
}
