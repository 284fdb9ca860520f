//! CLI support for mpath
//!
//! Provides programmatic access to the `mpath` command's operations for
//! embedding in other tools.

mod analyze;
mod check;
mod convert;

pub use analyze::{ValidateOptions, execute_deps, execute_validate, load_schema};
pub use check::{CheckOptions, CheckResult, execute_check};
pub use convert::{parse_input, render};

use std::io;

use tracing_subscriber::EnvFilter;

use crate::{evaluator::EvalError, parser::ParseError, schema::SchemaError, value::ValueError};

/// Errors that can occur during CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error(transparent)]
    Mpath(#[from] crate::Error),

    #[error("invalid JSON input: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("no input provided, use --input or pipe JSON to stdin")]
    NoInput,

    #[error("invalid log level filter '{0}'")]
    LogLevel(String),
}

impl From<ParseError> for CliError {
    fn from(e: ParseError) -> Self {
        CliError::Mpath(e.into())
    }
}

impl From<EvalError> for CliError {
    fn from(e: EvalError) -> Self {
        CliError::Mpath(e.into())
    }
}

impl From<SchemaError> for CliError {
    fn from(e: SchemaError) -> Self {
        CliError::Mpath(e.into())
    }
}

impl From<ValueError> for CliError {
    fn from(e: ValueError) -> Self {
        CliError::Mpath(e.into())
    }
}

/// Installs the stderr log subscriber.
///
/// Uses `RUST_LOG` if set, otherwise falls back to `log_level`.
pub fn init_tracing(log_level: &str) -> Result<(), CliError> {
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else {
        EnvFilter::try_new(log_level).map_err(|_| CliError::LogLevel(log_level.to_owned()))?
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    Ok(())
}
