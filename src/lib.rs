//! # mpath
//!
//! A small typed path language for reading values out of JSON-like data,
//! with a static validator that checks queries against a structural schema
//! and produces typeahead metadata for query editors.
//!
//! ```
//! use mpath::{Engine, Record, Value};
//!
//! let data = Value::Record(Record::new().with("numbers", vec![3, 1, 2]));
//!
//! let engine = Engine::default();
//! let first_is_member = engine
//!     .evaluate("$.numbers.First().AnyOf($.numbers)", &data, &data)
//!     .unwrap();
//! assert_eq!(first_is_member, Value::Bool(true));
//! ```
//!
//! Parsing is strict about structure and lenient about names: a misspelled
//! function or `AND`/`OR` keyword still parses, is reported per node by the
//! validator and fails evaluation only when reached.

pub mod ast;
pub mod cache;
#[cfg(feature = "cli")]
pub mod cli;
pub mod codec;
pub mod config;
pub mod dependencies;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod functions;
pub mod lexer;
pub mod output;
pub mod parser;
pub mod schema;
pub mod typeahead;
pub mod validator;
pub mod value;

pub use ast::{Node, Operation, OperationKind, Token};
pub use cache::{BoundedCache, QueryCache, SchemaCache};
pub use codec::{CodecError, Codecs, Format, FormatCodec};
pub use config::Config;
pub use engine::{Engine, dependencies, evaluate, parse};
pub use error::{Error, Result};
pub use evaluator::{EvalError, Evaluator};
pub use functions::FunctionName;
pub use lexer::{Lexer, Position};
pub use output::{to_json, to_json_pretty};
pub use parser::{ParseError, Parser};
pub use schema::{SchemaDocument, SchemaError, SchemaKind, SchemaNode, SchemaValue};
pub use typeahead::{RuntimeDataMap, TypeaheadNode, Validation};
pub use validator::Validator;
pub use value::{Key, Record, Value, ValueError, ValueKind};
