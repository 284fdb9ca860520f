//! Entry points with caching.

use std::sync::Arc;

use tracing::debug;

use crate::{
    ast::Operation,
    cache::{QueryCache, SchemaCache},
    codec::Codecs,
    config::Config,
    dependencies::dependencies as collect_chains,
    error::Result,
    evaluator::Evaluator,
    parser::{self, ParseError},
    schema::SchemaDocument,
    typeahead::Validation,
    validator::Validator,
    value::Value,
};

/// Parses, evaluates and validates queries, caching parsed trees by query
/// text and compiled schemas by schema text.
///
/// An `Engine` is `Send + Sync`; share one across threads behind an `Arc`.
///
/// # Examples
///
/// ```
/// use mpath::{Engine, Record, Value};
///
/// let engine = Engine::default();
/// let data = Value::Record(Record::new().with("list", vec![
///     Value::Record(Record::new().with("id", 1).with("name", "first")),
///     Value::Record(Record::new().with("id", 2).with("name", "second")),
/// ]));
///
/// let name = engine.evaluate("$.list[@.id.Equal(2)].First().name", &data, &data).unwrap();
/// assert_eq!(name, Value::from("second"));
/// ```
#[derive(Debug)]
pub struct Engine {
    queries: QueryCache,
    schemas: SchemaCache,
    codecs: Codecs,
}

impl Default for Engine {
    fn default() -> Self {
        Engine::new(Config::default())
    }
}

impl Engine {
    pub fn new(config: Config) -> Self {
        Engine {
            queries: QueryCache::new(config.query_cache_capacity),
            schemas: SchemaCache::new(config.schema_cache_capacity),
            codecs: Codecs::default(),
        }
    }

    /// Replaces the codec registry, e.g. to add a YAML codec.
    pub fn with_codecs(mut self, codecs: Codecs) -> Self {
        self.codecs = codecs;
        self
    }

    pub fn codecs(&self) -> &Codecs {
        &self.codecs
    }

    /// Parses `text`, reusing the cached tree when there is one.
    pub fn parse(&self, text: &str) -> std::result::Result<Arc<Operation>, ParseError> {
        if let Some(operation) = self.queries.get(text) {
            debug!(query = text, "query cache hit");
            return Ok(operation);
        }
        debug!(query = text, "query cache miss");
        let operation = parser::parse(text)?;
        Ok(self.queries.insert(text, operation))
    }

    /// Evaluates `text` with `@` bound to `current` and `$` to `root`.
    pub fn evaluate(&self, text: &str, current: &Value, root: &Value) -> Result<Value> {
        let operation = self.parse(text)?;
        Ok(Evaluator::new(&self.codecs).evaluate(&operation, current, root)?)
    }

    /// Validates `text` against `schema_text` on behalf of `target`, the
    /// schema key the query will feed.
    pub fn validate(&self, text: &str, schema_text: &str, target: &str) -> Result<Validation> {
        let operation = self.parse(text)?;
        let schema = self
            .schemas
            .get_or_try_insert_with(schema_text, || SchemaDocument::compile(schema_text))?;
        let blocked = schema.blocked_for(target)?;
        debug!(validation_target = target, blocked = blocked.len(), "validating query");
        Ok(Validator::new(schema.root(), &blocked).validate(&operation))
    }

    /// Field chains `text` reads, sorted and deduplicated.
    pub fn dependencies(&self, text: &str) -> Result<Vec<Vec<String>>> {
        let operation = self.parse(text)?;
        Ok(collect_chains(&operation))
    }
}

/// Parses query text without caching.
pub fn parse(text: &str) -> std::result::Result<Operation, ParseError> {
    parser::parse(text)
}

/// Evaluates query text once, with the default codecs and no caching.
pub fn evaluate(text: &str, current: &Value, root: &Value) -> Result<Value> {
    let operation = parser::parse(text)?;
    let codecs = Codecs::default();
    Ok(Evaluator::new(&codecs).evaluate(&operation, current, root)?)
}

/// Field chains read by query text, without caching.
pub fn dependencies(text: &str) -> Result<Vec<Vec<String>>> {
    Ok(collect_chains(&parser::parse(text)?))
}
