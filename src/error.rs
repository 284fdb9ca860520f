use crate::{
    codec::CodecError, evaluator::EvalError, parser::ParseError, schema::SchemaError,
    value::ValueError,
};

/// Any error raised by the engine's entry points.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    #[error("evaluation error: {0}")]
    Eval(#[from] EvalError),

    #[error("schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("codec error: {0}")]
    Codec(#[from] CodecError),

    #[error("value error: {0}")]
    Value(#[from] ValueError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;
