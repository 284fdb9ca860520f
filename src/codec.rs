//! Format codecs behind the `ParseJSON`/`ParseXML`/`ParseYAML`/`ParseTOML`
//! and `AsJSON` functions.
//!
//! Codecs are collaborators: the evaluator only dispatches to whichever codec
//! is registered for a [`Format`]. JSON, TOML and XML are registered by
//! default; YAML is left to the embedding application.

use std::{collections::HashMap, fmt, str::FromStr, sync::Arc};

use quick_xml::{Reader, escape::resolve_xml_entity, events::Event};
use rust_decimal::Decimal;

use crate::{
    output::to_json,
    value::{Record, Value, ValueError},
};

/// A data format with a parse function.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Json,
    Xml,
    Yaml,
    Toml,
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Format::Json => "JSON",
            Format::Xml => "XML",
            Format::Yaml => "YAML",
            Format::Toml => "TOML",
        })
    }
}

/// Errors raised by codecs.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CodecError {
    #[error("no codec registered for {0}")]
    Missing(Format),

    #[error("invalid {format}: {message}")]
    Parse { format: Format, message: String },

    #[error(transparent)]
    Value(#[from] ValueError),
}

impl CodecError {
    fn parse(format: Format, err: impl fmt::Display) -> Self {
        CodecError::Parse {
            format,
            message: err.to_string(),
        }
    }
}

/// Parses text of one format into a [`Value`].
pub trait FormatCodec: Send + Sync {
    fn format(&self) -> Format;

    fn parse(&self, text: &str) -> Result<Value, CodecError>;
}

/// Registered codecs, keyed by format.
#[derive(Clone)]
pub struct Codecs {
    codecs: HashMap<Format, Arc<dyn FormatCodec>>,
}

impl fmt::Debug for Codecs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut formats: Vec<String> = self.codecs.keys().map(ToString::to_string).collect();
        formats.sort();
        f.debug_struct("Codecs").field("formats", &formats).finish()
    }
}

impl Default for Codecs {
    fn default() -> Self {
        Codecs::empty()
            .with_codec(Arc::new(JsonCodec))
            .with_codec(Arc::new(TomlCodec))
            .with_codec(Arc::new(XmlCodec))
    }
}

impl Codecs {
    /// A registry with nothing registered.
    pub fn empty() -> Self {
        Codecs {
            codecs: HashMap::new(),
        }
    }

    /// Registers `codec`, replacing any codec for the same format.
    pub fn with_codec(mut self, codec: Arc<dyn FormatCodec>) -> Self {
        self.codecs.insert(codec.format(), codec);
        self
    }

    pub fn parse(&self, format: Format, text: &str) -> Result<Value, CodecError> {
        let codec = self.codecs.get(&format).ok_or(CodecError::Missing(format))?;
        codec.parse(text)
    }

    /// Compact JSON text of `value`.
    pub fn as_json(&self, value: &Value) -> String {
        to_json(value)
    }
}

/// JSON via `serde_json`, numbers kept exact.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl FormatCodec for JsonCodec {
    fn format(&self) -> Format {
        Format::Json
    }

    fn parse(&self, text: &str) -> Result<Value, CodecError> {
        let json: serde_json::Value =
            serde_json::from_str(text).map_err(|e| CodecError::parse(Format::Json, e))?;
        Ok(Value::from_json(json)?)
    }
}

/// TOML via the `toml` crate. Datetimes become strings.
#[derive(Debug, Clone, Copy, Default)]
pub struct TomlCodec;

impl FormatCodec for TomlCodec {
    fn format(&self) -> Format {
        Format::Toml
    }

    fn parse(&self, text: &str) -> Result<Value, CodecError> {
        let table: toml::Table = text.parse().map_err(|e| CodecError::parse(Format::Toml, e))?;
        toml_to_value(toml::Value::Table(table))
    }
}

fn toml_to_value(value: toml::Value) -> Result<Value, CodecError> {
    Ok(match value {
        toml::Value::String(s) => Value::String(s),
        toml::Value::Integer(n) => Value::from(n),
        toml::Value::Float(f) => {
            let text = f.to_string();
            Value::Number(
                Decimal::from_str(&text)
                    .or_else(|_| Decimal::from_scientific(&text))
                    .map_err(|_| ValueError::NumberOutOfRange(text))?,
            )
        }
        toml::Value::Boolean(b) => Value::Bool(b),
        toml::Value::Datetime(dt) => Value::String(dt.to_string()),
        toml::Value::Array(items) => Value::Sequence(
            items
                .into_iter()
                .map(toml_to_value)
                .collect::<Result<_, _>>()?,
        ),
        toml::Value::Table(table) => Value::Record(
            table
                .into_iter()
                .map(|(k, v)| toml_to_value(v).map(|v| (k, v)))
                .collect::<Result<_, _>>()?,
        ),
    })
}

/// XML via `quick-xml`.
///
/// The document becomes a record holding the root element. Elements with
/// children become records, repeated child names become sequences, text-only
/// elements become strings. Attributes are stored as `@name` fields and text
/// mixed with child elements as `#text`.
#[derive(Debug, Clone, Copy, Default)]
pub struct XmlCodec;

struct Frame {
    name: String,
    children: Vec<(String, Value)>,
    text: String,
}

impl Frame {
    fn into_value(self) -> Value {
        if self.children.is_empty() {
            return Value::String(self.text);
        }

        let mut record = Record::new();
        let mut order: Vec<String> = Vec::new();
        let mut grouped: HashMap<String, Vec<Value>> = HashMap::new();
        for (name, value) in self.children {
            if !grouped.contains_key(&name) {
                order.push(name.clone());
            }
            grouped.entry(name).or_default().push(value);
        }
        for name in order {
            let mut values = grouped.remove(&name).unwrap_or_default();
            let value = if values.len() == 1 {
                values.remove(0)
            } else {
                Value::Sequence(values)
            };
            record.insert(name, value);
        }
        let text = self.text.trim();
        if !text.is_empty() {
            record.insert("#text", text);
        }
        Value::Record(record)
    }
}

fn xml_error(err: impl fmt::Display) -> CodecError {
    CodecError::parse(Format::Xml, err)
}

fn open_frame(e: &quick_xml::events::BytesStart<'_>) -> Result<Frame, CodecError> {
    let name = std::str::from_utf8(e.name().as_ref())
        .map_err(xml_error)?
        .to_string();
    let mut children = Vec::new();
    for attr in e.attributes() {
        let attr = attr.map_err(xml_error)?;
        let key = std::str::from_utf8(attr.key.as_ref()).map_err(xml_error)?;
        let value = attr.unescape_value().map_err(xml_error)?;
        children.push((format!("@{key}"), Value::String(value.into_owned())));
    }
    Ok(Frame {
        name,
        children,
        text: String::new(),
    })
}

impl FormatCodec for XmlCodec {
    fn format(&self) -> Format {
        Format::Xml
    }

    fn parse(&self, text: &str) -> Result<Value, CodecError> {
        let mut reader = Reader::from_str(text);

        let mut stack: Vec<Frame> = Vec::new();
        let mut root: Option<(String, Value)> = None;

        loop {
            let closed = match reader.read_event().map_err(xml_error)? {
                Event::Start(e) => {
                    stack.push(open_frame(&e)?);
                    None
                }
                Event::Empty(e) => Some(open_frame(&e)?),
                Event::End(_) => match stack.pop() {
                    Some(frame) => Some(frame),
                    None => return Err(xml_error("unbalanced end tag")),
                },
                Event::Text(e) => {
                    let decoded = e.decode().map_err(xml_error)?;
                    let unescaped = quick_xml::escape::unescape(&decoded).map_err(xml_error)?;
                    if let Some(frame) = stack.last_mut() {
                        frame.text.push_str(&unescaped);
                    }
                    None
                }
                Event::CData(e) => {
                    let decoded = e.decode().map_err(xml_error)?;
                    if let Some(frame) = stack.last_mut() {
                        frame.text.push_str(&decoded);
                    }
                    None
                }
                Event::GeneralRef(e) => {
                    let resolved = match e.resolve_char_ref().map_err(xml_error)? {
                        Some(ch) => ch.to_string(),
                        None => {
                            let name = e.decode().map_err(xml_error)?;
                            resolve_xml_entity(&name)
                                .ok_or_else(|| xml_error(format!("unknown entity &{name};")))?
                                .to_string()
                        }
                    };
                    if let Some(frame) = stack.last_mut() {
                        frame.text.push_str(&resolved);
                    }
                    None
                }
                Event::Eof => break,
                _ => None,
            };

            if let Some(frame) = closed {
                let name = frame.name.clone();
                let value = frame.into_value();
                match stack.last_mut() {
                    Some(parent) => parent.children.push((name, value)),
                    None if root.is_none() => root = Some((name, value)),
                    None => return Err(xml_error("multiple root elements")),
                }
            }
        }

        if !stack.is_empty() {
            return Err(xml_error("unexpected end of document"));
        }
        let (name, value) = root.ok_or_else(|| xml_error("missing root element"))?;
        Ok(Value::Record(Record::new().with(name, value)))
    }
}
