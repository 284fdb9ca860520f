//! Structural schemas consumed by the validator.
//!
//! The validator only needs three questions answered about a schema node:
//! its kind, its fields when it is a record, and its element when it is a
//! list. [`SchemaValue`] captures exactly that; [`SchemaNode`] is the
//! implementation compiled from schema documents.
//!
//! # Schema documents
//!
//! A document describes every top-level key a query may read, which steps
//! must run before it and whether it may be absent:
//!
//! ```json
//! {
//!   "Orders":   { "type": { "kind": "list", "element": { "kind": "record", "fields": { "id": "number" } } } },
//!   "Settings": { "type": { "kind": "record", "fields": { "Key": "string" } }, "requires": ["Orders"] },
//!   "Note":     { "type": "string", "optional": true }
//! }
//! ```
//!
//! Types are written either as a shorthand string (`"string"`, `"number"`,
//! `"bool"`, `"any"`, `"record"`) or as an object tagged by `kind`.

use std::collections::{BTreeMap, BTreeSet};

use serde::Deserialize;

use crate::value::fold_eq;

/// Shape of a schema node. Lists carry their element kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaKind {
    Bool,
    String,
    Number,
    Record,
    List(Box<SchemaKind>),
    Unknown,
}

/// A node of a structural schema.
pub trait SchemaValue {
    fn kind(&self) -> SchemaKind;

    /// Named fields of a record node, empty otherwise.
    fn fields(&self) -> Vec<(&str, &Self)>;

    /// Element schema of a list node. Lists are homogeneous.
    fn list_element(&self) -> Option<&Self>;

    /// Case-insensitive field lookup; an exact match wins.
    fn field(&self, name: &str) -> Option<&Self> {
        let fields = self.fields();
        fields
            .iter()
            .find(|(n, _)| *n == name)
            .or_else(|| fields.iter().find(|(n, _)| fold_eq(n, name)))
            .map(|(_, node)| *node)
    }
}

/// Compiled schema node.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    Bool,
    String,
    Number,
    /// `any`: nothing is known about the value
    Unknown,
    Record(Vec<(String, SchemaNode)>),
    List(Box<SchemaNode>),
}

impl SchemaValue for SchemaNode {
    fn kind(&self) -> SchemaKind {
        match self {
            SchemaNode::Bool => SchemaKind::Bool,
            SchemaNode::String => SchemaKind::String,
            SchemaNode::Number => SchemaKind::Number,
            SchemaNode::Unknown => SchemaKind::Unknown,
            SchemaNode::Record(_) => SchemaKind::Record,
            SchemaNode::List(element) => SchemaKind::List(Box::new(element.kind())),
        }
    }

    fn fields(&self) -> Vec<(&str, &Self)> {
        match self {
            SchemaNode::Record(fields) => fields.iter().map(|(n, node)| (n.as_str(), node)).collect(),
            _ => Vec::new(),
        }
    }

    fn list_element(&self) -> Option<&Self> {
        match self {
            SchemaNode::List(element) => Some(element),
            _ => None,
        }
    }
}

/// Errors raised while compiling a schema document or choosing a target.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SchemaError {
    #[error("invalid schema document: {0}")]
    Document(String),

    #[error("unknown type '{name}' for '{key}'")]
    UnknownType { key: String, name: String },

    #[error("'{key}' requires unknown key '{required}'")]
    UnknownRequirement { key: String, required: String },

    #[error("unknown validation target '{0}'")]
    UnknownTarget(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum TypeSpec {
    Shorthand(String),
    Tagged(TaggedType),
}

#[derive(Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
enum TaggedType {
    Bool,
    String,
    Number,
    Any,
    Record {
        #[serde(default)]
        fields: BTreeMap<String, TypeSpec>,
    },
    List {
        element: Box<TypeSpec>,
    },
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct KeySpec {
    #[serde(rename = "type")]
    ty: TypeSpec,
    #[serde(default)]
    requires: Vec<String>,
    #[serde(default)]
    optional: bool,
}

fn compile_type(key: &str, spec: TypeSpec) -> Result<SchemaNode, SchemaError> {
    Ok(match spec {
        TypeSpec::Shorthand(name) => match name.to_ascii_lowercase().as_str() {
            "bool" | "boolean" => SchemaNode::Bool,
            "string" => SchemaNode::String,
            "number" => SchemaNode::Number,
            "any" | "unknown" => SchemaNode::Unknown,
            "record" => SchemaNode::Record(Vec::new()),
            _ => {
                return Err(SchemaError::UnknownType {
                    key: key.to_string(),
                    name,
                });
            }
        },
        TypeSpec::Tagged(TaggedType::Bool) => SchemaNode::Bool,
        TypeSpec::Tagged(TaggedType::String) => SchemaNode::String,
        TypeSpec::Tagged(TaggedType::Number) => SchemaNode::Number,
        TypeSpec::Tagged(TaggedType::Any) => SchemaNode::Unknown,
        TypeSpec::Tagged(TaggedType::Record { fields }) => SchemaNode::Record(
            fields
                .into_iter()
                .map(|(name, spec)| compile_type(key, spec).map(|node| (name, node)))
                .collect::<Result<_, _>>()?,
        ),
        TypeSpec::Tagged(TaggedType::List { element }) => {
            SchemaNode::List(Box::new(compile_type(key, *element)?))
        }
    })
}

/// One top-level key of a schema document.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaKey {
    pub name: String,
    pub requires: Vec<String>,
    /// The key may be absent at runtime. Carried for callers that gather
    /// runtime data; validation and `blocked_for` treat optional keys like
    /// any other.
    pub optional: bool,
}

/// A compiled schema document.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDocument {
    keys: Vec<SchemaKey>,
    root: SchemaNode,
}

impl SchemaDocument {
    /// Compiles a JSON schema document.
    ///
    /// # Examples
    ///
    /// ```
    /// use mpath::schema::{SchemaDocument, SchemaKind, SchemaValue};
    ///
    /// let doc = SchemaDocument::compile(r#"{"Name": {"type": "string"}}"#).unwrap();
    /// assert_eq!(doc.root().field("name").map(|n| n.kind()), Some(SchemaKind::String));
    /// ```
    pub fn compile(text: &str) -> Result<Self, SchemaError> {
        let specs: BTreeMap<String, KeySpec> =
            serde_json::from_str(text).map_err(|e| SchemaError::Document(e.to_string()))?;

        let mut keys = Vec::with_capacity(specs.len());
        let mut fields = Vec::with_capacity(specs.len());
        for (name, spec) in specs {
            fields.push((name.clone(), compile_type(&name, spec.ty)?));
            keys.push(SchemaKey {
                name,
                requires: spec.requires,
                optional: spec.optional,
            });
        }

        for key in &keys {
            for required in &key.requires {
                if !keys.iter().any(|k| fold_eq(&k.name, required)) {
                    return Err(SchemaError::UnknownRequirement {
                        key: key.name.clone(),
                        required: required.clone(),
                    });
                }
            }
        }

        Ok(SchemaDocument {
            keys,
            root: SchemaNode::Record(fields),
        })
    }

    /// Record node over every top-level key.
    pub fn root(&self) -> &SchemaNode {
        &self.root
    }

    pub fn keys(&self) -> &[SchemaKey] {
        &self.keys
    }

    pub fn key(&self, name: &str) -> Option<&SchemaKey> {
        self.keys.iter().find(|k| fold_eq(&k.name, name))
    }

    /// Top-level keys a query validated for `target` may not read: the
    /// target itself and every key that requires it, directly or through
    /// other keys.
    pub fn blocked_for(&self, target: &str) -> Result<BTreeSet<String>, SchemaError> {
        let target = self
            .key(target)
            .ok_or_else(|| SchemaError::UnknownTarget(target.to_string()))?;

        let mut blocked = BTreeSet::from([target.name.clone()]);
        loop {
            let before = blocked.len();
            for key in &self.keys {
                if blocked.contains(&key.name) {
                    continue;
                }
                let depends = key
                    .requires
                    .iter()
                    .any(|r| blocked.iter().any(|b| fold_eq(b, r)));
                if depends {
                    blocked.insert(key.name.clone());
                }
            }
            if blocked.len() == before {
                return Ok(blocked);
            }
        }
    }
}
