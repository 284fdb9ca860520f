//! Validator output: a tree mirroring the operation tree, annotated for
//! interactive query authoring.
//!
//! Serialization omits empty and absent members rather than emitting empty
//! containers or nulls; consumers rely on that.

use std::fmt;

use serde::Serialize;

use crate::{ast::OperationKind, schema::SchemaKind};

/// Static type of a value, as far as the schema tells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum DataType {
    Bool,
    String,
    Number,
    Record,
    Unknown,
}

impl DataType {
    pub fn is_scalar(self) -> bool {
        matches!(self, DataType::Bool | DataType::String | DataType::Number)
    }

    /// Element type of a schema kind, with whether it was a list.
    pub fn from_kind(kind: &SchemaKind) -> ResolvedType {
        match kind {
            SchemaKind::Bool => ResolvedType::single(DataType::Bool),
            SchemaKind::String => ResolvedType::single(DataType::String),
            SchemaKind::Number => ResolvedType::single(DataType::Number),
            SchemaKind::Record => ResolvedType::single(DataType::Record),
            SchemaKind::Unknown => ResolvedType::single(DataType::Unknown),
            SchemaKind::List(element) => ResolvedType {
                array: true,
                ..DataType::from_kind(element)
            },
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            DataType::Bool => "bool",
            DataType::String => "string",
            DataType::Number => "number",
            DataType::Record => "record",
            DataType::Unknown => "unknown",
        })
    }
}

fn is_false(b: &bool) -> bool {
    !*b
}

/// A data type, single or array.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolvedType {
    pub data_type: DataType,
    #[serde(skip_serializing_if = "is_false")]
    pub array: bool,
}

impl ResolvedType {
    pub fn single(data_type: DataType) -> Self {
        ResolvedType {
            data_type,
            array: false,
        }
    }

    pub fn array(data_type: DataType) -> Self {
        ResolvedType {
            data_type,
            array: true,
        }
    }
}

impl fmt::Display for ResolvedType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.array {
            write!(f, "list of {}", self.data_type)
        } else {
            self.data_type.fmt(f)
        }
    }
}

/// What may follow a node.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Available {
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<String>,
    #[serde(skip_serializing_if = "is_false")]
    pub filters: bool,
}

impl Available {
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty() && self.functions.is_empty() && !self.filters
    }
}

fn no_suggestions(available: &Option<Available>) -> bool {
    available.as_ref().is_none_or(Available::is_empty)
}

/// One node of the typeahead tree.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TypeaheadNode {
    /// Canonical text of the node
    pub string: String,

    #[serde(skip)]
    pub kind: OperationKind,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parts: Vec<TypeaheadNode>,

    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub resolved: Option<ResolvedType>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(skip_serializing_if = "no_suggestions")]
    pub available: Option<Available>,
}

impl TypeaheadNode {
    pub fn new(kind: OperationKind, string: impl Into<String>) -> Self {
        TypeaheadNode {
            string: string.into(),
            kind,
            parts: Vec::new(),
            resolved: None,
            error: None,
            available: None,
        }
    }

    /// Every error in this subtree, depth first.
    pub fn errors(&self) -> Vec<&str> {
        let mut out = Vec::new();
        self.collect_errors(&mut out);
        out
    }

    fn collect_errors<'a>(&'a self, out: &mut Vec<&'a str>) {
        if let Some(error) = &self.error {
            out.push(error);
        }
        for part in &self.parts {
            part.collect_errors(out);
        }
    }

    pub fn is_valid(&self) -> bool {
        self.errors().is_empty()
    }
}

/// The root fields a query reads.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RuntimeDataMap {
    pub string: String,
    /// Sorted and deduplicated
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub required_data: Vec<String>,
}

/// Result of validating a query against a schema.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Validation {
    pub typeahead: TypeaheadNode,
    pub data_map: RuntimeDataMap,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serialization_omits_empty_members() {
        let node = TypeaheadNode::new(OperationKind::PathIdent, "name");
        assert_eq!(serde_json::to_string(&node).unwrap(), r#"{"string":"name"}"#);

        let mut node = TypeaheadNode::new(OperationKind::PathIdent, "ids");
        node.resolved = Some(ResolvedType::array(DataType::Number));
        node.available = Some(Available::default());
        assert_eq!(
            serde_json::to_string(&node).unwrap(),
            r#"{"string":"ids","type":{"dataType":"number","array":true}}"#
        );
    }

    #[test]
    fn list_kinds_unwrap_to_arrays() {
        let kind = SchemaKind::List(Box::new(SchemaKind::Record));
        assert_eq!(DataType::from_kind(&kind), ResolvedType::array(DataType::Record));
    }
}
