//! Static validation of queries against a structural schema.
//!
//! The walk mirrors the operation tree and never stops early. Each node keeps
//! its own error; once a path part fails, the remaining parts of that path
//! still appear in the output, marked as unreachable, so an editor can render
//! every token the user typed.

use std::collections::BTreeSet;

use tracing::debug;

use crate::{
    ast::{
        Filter, Function, FunctionRef, LogicalOperation, Node, Operation, OperationKind,
        Parameter, Path, PathIdent, PathPart,
    },
    functions::{Arity, ReturnType, catalog::callable_on, descriptor},
    schema::{SchemaKind, SchemaValue},
    typeahead::{Available, DataType, ResolvedType, RuntimeDataMap, TypeaheadNode, Validation},
    value::fold_eq,
};

const UNREACHABLE: &str = "cannot continue due to previous error";

/// Where a walk stands within the schema.
struct Step<'s, S> {
    /// Schema of the value, or of each element when `resolved.array`
    schema: Option<&'s S>,
    resolved: ResolvedType,
    /// The root document, where the blocklist applies
    at_root: bool,
    /// Produced by a function whose result has no known shape
    opaque: bool,
}

impl<S> Clone for Step<'_, S> {
    fn clone(&self) -> Self {
        Step {
            schema: self.schema,
            resolved: self.resolved,
            at_root: self.at_root,
            opaque: self.opaque,
        }
    }
}

impl<'s, S: SchemaValue> Step<'s, S> {
    fn of(schema: &'s S, array: bool) -> Self {
        let (schema, mut resolved) = unwrap_list(schema);
        resolved.array |= array;
        Step {
            schema: Some(schema),
            resolved,
            at_root: false,
            opaque: false,
        }
    }

    fn value(resolved: ResolvedType) -> Self {
        Step {
            schema: None,
            resolved,
            at_root: false,
            opaque: false,
        }
    }

    fn available(&self) -> Available {
        let mut fields: Vec<String> = match self.schema {
            Some(schema) if self.resolved.data_type == DataType::Record => {
                schema.fields().into_iter().map(|(n, _)| n.to_string()).collect()
            }
            _ => Vec::new(),
        };
        fields.sort();
        Available {
            fields,
            functions: callable_on(self.resolved.data_type, self.resolved.array),
            filters: self.resolved.array,
        }
    }
}

/// Element schema of a (possibly nested) list and the type it resolves to.
fn unwrap_list<S: SchemaValue>(schema: &S) -> (&S, ResolvedType) {
    let resolved = DataType::from_kind(&schema.kind());
    let mut node = schema;
    while let Some(element) = node.list_element() {
        node = element;
    }
    (node, resolved)
}

/// Walks operation trees against a schema.
pub struct Validator<'s, S> {
    root: &'s S,
    blocked: &'s BTreeSet<String>,
    required: BTreeSet<String>,
}

impl<'s, S: SchemaValue> Validator<'s, S> {
    /// `blocked` lists root fields that exist but may not be read.
    pub fn new(root: &'s S, blocked: &'s BTreeSet<String>) -> Self {
        Validator {
            root,
            blocked,
            required: BTreeSet::new(),
        }
    }

    /// Validates a whole query. The query's current value is the root.
    pub fn validate(mut self, operation: &Operation) -> Validation {
        let current = self.root_step();
        let typeahead = match operation {
            Operation::Path(path) => self.validate_path(path, &current, false),
            Operation::Logical(logical) => self.validate_logical(logical, &current, false),
        };

        let data_map = RuntimeDataMap {
            string: operation.render(),
            required_data: self.required.into_iter().collect(),
        };
        debug!(
            query = %data_map.string,
            errors = typeahead.errors().len(),
            required = data_map.required_data.len(),
            "validated query"
        );
        Validation {
            typeahead,
            data_map,
        }
    }

    fn root_step(&self) -> Step<'s, S> {
        Step {
            at_root: true,
            ..Step::of(self.root, false)
        }
    }

    fn validate_path(&mut self, path: &Path, current: &Step<'s, S>, in_filter: bool) -> TypeaheadNode {
        let mut node = TypeaheadNode::new(OperationKind::Path, path.render());

        let mut step = if path.start_at_root {
            self.root_step()
        } else {
            Step {
                at_root: !in_filter,
                ..current.clone()
            }
        };
        node.available = Some(step.available());

        let mut broken = false;
        for part in &path.parts {
            if broken {
                let mut unreachable = TypeaheadNode::new(part.kind(), part.to_string());
                unreachable.error = Some(UNREACHABLE.to_string());
                node.parts.push(unreachable);
                continue;
            }

            let (mut part_node, next) = match part {
                PathPart::Ident(ident) => self.validate_ident(ident, &step),
                PathPart::Filter(filter) => self.validate_filter(filter, &step),
                PathPart::Function(func) => self.validate_function(func, &step, current, in_filter),
            };
            match next {
                Some(next) => {
                    part_node.resolved = Some(next.resolved);
                    part_node.available = Some(next.available());
                    step = next;
                }
                None => broken = true,
            }
            node.parts.push(part_node);
        }

        if !broken {
            node.resolved = Some(step.resolved);
            node.available = Some(step.available());
        }
        node
    }

    fn validate_ident(&mut self, ident: &PathIdent, step: &Step<'s, S>) -> (TypeaheadNode, Option<Step<'s, S>>) {
        let mut node = TypeaheadNode::new(OperationKind::PathIdent, ident.render());
        match self.resolve_ident(&ident.name, step) {
            Ok(next) => (node, Some(next)),
            Err(error) => {
                node.error = Some(error);
                (node, None)
            }
        }
    }

    fn resolve_ident(&mut self, name: &str, step: &Step<'s, S>) -> Result<Step<'s, S>, String> {
        if step.at_root {
            self.required.insert(name.to_string());
            if self.blocked.iter().any(|b| fold_eq(b, name)) {
                return Err(format!("field {name} is not available"));
            }
        }

        match step.resolved.data_type {
            DataType::Unknown if step.opaque => {
                Err(format!("cannot address '{name}' into a function result of unknown type"))
            }
            DataType::Unknown => Ok(Step::value(ResolvedType {
                data_type: DataType::Unknown,
                array: step.resolved.array,
            })),
            DataType::Record => {
                let field = step
                    .schema
                    .and_then(|schema| schema.field(name))
                    .ok_or_else(|| format!("field {name} does not exist"))?;
                if step.resolved.array && matches!(field.kind(), SchemaKind::List(_)) {
                    return Err("cannot address into an array a second time".to_string());
                }
                Ok(Step::of(field, step.resolved.array))
            }
            _ => Err(format!("cannot address '{name}' into {}", step.resolved)),
        }
    }

    fn validate_filter(&mut self, filter: &Filter, step: &Step<'s, S>) -> (TypeaheadNode, Option<Step<'s, S>>) {
        let mut node = TypeaheadNode::new(OperationKind::Filter, filter.render());

        let element = Step {
            resolved: ResolvedType::single(step.resolved.data_type),
            at_root: false,
            ..step.clone()
        };
        node.parts
            .push(self.validate_logical(&filter.predicate, &element, true));

        if !step.resolved.array && step.resolved.data_type != DataType::Unknown {
            node.error = Some(format!("filter needs a list, got {}", step.resolved));
            return (node, None);
        }
        (node, Some(step.clone()))
    }

    fn validate_logical(
        &mut self,
        logical: &LogicalOperation,
        current: &Step<'s, S>,
        in_filter: bool,
    ) -> TypeaheadNode {
        let mut node = TypeaheadNode::new(OperationKind::LogicalOperation, logical.render());
        node.resolved = Some(ResolvedType::single(DataType::Bool));
        if !logical.operator.is_valid() {
            node.error = Some(format!("unknown logical operator '{}'", logical.operator));
        }

        for operand in &logical.operands {
            let child = match operand {
                Operation::Path(path) => {
                    let mut child = self.validate_path(path, current, in_filter);
                    if child.is_valid()
                        && let Some(resolved) = child.resolved
                        && !ends_in_predicate(resolved)
                    {
                        child.error = Some(format!(
                            "path must end in a predicate returning a single bool, got {resolved}"
                        ));
                    }
                    child
                }
                Operation::Logical(inner) => self.validate_logical(inner, current, in_filter),
            };
            node.parts.push(child);
        }
        node
    }

    fn validate_function(
        &mut self,
        func: &Function,
        subject: &Step<'s, S>,
        current: &Step<'s, S>,
        in_filter: bool,
    ) -> (TypeaheadNode, Option<Step<'s, S>>) {
        let mut node = TypeaheadNode::new(OperationKind::Function, func.render());

        // Path parameters are walked even when the call itself is unknown so
        // their fields count as required data.
        let mut param_types = Vec::with_capacity(func.parameters.len());
        for param in &func.parameters {
            let resolved = match param {
                Parameter::Number { .. } => Some(ResolvedType::single(DataType::Number)),
                Parameter::String(_) => Some(ResolvedType::single(DataType::String)),
                Parameter::Bool(_) => Some(ResolvedType::single(DataType::Bool)),
                Parameter::Path(path) => {
                    let child = self.validate_path(path, current, in_filter);
                    let resolved = child.is_valid().then_some(child.resolved).flatten();
                    node.parts.push(child);
                    resolved
                }
            };
            param_types.push(resolved);
        }

        let name = match &func.name {
            FunctionRef::Known(name) => *name,
            FunctionRef::Unknown(spelled) => {
                node.error = Some(format!("unknown function '{spelled}'"));
                return (node, None);
            }
        };
        let desc = descriptor(name);
        let mut errors = Vec::new();

        let data = subject.resolved.data_type;
        if !desc.subject.accepts(data, subject.resolved.array) {
            errors.push(format!(
                "{name} cannot be called on {}, it needs {}",
                subject.resolved, desc.subject
            ));
        }

        if !desc.arity.accepts_count(func.parameters.len()) {
            errors.push(format!(
                "{name} takes {} parameters, got {}",
                desc.arity.describe(),
                func.parameters.len()
            ));
        }

        for (i, resolved) in param_types.iter().enumerate() {
            let (Some(expected), Some(resolved)) = (desc.arity.param_at(i), resolved) else {
                continue;
            };
            if resolved.data_type == DataType::Unknown {
                continue;
            }
            if !expected.accepts(resolved.data_type) {
                errors.push(format!(
                    "parameter {} of {name} must be {expected}, got {resolved}",
                    i + 1
                ));
            } else if resolved.array && matches!(desc.arity, Arity::Fixed(_)) {
                errors.push(format!(
                    "parameter {} of {name} must be a single {expected}, got {resolved}",
                    i + 1
                ));
            }
        }

        if !errors.is_empty() {
            node.error = Some(errors.join("; "));
        }

        let next = match desc.returns {
            ReturnType::Bool => Step::value(ResolvedType::single(DataType::Bool)),
            ReturnType::Number => Step::value(ResolvedType::single(DataType::Number)),
            ReturnType::String => Step::value(ResolvedType::single(DataType::String)),
            ReturnType::Element => Step {
                resolved: ResolvedType::single(data),
                at_root: false,
                ..subject.clone()
            },
            ReturnType::Unknown => Step {
                opaque: true,
                ..Step::value(ResolvedType::single(DataType::Unknown))
            },
        };
        (node, Some(next))
    }
}

fn ends_in_predicate(resolved: ResolvedType) -> bool {
    !resolved.array && resolved.data_type == DataType::Bool
}
