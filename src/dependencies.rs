//! Schema-free extraction of the field chains a query reads.

use std::collections::BTreeSet;

use crate::{
    ast::{FunctionRef, LogicalOperation, Operation, Parameter, Path, PathPart},
    functions::descriptor,
};

/// Field chains read by `operation`, sorted and deduplicated.
///
/// A chain follows field names from the root and passes through functions
/// that return an element of their subject (`First`, `Last`, `Index`). It
/// ends at any other function or at a filter. Filter bodies contribute their
/// own chains, prefixed by the chain that leads into the filter.
///
/// # Examples
///
/// ```
/// use mpath::{dependencies::dependencies, parse};
///
/// let query = parse(r#"$.List.Last().SomeSettings[@.Key.Equal("DEF")].Any().Equal(true)"#).unwrap();
/// assert_eq!(
///     dependencies(&query),
///     vec![vec!["List", "SomeSettings"], vec!["List", "SomeSettings", "Key"]]
/// );
/// ```
pub fn dependencies(operation: &Operation) -> Vec<Vec<String>> {
    let mut chains = BTreeSet::new();
    visit_operation(operation, &[], &mut chains);
    chains.into_iter().collect()
}

fn visit_operation(operation: &Operation, current: &[String], chains: &mut BTreeSet<Vec<String>>) {
    match operation {
        Operation::Path(path) => visit_path(path, current, chains),
        Operation::Logical(logical) => visit_logical(logical, current, chains),
    }
}

fn visit_logical(logical: &LogicalOperation, current: &[String], chains: &mut BTreeSet<Vec<String>>) {
    for operand in &logical.operands {
        visit_operation(operand, current, chains);
    }
}

/// `current` is the chain `@` stands for.
fn visit_path(path: &Path, current: &[String], chains: &mut BTreeSet<Vec<String>>) {
    let mut chain: Vec<String> = if path.start_at_root {
        Vec::new()
    } else {
        current.to_vec()
    };
    let mut open = true;

    for part in &path.parts {
        match part {
            PathPart::Ident(ident) => {
                if open {
                    chain.push(ident.name.clone());
                }
            }
            PathPart::Filter(filter) => {
                visit_logical(&filter.predicate, &chain, chains);
                open = false;
            }
            PathPart::Function(func) => {
                for param in &func.parameters {
                    if let Parameter::Path(param) = param {
                        visit_path(param, current, chains);
                    }
                }
                let passes = match &func.name {
                    FunctionRef::Known(name) => descriptor(*name).returns_known_values,
                    FunctionRef::Unknown(_) => false,
                };
                open &= passes;
            }
        }
    }

    if !chain.is_empty() {
        chains.insert(chain);
    }
}
