use std::fmt;

use crate::ast::{LogicalOperation, Node, OperationKind};

/// Predicate applied to each element of a sequence, or once to a record.
///
/// # Examples
/// ```text
/// [@.id.Equal(1)]
/// [{OR,@.kind.Equal("a"),@.kind.Equal("b")}]
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub predicate: LogicalOperation,
}

impl Node for Filter {
    fn kind(&self) -> OperationKind {
        OperationKind::Filter
    }
}

impl fmt::Display for Filter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.predicate)
    }
}
