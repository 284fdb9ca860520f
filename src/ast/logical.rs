use std::fmt;

use crate::ast::{Node, Operation, OperationKind};

/// Logical operator of a group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogicalOperator {
    /// `AND` - false on the first false operand
    And,
    /// `OR` - true on the first true operand
    Or,
    /// Anything else written in operator position, kept as spelled
    Invalid(String),
}

impl LogicalOperator {
    pub fn is_valid(&self) -> bool {
        !matches!(self, LogicalOperator::Invalid(_))
    }
}

impl fmt::Display for LogicalOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalOperator::And => f.write_str("AND"),
            LogicalOperator::Or => f.write_str("OR"),
            LogicalOperator::Invalid(spelled) => f.write_str(spelled),
        }
    }
}

/// AND/OR over paths and nested groups.
///
/// # Examples
/// ```text
/// {$.a.Equal(1),$.b.Equal(2)}          // operator defaults to AND
/// {OR,$.a.Equal(1),{AND,$.b.Less(3)}}
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct LogicalOperation {
    pub operator: LogicalOperator,

    pub operands: Vec<Operation>,

    /// The operator was written out rather than defaulted
    pub explicit_operator: bool,

    /// Written with braces; false for the implicit group around a bare
    /// filter path
    pub grouped: bool,
}

impl LogicalOperation {
    /// The implicit AND wrapping a single filter operand.
    pub fn implicit(operand: Operation) -> Self {
        LogicalOperation {
            operator: LogicalOperator::And,
            operands: vec![operand],
            explicit_operator: false,
            grouped: false,
        }
    }
}

impl Node for LogicalOperation {
    fn kind(&self) -> OperationKind {
        OperationKind::LogicalOperation
    }
}

impl fmt::Display for LogicalOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.grouped && self.operands.len() == 1 {
            return self.operands[0].fmt(f);
        }

        f.write_str("{")?;
        let mut first = true;
        if self.explicit_operator || !self.grouped {
            write!(f, "{}", self.operator)?;
            first = false;
        }
        for operand in &self.operands {
            if !first {
                f.write_str(",")?;
            }
            first = false;
            write!(f, "{operand}")?;
        }
        f.write_str("}")
    }
}
