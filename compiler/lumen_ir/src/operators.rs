//! Operators.

use std::fmt;

/// Binary operators, named by what they compute.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Remainder,
    Power,
    Less,
    Greater,
    LessOrEqual,
    GreaterOrEqual,
    Equal,
    NotEqual,
    And,
    Or,
}

/// Precedence families.
///
/// Mixing operators of different families without parentheses is legal (it
/// evaluates left to right) but reported as an `OrderOfOperations` conflict.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum OperatorGroup {
    Additive,
    Multiplicative,
    Exponential,
    Comparison,
    Logical,
}

impl BinaryOp {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Subtract => "-",
            BinaryOp::Multiply => "·",
            BinaryOp::Divide => "÷",
            BinaryOp::Remainder => "%",
            BinaryOp::Power => "^",
            BinaryOp::Less => "<",
            BinaryOp::Greater => ">",
            BinaryOp::LessOrEqual => "≤",
            BinaryOp::GreaterOrEqual => "≥",
            BinaryOp::Equal => "=",
            BinaryOp::NotEqual => "≠",
            BinaryOp::And => "&",
            BinaryOp::Or => "|",
        }
    }

    pub const fn group(self) -> OperatorGroup {
        match self {
            BinaryOp::Add | BinaryOp::Subtract => OperatorGroup::Additive,
            BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::Remainder => {
                OperatorGroup::Multiplicative
            }
            BinaryOp::Power => OperatorGroup::Exponential,
            BinaryOp::Less
            | BinaryOp::Greater
            | BinaryOp::LessOrEqual
            | BinaryOp::GreaterOrEqual
            | BinaryOp::Equal
            | BinaryOp::NotEqual => OperatorGroup::Comparison,
            BinaryOp::And | BinaryOp::Or => OperatorGroup::Logical,
        }
    }

    /// Operators defined on numbers that produce numbers.
    pub const fn is_arithmetic(self) -> bool {
        matches!(
            self.group(),
            OperatorGroup::Additive | OperatorGroup::Multiplicative | OperatorGroup::Exponential
        )
    }

    /// Ordering comparisons, which need numeric operands with equal units.
    pub const fn is_ordering(self) -> bool {
        matches!(
            self,
            BinaryOp::Less | BinaryOp::Greater | BinaryOp::LessOrEqual | BinaryOp::GreaterOrEqual
        )
    }

    /// `=` and `≠`, defined on every pair of values.
    pub const fn is_equality(self) -> bool {
        matches!(self, BinaryOp::Equal | BinaryOp::NotEqual)
    }

    pub const fn is_logical(self) -> bool {
        matches!(self, BinaryOp::And | BinaryOp::Or)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_symbol())
    }
}

/// Unary operators.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum UnaryOp {
    Negate,
    Not,
}

impl UnaryOp {
    pub const fn as_symbol(self) -> &'static str {
        match self {
            UnaryOp::Negate => "-",
            UnaryOp::Not => "~",
        }
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_symbol())
    }
}
