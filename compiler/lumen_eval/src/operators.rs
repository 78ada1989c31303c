//! Binary and unary operators.
//!
//! Direct enum dispatch over the left operand's kind. Equality is defined
//! on every pair of values; everything else needs operands of matching
//! kinds (and, for numbers, compatible units) and otherwise produces a
//! type-mismatch exception.

use std::cmp::Ordering;

use lumen_ir::{BinaryOp, NodeId, UnaryOp};
use lumen_types::Type;
use lumen_values::{Exception, Number, UnitMismatch, Value};

fn unit_mismatch(node: NodeId, mismatch: UnitMismatch) -> Exception {
    Exception::type_mismatch(
        node,
        Type::Number(mismatch.expected),
        Type::Number(mismatch.given),
    )
}

/// `left op right` for the operation node `node`.
pub fn evaluate_binary(
    node: NodeId,
    left: &Value,
    op: BinaryOp,
    right: &Value,
) -> Result<Value, Exception> {
    match op {
        BinaryOp::Equal => return Ok(Value::Bool(left.equals(right))),
        BinaryOp::NotEqual => return Ok(Value::Bool(!left.equals(right))),
        _ => {}
    }
    match (left, right) {
        (Value::Number(a), Value::Number(b)) => number_binary(node, a, op, b),
        (Value::Number(a), other) => {
            let expected = match op {
                BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::Power => Type::unitless(),
                _ => Type::Number(a.unit.clone()),
            };
            Err(Exception::type_mismatch(node, expected, other.type_of()))
        }
        (Value::Bool(a), Value::Bool(b)) if op.is_logical() => Ok(Value::Bool(match op {
            BinaryOp::And => *a && *b,
            _ => *a || *b,
        })),
        (Value::Bool(_), other) if op.is_logical() => {
            Err(Exception::type_mismatch(node, Type::Bool, other.type_of()))
        }
        (Value::Text(a), Value::Text(b)) if op == BinaryOp::Add => {
            let mut joined = String::with_capacity(a.len().saturating_add(b.len()));
            joined.push_str(a);
            joined.push_str(b);
            Ok(Value::text(joined))
        }
        (Value::Text(_), other) if op == BinaryOp::Add => {
            Err(Exception::type_mismatch(node, Type::Text, other.type_of()))
        }
        (other, _) => Err(Exception::type_mismatch(
            node,
            operand_type(op),
            other.type_of(),
        )),
    }
}

/// The type a left operand needs for `op` to be defined.
fn operand_type(op: BinaryOp) -> Type {
    if op.is_logical() {
        Type::Bool
    } else if op == BinaryOp::Add {
        Type::union(Type::unitless(), Type::Text)
    } else {
        Type::unitless()
    }
}

fn number_binary(node: NodeId, a: &Number, op: BinaryOp, b: &Number) -> Result<Value, Exception> {
    let mismatch = |m: UnitMismatch| unit_mismatch(node, m);
    let number = match op {
        BinaryOp::Add => a.add(b).map_err(mismatch)?,
        BinaryOp::Subtract => a.subtract(b).map_err(mismatch)?,
        BinaryOp::Remainder => a.remainder(b).map_err(mismatch)?,
        BinaryOp::Multiply => a.multiply(b),
        BinaryOp::Divide => a.divide(b),
        BinaryOp::Power => a.power(b).map_err(mismatch)?,
        _ if op.is_ordering() => {
            let ordering = a.compare(b).map_err(mismatch)?;
            return Ok(Value::Bool(match op {
                BinaryOp::Less => ordering == Ordering::Less,
                BinaryOp::Greater => ordering == Ordering::Greater,
                BinaryOp::LessOrEqual => ordering != Ordering::Greater,
                _ => ordering != Ordering::Less,
            }));
        }
        _ => {
            return Err(Exception::type_mismatch(
                node,
                operand_type(op),
                Type::Number(a.unit.clone()),
            ))
        }
    };
    Ok(Value::Number(number))
}

pub fn evaluate_unary(node: NodeId, op: UnaryOp, operand: &Value) -> Result<Value, Exception> {
    match (op, operand) {
        (UnaryOp::Negate, Value::Number(n)) => Ok(Value::Number(n.negate())),
        (UnaryOp::Not, Value::Bool(b)) => Ok(Value::Bool(!b)),
        (UnaryOp::Negate, other) => Err(Exception::type_mismatch(
            node,
            Type::unitless(),
            other.type_of(),
        )),
        (UnaryOp::Not, other) => Err(Exception::type_mismatch(node, Type::Bool, other.type_of())),
    }
}
