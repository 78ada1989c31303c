//! Tree constructors.
//!
//! Parsing text into trees happens outside this engine. Hosts and tests
//! build programs with these functions instead; each call allocates one node
//! with a fresh id.

use std::sync::Arc;

use crate::{BinaryOp, Name, Node, NodeKind, NodeRef, UnaryOp, Unit};

fn nodes(items: impl IntoIterator<Item = NodeRef>) -> Vec<NodeRef> {
    items.into_iter().collect()
}

/// A program with no borrows whose block holds `statements`.
pub fn program(statements: impl IntoIterator<Item = NodeRef>) -> NodeRef {
    program_with_borrows([], statements)
}

pub fn program_with_borrows(
    borrows: impl IntoIterator<Item = NodeRef>,
    statements: impl IntoIterator<Item = NodeRef>,
) -> NodeRef {
    Node::new(NodeKind::Program {
        borrows: nodes(borrows),
        block: block(statements),
    })
}

pub fn borrow(source: &str, name: Option<&str>) -> NodeRef {
    Node::new(NodeKind::Borrow {
        source: Name::intern(source),
        name: name.map(Name::intern),
    })
}

pub fn block(statements: impl IntoIterator<Item = NodeRef>) -> NodeRef {
    Node::new(NodeKind::Block {
        statements: nodes(statements),
    })
}

/// `name: value`
pub fn bind(name: &str, value: NodeRef) -> NodeRef {
    Node::new(NodeKind::Bind {
        name: Name::intern(name),
        annotation: None,
        value: Some(value),
    })
}

/// `name•annotation: value`
pub fn typed_bind(name: &str, annotation: NodeRef, value: NodeRef) -> NodeRef {
    Node::new(NodeKind::Bind {
        name: Name::intern(name),
        annotation: Some(annotation),
        value: Some(value),
    })
}

/// A required function or structure input.
pub fn input(name: &str, annotation: Option<NodeRef>) -> NodeRef {
    Node::new(NodeKind::Bind {
        name: Name::intern(name),
        annotation,
        value: None,
    })
}

/// An optional input with a default value.
pub fn input_with_default(name: &str, annotation: Option<NodeRef>, default: NodeRef) -> NodeRef {
    Node::new(NodeKind::Bind {
        name: Name::intern(name),
        annotation,
        value: Some(default),
    })
}

pub fn boolean(value: bool) -> NodeRef {
    Node::new(NodeKind::BooleanLiteral(value))
}

pub fn number(value: f64) -> NodeRef {
    measure(value, "")
}

/// A number with a unit in display form, e.g. `measure(3.0, "m/s")`.
pub fn measure(value: f64, unit: &str) -> NodeRef {
    Node::new(NodeKind::NumberLiteral {
        value,
        unit: Unit::parse(unit),
    })
}

pub fn text(value: &str) -> NodeRef {
    Node::new(NodeKind::TextLiteral(Arc::from(value)))
}

pub fn none() -> NodeRef {
    Node::new(NodeKind::NoneLiteral)
}

pub fn list(items: impl IntoIterator<Item = NodeRef>) -> NodeRef {
    Node::new(NodeKind::ListLiteral {
        items: nodes(items),
    })
}

pub fn set(items: impl IntoIterator<Item = NodeRef>) -> NodeRef {
    Node::new(NodeKind::SetLiteral {
        items: nodes(items),
    })
}

pub fn map(entries: impl IntoIterator<Item = NodeRef>) -> NodeRef {
    Node::new(NodeKind::MapLiteral {
        entries: nodes(entries),
    })
}

pub fn key_value(key: NodeRef, value: NodeRef) -> NodeRef {
    Node::new(NodeKind::KeyValue { key, value })
}

pub fn list_access(list: NodeRef, index: NodeRef) -> NodeRef {
    Node::new(NodeKind::ListAccess { list, index })
}

pub fn reference(name: &str) -> NodeRef {
    Node::new(NodeKind::Reference {
        name: Name::intern(name),
    })
}

pub fn property(structure: NodeRef, name: &str) -> NodeRef {
    Node::new(NodeKind::PropertyReference {
        structure,
        name: Name::intern(name),
    })
}

pub fn binary(left: NodeRef, op: BinaryOp, right: NodeRef) -> NodeRef {
    Node::new(NodeKind::BinaryOperation { left, op, right })
}

pub fn unary(op: UnaryOp, operand: NodeRef) -> NodeRef {
    Node::new(NodeKind::UnaryOperation { op, operand })
}

pub fn conditional(condition: NodeRef, yes: NodeRef, no: NodeRef) -> NodeRef {
    Node::new(NodeKind::Conditional { condition, yes, no })
}

pub fn is(expression: NodeRef, ty: NodeRef) -> NodeRef {
    Node::new(NodeKind::Is { expression, ty })
}

pub fn function(
    name: &str,
    inputs: impl IntoIterator<Item = NodeRef>,
    output: Option<NodeRef>,
    body: NodeRef,
) -> NodeRef {
    Node::new(NodeKind::FunctionDefinition {
        name: Name::intern(name),
        inputs: nodes(inputs),
        output,
        body: Some(body),
    })
}

/// A function whose body is still missing.
pub fn function_without_body(name: &str, inputs: impl IntoIterator<Item = NodeRef>) -> NodeRef {
    Node::new(NodeKind::FunctionDefinition {
        name: Name::intern(name),
        inputs: nodes(inputs),
        output: None,
        body: None,
    })
}

pub fn structure(name: &str, inputs: impl IntoIterator<Item = NodeRef>) -> NodeRef {
    Node::new(NodeKind::StructureDefinition {
        name: Name::intern(name),
        inputs: nodes(inputs),
    })
}

pub fn evaluate(function: NodeRef, inputs: impl IntoIterator<Item = NodeRef>) -> NodeRef {
    Node::new(NodeKind::Evaluate {
        function,
        inputs: nodes(inputs),
    })
}

/// `name(inputs...)`
pub fn call(name: &str, inputs: impl IntoIterator<Item = NodeRef>) -> NodeRef {
    evaluate(reference(name), inputs)
}

pub fn reaction(initial: NodeRef, condition: NodeRef, next: NodeRef) -> NodeRef {
    Node::new(NodeKind::Reaction {
        initial,
        condition,
        next,
    })
}

pub fn previous(stream: NodeRef, offset: Option<NodeRef>) -> NodeRef {
    Node::new(NodeKind::Previous { stream, offset })
}

pub fn changed(stream: NodeRef) -> NodeRef {
    Node::new(NodeKind::Changed { stream })
}

pub fn placeholder() -> NodeRef {
    Node::new(NodeKind::Placeholder)
}

pub fn unparsable(text: &str) -> NodeRef {
    Node::new(NodeKind::Unparsable {
        text: Arc::from(text),
    })
}

// Types

pub fn boolean_type() -> NodeRef {
    Node::new(NodeKind::BooleanType)
}

/// `#unit`; the empty string is a unitless number type.
pub fn number_type(unit: &str) -> NodeRef {
    Node::new(NodeKind::NumberType {
        unit: Unit::parse(unit),
    })
}

pub fn text_type() -> NodeRef {
    Node::new(NodeKind::TextType)
}

pub fn none_type() -> NodeRef {
    Node::new(NodeKind::NoneType)
}

pub fn any_type() -> NodeRef {
    Node::new(NodeKind::AnyType)
}

pub fn list_type(item: Option<NodeRef>) -> NodeRef {
    Node::new(NodeKind::ListType { item })
}

pub fn set_type(item: Option<NodeRef>) -> NodeRef {
    Node::new(NodeKind::SetType { item })
}

pub fn map_type(key: Option<NodeRef>, value: Option<NodeRef>) -> NodeRef {
    Node::new(NodeKind::MapType { key, value })
}

pub fn union_type(left: NodeRef, right: NodeRef) -> NodeRef {
    Node::new(NodeKind::UnionType { left, right })
}

pub fn name_type(name: &str) -> NodeRef {
    Node::new(NodeKind::NameType {
        name: Name::intern(name),
    })
}

pub fn function_type(inputs: impl IntoIterator<Item = NodeRef>, output: NodeRef) -> NodeRef {
    Node::new(NodeKind::FunctionType {
        inputs: nodes(inputs),
        output,
    })
}
