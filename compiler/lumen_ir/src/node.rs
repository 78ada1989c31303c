//! Syntax tree nodes.
//!
//! `Node` is an immutable record of an id and a `NodeKind`. Children are held
//! as `NodeRef` (`Arc<Node>`), which is what makes clone-and-replace cheap:
//! a replacement rebuilds only the path from the root to the replaced node.

use std::sync::Arc;

use smallvec::SmallVec;

use crate::{ensure_sufficient_stack, BinaryOp, Name, NodeId, UnaryOp, Unit};

/// Shared handle to a node.
pub type NodeRef = Arc<Node>;

/// A syntax tree element.
#[derive(Debug)]
pub struct Node {
    id: NodeId,
    kind: NodeKind,
}

/// All node kinds, expressions first, then type annotations.
#[derive(Debug, Clone)]
pub enum NodeKind {
    // Expressions
    /// A source's root: its borrows followed by its main block.
    Program {
        borrows: Vec<NodeRef>,
        block: NodeRef,
    },
    /// `↓ source` or `↓ source.name`.
    Borrow {
        source: Name,
        name: Option<Name>,
    },
    Block {
        statements: Vec<NodeRef>,
    },
    /// `name•Type: value`. Function and structure inputs are binds too; a
    /// missing value makes the input required.
    Bind {
        name: Name,
        annotation: Option<NodeRef>,
        value: Option<NodeRef>,
    },
    BooleanLiteral(bool),
    NumberLiteral {
        value: f64,
        unit: Unit,
    },
    TextLiteral(Arc<str>),
    NoneLiteral,
    ListLiteral {
        items: Vec<NodeRef>,
    },
    SetLiteral {
        items: Vec<NodeRef>,
    },
    /// `{k:v ...}`. Entries are expected to be `KeyValue` nodes; anything
    /// else is a `NotAMap` conflict and halts when evaluated.
    MapLiteral {
        entries: Vec<NodeRef>,
    },
    KeyValue {
        key: NodeRef,
        value: NodeRef,
    },
    ListAccess {
        list: NodeRef,
        index: NodeRef,
    },
    Reference {
        name: Name,
    },
    PropertyReference {
        structure: NodeRef,
        name: Name,
    },
    BinaryOperation {
        left: NodeRef,
        op: BinaryOp,
        right: NodeRef,
    },
    UnaryOperation {
        op: UnaryOp,
        operand: NodeRef,
    },
    Conditional {
        condition: NodeRef,
        yes: NodeRef,
        no: NodeRef,
    },
    /// `value•Type`, a runtime type test.
    Is {
        expression: NodeRef,
        ty: NodeRef,
    },
    FunctionDefinition {
        name: Name,
        inputs: Vec<NodeRef>,
        output: Option<NodeRef>,
        body: Option<NodeRef>,
    },
    StructureDefinition {
        name: Name,
        inputs: Vec<NodeRef>,
    },
    Evaluate {
        function: NodeRef,
        inputs: Vec<NodeRef>,
    },
    /// `initial … condition … next`.
    Reaction {
        initial: NodeRef,
        condition: NodeRef,
        next: NodeRef,
    },
    /// `← stream` or `←offset stream`.
    Previous {
        stream: NodeRef,
        offset: Option<NodeRef>,
    },
    /// `∆ stream`.
    Changed {
        stream: NodeRef,
    },
    Placeholder,
    Unparsable {
        text: Arc<str>,
    },

    // Types
    BooleanType,
    NumberType {
        unit: Unit,
    },
    TextType,
    NoneType,
    AnyType,
    ListType {
        item: Option<NodeRef>,
    },
    SetType {
        item: Option<NodeRef>,
    },
    MapType {
        key: Option<NodeRef>,
        value: Option<NodeRef>,
    },
    UnionType {
        left: NodeRef,
        right: NodeRef,
    },
    /// A structure type named by its definition.
    NameType {
        name: Name,
    },
    FunctionType {
        inputs: Vec<NodeRef>,
        output: NodeRef,
    },
}

/// Child list. Most nodes have at most four children.
pub type Children<'a> = SmallVec<[&'a NodeRef; 4]>;

impl Node {
    /// Build a node with a fresh id.
    pub fn new(kind: NodeKind) -> NodeRef {
        Arc::new(Node {
            id: NodeId::fresh(),
            kind,
        })
    }

    #[inline]
    pub fn id(&self) -> NodeId {
        self.id
    }

    #[inline]
    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Children in evaluation order.
    pub fn children(&self) -> Children<'_> {
        let mut children = Children::new();
        match &self.kind {
            NodeKind::Program { borrows, block } => {
                children.extend(borrows);
                children.push(block);
            }
            NodeKind::Block { statements } => children.extend(statements),
            NodeKind::Bind {
                annotation, value, ..
            } => {
                children.extend(annotation);
                children.extend(value);
            }
            NodeKind::ListLiteral { items } | NodeKind::SetLiteral { items } => {
                children.extend(items);
            }
            NodeKind::MapLiteral { entries } => children.extend(entries),
            NodeKind::KeyValue { key, value } => {
                children.push(key);
                children.push(value);
            }
            NodeKind::ListAccess { list, index } => {
                children.push(list);
                children.push(index);
            }
            NodeKind::PropertyReference { structure, .. } => children.push(structure),
            NodeKind::BinaryOperation { left, right, .. } => {
                children.push(left);
                children.push(right);
            }
            NodeKind::UnaryOperation { operand, .. } => children.push(operand),
            NodeKind::Conditional { condition, yes, no } => {
                children.push(condition);
                children.push(yes);
                children.push(no);
            }
            NodeKind::Is { expression, ty } => {
                children.push(expression);
                children.push(ty);
            }
            NodeKind::FunctionDefinition {
                inputs,
                output,
                body,
                ..
            } => {
                children.extend(inputs);
                children.extend(output);
                children.extend(body);
            }
            NodeKind::StructureDefinition { inputs, .. } => children.extend(inputs),
            NodeKind::Evaluate { function, inputs } => {
                children.push(function);
                children.extend(inputs);
            }
            NodeKind::Reaction {
                initial,
                condition,
                next,
            } => {
                children.push(initial);
                children.push(condition);
                children.push(next);
            }
            NodeKind::Previous { stream, offset } => {
                children.extend(offset);
                children.push(stream);
            }
            NodeKind::Changed { stream } => children.push(stream),
            NodeKind::ListType { item } | NodeKind::SetType { item } => children.extend(item),
            NodeKind::MapType { key, value } => {
                children.extend(key);
                children.extend(value);
            }
            NodeKind::UnionType { left, right } => {
                children.push(left);
                children.push(right);
            }
            NodeKind::FunctionType { inputs, output } => {
                children.extend(inputs);
                children.push(output);
            }
            NodeKind::Borrow { .. }
            | NodeKind::BooleanLiteral(_)
            | NodeKind::NumberLiteral { .. }
            | NodeKind::TextLiteral(_)
            | NodeKind::NoneLiteral
            | NodeKind::Reference { .. }
            | NodeKind::Placeholder
            | NodeKind::Unparsable { .. }
            | NodeKind::BooleanType
            | NodeKind::NumberType { .. }
            | NodeKind::TextType
            | NodeKind::NoneType
            | NodeKind::AnyType
            | NodeKind::NameType { .. } => {}
        }
        children
    }

    /// Whether `id` names this node or any descendant.
    pub fn contains(&self, id: NodeId) -> bool {
        ensure_sufficient_stack(|| {
            self.id == id || self.children().iter().any(|child| child.contains(id))
        })
    }

    /// Number of nodes in this subtree.
    pub fn size(&self) -> usize {
        ensure_sufficient_stack(|| {
            1 + self
                .children()
                .iter()
                .map(|child| child.size())
                .sum::<usize>()
        })
    }

    /// Clone-and-replace.
    ///
    /// Returns a new root in which the node `original` is swapped for
    /// `replacement`. Every ancestor of `original` is rebuilt with a fresh
    /// id; every other subtree is shared with `this`. If `original` is not
    /// in the tree, `this` itself is returned.
    pub fn replace(this: &NodeRef, original: NodeId, replacement: &NodeRef) -> NodeRef {
        replaced(this, original, replacement).unwrap_or_else(|| Arc::clone(this))
    }

    /// Whether this node is a type annotation rather than an expression.
    pub fn is_type(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::BooleanType
                | NodeKind::NumberType { .. }
                | NodeKind::TextType
                | NodeKind::NoneType
                | NodeKind::AnyType
                | NodeKind::ListType { .. }
                | NodeKind::SetType { .. }
                | NodeKind::MapType { .. }
                | NodeKind::UnionType { .. }
                | NodeKind::NameType { .. }
                | NodeKind::FunctionType { .. }
        )
    }

    /// Literals evaluate to a constant without evaluating any operands.
    pub fn is_literal(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::BooleanLiteral(_)
                | NodeKind::NumberLiteral { .. }
                | NodeKind::TextLiteral(_)
                | NodeKind::NoneLiteral
        )
    }

    /// Nodes whose evaluation introduces a name into the enclosing scope.
    pub fn defines_name(&self) -> Option<Name> {
        match &self.kind {
            NodeKind::Bind { name, .. }
            | NodeKind::FunctionDefinition { name, .. }
            | NodeKind::StructureDefinition { name, .. } => Some(*name),
            NodeKind::Borrow { source, name } => Some(name.unwrap_or(*source)),
            _ => None,
        }
    }

    /// Short kind label, used in templates and traces.
    pub fn label(&self) -> &'static str {
        self.kind.label()
    }
}

impl NodeKind {
    pub fn label(&self) -> &'static str {
        match self {
            NodeKind::Program { .. } => "Program",
            NodeKind::Borrow { .. } => "Borrow",
            NodeKind::Block { .. } => "Block",
            NodeKind::Bind { .. } => "Bind",
            NodeKind::BooleanLiteral(_) => "BooleanLiteral",
            NodeKind::NumberLiteral { .. } => "NumberLiteral",
            NodeKind::TextLiteral(_) => "TextLiteral",
            NodeKind::NoneLiteral => "NoneLiteral",
            NodeKind::ListLiteral { .. } => "ListLiteral",
            NodeKind::SetLiteral { .. } => "SetLiteral",
            NodeKind::MapLiteral { .. } => "MapLiteral",
            NodeKind::KeyValue { .. } => "KeyValue",
            NodeKind::ListAccess { .. } => "ListAccess",
            NodeKind::Reference { .. } => "Reference",
            NodeKind::PropertyReference { .. } => "PropertyReference",
            NodeKind::BinaryOperation { .. } => "BinaryOperation",
            NodeKind::UnaryOperation { .. } => "UnaryOperation",
            NodeKind::Conditional { .. } => "Conditional",
            NodeKind::Is { .. } => "Is",
            NodeKind::FunctionDefinition { .. } => "FunctionDefinition",
            NodeKind::StructureDefinition { .. } => "StructureDefinition",
            NodeKind::Evaluate { .. } => "Evaluate",
            NodeKind::Reaction { .. } => "Reaction",
            NodeKind::Previous { .. } => "Previous",
            NodeKind::Changed { .. } => "Changed",
            NodeKind::Placeholder => "Placeholder",
            NodeKind::Unparsable { .. } => "Unparsable",
            NodeKind::BooleanType => "BooleanType",
            NodeKind::NumberType { .. } => "NumberType",
            NodeKind::TextType => "TextType",
            NodeKind::NoneType => "NoneType",
            NodeKind::AnyType => "AnyType",
            NodeKind::ListType { .. } => "ListType",
            NodeKind::SetType { .. } => "SetType",
            NodeKind::MapType { .. } => "MapType",
            NodeKind::UnionType { .. } => "UnionType",
            NodeKind::NameType { .. } => "NameType",
            NodeKind::FunctionType { .. } => "FunctionType",
        }
    }

    /// Copy this kind with every child passed through `f`.
    ///
    /// Child order matches `Node::children`.
    pub fn map_children(&self, f: &mut dyn FnMut(&NodeRef) -> NodeRef) -> NodeKind {
        match self {
            NodeKind::Program { borrows, block } => NodeKind::Program {
                borrows: map_all(borrows, f),
                block: f(block),
            },
            NodeKind::Block { statements } => NodeKind::Block {
                statements: map_all(statements, f),
            },
            NodeKind::Bind {
                name,
                annotation,
                value,
            } => NodeKind::Bind {
                name: *name,
                annotation: map_opt(annotation.as_ref(), f),
                value: map_opt(value.as_ref(), f),
            },
            NodeKind::ListLiteral { items } => NodeKind::ListLiteral {
                items: map_all(items, f),
            },
            NodeKind::SetLiteral { items } => NodeKind::SetLiteral {
                items: map_all(items, f),
            },
            NodeKind::MapLiteral { entries } => NodeKind::MapLiteral {
                entries: map_all(entries, f),
            },
            NodeKind::KeyValue { key, value } => NodeKind::KeyValue {
                key: f(key),
                value: f(value),
            },
            NodeKind::ListAccess { list, index } => NodeKind::ListAccess {
                list: f(list),
                index: f(index),
            },
            NodeKind::PropertyReference { structure, name } => NodeKind::PropertyReference {
                structure: f(structure),
                name: *name,
            },
            NodeKind::BinaryOperation { left, op, right } => NodeKind::BinaryOperation {
                left: f(left),
                op: *op,
                right: f(right),
            },
            NodeKind::UnaryOperation { op, operand } => NodeKind::UnaryOperation {
                op: *op,
                operand: f(operand),
            },
            NodeKind::Conditional { condition, yes, no } => NodeKind::Conditional {
                condition: f(condition),
                yes: f(yes),
                no: f(no),
            },
            NodeKind::Is { expression, ty } => NodeKind::Is {
                expression: f(expression),
                ty: f(ty),
            },
            NodeKind::FunctionDefinition {
                name,
                inputs,
                output,
                body,
            } => NodeKind::FunctionDefinition {
                name: *name,
                inputs: map_all(inputs, f),
                output: map_opt(output.as_ref(), f),
                body: map_opt(body.as_ref(), f),
            },
            NodeKind::StructureDefinition { name, inputs } => NodeKind::StructureDefinition {
                name: *name,
                inputs: map_all(inputs, f),
            },
            NodeKind::Evaluate { function, inputs } => NodeKind::Evaluate {
                function: f(function),
                inputs: map_all(inputs, f),
            },
            NodeKind::Reaction {
                initial,
                condition,
                next,
            } => NodeKind::Reaction {
                initial: f(initial),
                condition: f(condition),
                next: f(next),
            },
            NodeKind::Previous { stream, offset } => {
                let offset = map_opt(offset.as_ref(), f);
                NodeKind::Previous {
                    stream: f(stream),
                    offset,
                }
            }
            NodeKind::Changed { stream } => NodeKind::Changed { stream: f(stream) },
            NodeKind::ListType { item } => NodeKind::ListType {
                item: map_opt(item.as_ref(), f),
            },
            NodeKind::SetType { item } => NodeKind::SetType {
                item: map_opt(item.as_ref(), f),
            },
            NodeKind::MapType { key, value } => NodeKind::MapType {
                key: map_opt(key.as_ref(), f),
                value: map_opt(value.as_ref(), f),
            },
            NodeKind::UnionType { left, right } => NodeKind::UnionType {
                left: f(left),
                right: f(right),
            },
            NodeKind::FunctionType { inputs, output } => NodeKind::FunctionType {
                inputs: map_all(inputs, f),
                output: f(output),
            },
            leaf => leaf.clone(),
        }
    }
}

fn map_all(children: &[NodeRef], f: &mut dyn FnMut(&NodeRef) -> NodeRef) -> Vec<NodeRef> {
    children.iter().map(|child| f(child)).collect()
}

fn map_opt(
    child: Option<&NodeRef>,
    f: &mut dyn FnMut(&NodeRef) -> NodeRef,
) -> Option<NodeRef> {
    child.map(|child| f(child))
}

/// `Some(new)` when `original` occurs under `node`, `None` when unchanged.
fn replaced(node: &NodeRef, original: NodeId, replacement: &NodeRef) -> Option<NodeRef> {
    if node.id == original {
        return Some(Arc::clone(replacement));
    }
    ensure_sufficient_stack(|| {
        let mut changed = false;
        let kind = node.kind.map_children(&mut |child: &NodeRef| {
            if let Some(new) = replaced(child, original, replacement) {
                changed = true;
                new
            } else {
                Arc::clone(child)
            }
        });
        changed.then(|| Node::new(kind))
    })
}

#[cfg(test)]
mod tests;
