//! Type inference, one rule per node kind.
//!
//! Rules only ask for the types of other nodes through `Context::type_of`,
//! so results are memoized and cycles are cut.

use std::sync::Arc;

use lumen_ir::{BinaryOp, Name, Node, NodeKind, NodeRef, UnaryOp, Unit};

use crate::{
    Context, Definition, FunctionType, InputType, StreamSource, Type, TypeSet, UnknownReason,
};

/// What an operator does with its operand types.
#[derive(Clone, Debug, PartialEq)]
pub struct Operation {
    pub result: Type,
    /// The type the right operand must have, when the left decides it.
    pub expected_right: Option<Type>,
    /// False when the left operand's type has no such operator.
    pub defined: bool,
}

impl Operation {
    fn defined(result: Type, expected_right: Option<Type>) -> Self {
        Operation {
            result,
            expected_right,
            defined: true,
        }
    }
}

impl Context {
    pub(crate) fn infer(&self, node: &Node) -> Type {
        let id = node.id();
        match node.kind() {
            NodeKind::Program { block, .. } => self.type_of(block),
            NodeKind::Block { statements } => self.block_type(node, statements),
            NodeKind::Bind {
                annotation, value, ..
            } => match (annotation, value) {
                (Some(annotation), _) => self.type_of(annotation),
                (None, Some(value)) => self.type_of(value),
                (None, None) => Type::Any,
            },
            NodeKind::Borrow { .. } => match self.borrowed(node) {
                Some((_, Some(definition))) => self.definition_type(definition),
                Some((source, None)) => self.type_of(source.root()),
                None => Type::unknown(id, UnknownReason::UnknownBorrow),
            },
            NodeKind::BooleanLiteral(_) => Type::Bool,
            NodeKind::NumberLiteral { unit, .. } => Type::Number(unit.clone()),
            NodeKind::TextLiteral(_) => Type::Text,
            NodeKind::NoneLiteral => Type::None,
            NodeKind::ListLiteral { items } => Type::list(self.union_of(items)),
            NodeKind::SetLiteral { items } => Type::set(self.union_of(items)),
            NodeKind::MapLiteral { entries } => {
                let mut keys = Vec::new();
                let mut values = Vec::new();
                for entry in entries {
                    if let NodeKind::KeyValue { key, value } = entry.kind() {
                        keys.push(self.type_of(key));
                        values.push(self.type_of(value));
                    }
                }
                Type::map(Type::union_all(keys), Type::union_all(values))
            }
            NodeKind::KeyValue { value, .. } => self.type_of(value),
            NodeKind::ListAccess { list, .. } => match self.type_of(list) {
                Type::List(item) => item.or_none(),
                Type::Any => Type::Any,
                other => Type::unknown_because(id, UnknownReason::NotAList, other),
            },
            NodeKind::Reference { .. } => self.reference_type(node),
            NodeKind::PropertyReference { structure, name } => {
                self.property_type(node, &self.type_of(structure), *name)
            }
            NodeKind::BinaryOperation { left, op, right } => {
                self.operation(node, *op, left, right).result
            }
            NodeKind::UnaryOperation { op, operand } => {
                match (op, self.type_of(operand)) {
                    (UnaryOp::Negate, Type::Number(unit)) => Type::Number(unit),
                    (UnaryOp::Not, Type::Bool) => Type::Bool,
                    (_, Type::Any) => Type::Any,
                    (_, other) => Type::unknown_because(id, UnknownReason::NoOperator, other),
                }
            }
            NodeKind::Conditional { yes, no, .. } => {
                Type::union(self.type_of(yes), self.type_of(no))
            }
            NodeKind::Is { .. } | NodeKind::Changed { .. } => Type::Bool,
            NodeKind::FunctionDefinition { .. } | NodeKind::StructureDefinition { .. } => {
                self.signature(node)
                    .map_or_else(|| Type::unknown(id, UnknownReason::NotAFunction), Type::Function)
            }
            NodeKind::Evaluate { function, .. } => match self.type_of(function) {
                Type::Function(function) => function.output.clone(),
                Type::Any => Type::Any,
                other => Type::unknown_because(id, UnknownReason::NotAFunction, other),
            },
            NodeKind::Reaction { initial, next, .. } => {
                Type::union(self.type_of(initial), self.type_of(next))
            }
            NodeKind::Previous { stream, .. } => match self.stream_value_type(stream) {
                Some(value) => value.or_none(),
                None => Type::unknown(id, UnknownReason::NotAStream),
            },
            NodeKind::Placeholder => Type::unknown(id, UnknownReason::Placeholder),
            NodeKind::Unparsable { .. } => Type::unknown(id, UnknownReason::Unparsable),

            NodeKind::BooleanType => Type::Bool,
            NodeKind::NumberType { unit } => Type::Number(unit.clone()),
            NodeKind::TextType => Type::Text,
            NodeKind::NoneType => Type::None,
            NodeKind::AnyType => Type::Any,
            NodeKind::ListType { item } => Type::list(self.annotation_or_any(item.as_ref())),
            NodeKind::SetType { item } => Type::set(self.annotation_or_any(item.as_ref())),
            NodeKind::MapType { key, value } => Type::map(
                self.annotation_or_any(key.as_ref()),
                self.annotation_or_any(value.as_ref()),
            ),
            NodeKind::UnionType { left, right } => {
                Type::union(self.type_of(left), self.type_of(right))
            }
            NodeKind::NameType { name } => match self.resolve(node) {
                Some(Definition::Structure(definition)) => Type::Structure {
                    definition: definition.id(),
                    name: *name,
                },
                _ => Type::unknown(id, UnknownReason::UnknownName),
            },
            NodeKind::FunctionType { inputs, output } => {
                Type::Function(Arc::new(FunctionType {
                    definition: None,
                    inputs: inputs
                        .iter()
                        .map(|input| InputType {
                            name: Name::EMPTY,
                            ty: self.type_of(input),
                            optional: false,
                        })
                        .collect(),
                    output: self.type_of(output),
                }))
            }
        }
    }

    fn block_type(&self, block: &Node, statements: &[NodeRef]) -> Type {
        match statements.last() {
            // A block that ends by binding a name evaluates to nothing.
            Some(last) if matches!(last.kind(), NodeKind::Bind { .. }) => Type::None,
            Some(last) => self.type_of(last),
            None if self.is_program_block(block) => Type::None,
            None => Type::unknown(block.id(), UnknownReason::NoExpression),
        }
    }

    /// Whether `block` is the main block of a program.
    pub fn is_program_block(&self, block: &Node) -> bool {
        self.project()
            .tree_of(block.id())
            .and_then(|tree| tree.parent(block.id()))
            .is_some_and(|parent| matches!(parent.kind(), NodeKind::Program { .. }))
    }

    fn union_of(&self, items: &[NodeRef]) -> Type {
        Type::union_all(items.iter().map(|item| self.type_of(item)))
    }

    fn annotation_or_any(&self, annotation: Option<&NodeRef>) -> Type {
        annotation.map_or(Type::Any, |annotation| self.type_of(annotation))
    }

    /// The type a reference to `definition` has, before narrowing.
    pub fn definition_type(&self, definition: &Node) -> Type {
        match definition.kind() {
            NodeKind::Bind {
                annotation, value, ..
            } => match (annotation, value) {
                (Some(annotation), _) => self.type_of(annotation),
                (None, Some(value)) => self.type_of(value),
                (None, None) => Type::Any,
            },
            _ => self.type_of(definition),
        }
    }

    fn reference_type(&self, reference: &Node) -> Type {
        let id = reference.id();
        let Some(definition) = self.resolve(reference) else {
            return Type::unknown(id, UnknownReason::UnknownName);
        };
        if self.is_reference_cycle(reference) {
            return Type::unknown(id, UnknownReason::Cycle);
        }
        let base = match &definition {
            Definition::Bind(node)
            | Definition::Function(node)
            | Definition::Structure(node)
            | Definition::Borrow(node) => self.definition_type(node),
            Definition::ReactionValue { reaction, .. } => match reaction.kind() {
                NodeKind::Reaction { initial, .. } => self.type_of(initial),
                _ => Type::Any,
            },
            Definition::Stream(stream) => self
                .project()
                .stream_by_id(*stream)
                .map_or(Type::Any, |stream| stream.value_type.clone()),
        };
        self.narrow(reference, &definition, base)
    }

    /// Apply `x•T ? yes no` tests enclosing `reference`, outermost first.
    fn narrow(&self, reference: &Node, definition: &Definition, base: Type) -> Type {
        let Some(tree) = self.project().tree_of(reference.id()) else {
            return base;
        };
        let mut tests = Vec::new();
        let mut child = reference.id();
        for ancestor in tree.ancestors(reference.id()) {
            if let NodeKind::Conditional { condition, yes, no } = ancestor.kind() {
                if let NodeKind::Is { expression, ty } = condition.kind() {
                    let same = matches!(expression.kind(), NodeKind::Reference { .. })
                        && self.resolve(expression).as_ref() == Some(definition);
                    if same && child == yes.id() {
                        tests.push((true, ty));
                    } else if same && child == no.id() {
                        tests.push((false, ty));
                    }
                }
            }
            child = ancestor.id();
        }
        tests.into_iter().rev().fold(base, |narrowed, (matched, ty)| {
            let tested = self.type_of(ty);
            if matched {
                tested
            } else {
                TypeSet::of(&narrowed).difference(&tested).to_type()
            }
        })
    }

    fn property_type(&self, node: &Node, structure: &Type, name: Name) -> Type {
        match structure {
            Type::Structure { definition, .. } => {
                let input = self.project().get(*definition).and_then(|definition| {
                    match definition.kind() {
                        NodeKind::StructureDefinition { inputs, .. } => inputs
                            .iter()
                            .find(|input| input.defines_name() == Some(name))
                            .cloned(),
                        _ => None,
                    }
                });
                match input {
                    Some(input) => self.definition_type(&input),
                    None => Type::unknown(node.id(), UnknownReason::UnknownProperty),
                }
            }
            Type::Any => Type::Any,
            other => Type::unknown_because(node.id(), UnknownReason::NotAStructure, other.clone()),
        }
    }

    /// Signature of a function or structure definition.
    pub fn signature(&self, definition: &Node) -> Option<Arc<FunctionType>> {
        let (inputs, output) = match definition.kind() {
            NodeKind::FunctionDefinition {
                inputs,
                output,
                body,
                ..
            } => {
                let output = match (output, body) {
                    (Some(output), _) => self.type_of(output),
                    (None, Some(body)) => self.type_of(body),
                    (None, None) => Type::unknown(definition.id(), UnknownReason::NoExpression),
                };
                (inputs, output)
            }
            NodeKind::StructureDefinition { inputs, name } => (
                inputs,
                Type::Structure {
                    definition: definition.id(),
                    name: *name,
                },
            ),
            _ => return None,
        };
        let inputs = inputs
            .iter()
            .filter_map(|input| match input.kind() {
                NodeKind::Bind { name, value, .. } => Some(InputType {
                    name: *name,
                    ty: self.definition_type(input),
                    optional: value.is_some(),
                }),
                _ => None,
            })
            .collect();
        Some(Arc::new(FunctionType {
            definition: Some(definition.id()),
            inputs,
            output,
        }))
    }

    /// Value type of the stream `operand` names.
    pub fn stream_value_type(&self, operand: &Node) -> Option<Type> {
        match self.stream_source(operand)? {
            StreamSource::External(id) => self
                .project()
                .stream_by_id(id)
                .map(|stream| stream.value_type.clone()),
            StreamSource::Reaction(reaction) => self.type_of_id(reaction),
        }
    }

    /// Result of applying `op`, decided by the left operand's type.
    pub fn operation(&self, node: &Node, op: BinaryOp, left: &Node, right: &Node) -> Operation {
        let left_type = self.type_of(left);
        let right_type = self.type_of(right);
        let undefined = |left_type: Type| Operation {
            result: Type::unknown_because(node.id(), UnknownReason::NoOperator, left_type),
            expected_right: None,
            defined: false,
        };

        if op.is_equality() {
            return Operation::defined(Type::Bool, None);
        }
        match left_type {
            Type::Any => Operation::defined(Type::Any, None),
            unknown @ Type::Unknown(_) => Operation {
                result: Type::unknown_because(node.id(), UnknownReason::NoOperator, unknown),
                expected_right: None,
                defined: true,
            },
            Type::Bool if op.is_logical() => Operation::defined(Type::Bool, Some(Type::Bool)),
            Type::Text if op == BinaryOp::Add => Operation::defined(Type::Text, Some(Type::Text)),
            Type::Number(unit) => match op {
                BinaryOp::Add | BinaryOp::Subtract | BinaryOp::Remainder => Operation::defined(
                    Type::Number(unit.clone()),
                    Some(Type::Number(unit)),
                ),
                BinaryOp::Multiply | BinaryOp::Divide => match right_type {
                    Type::Number(other) => {
                        let result = if op == BinaryOp::Multiply {
                            unit.product(&other)
                        } else {
                            unit.quotient(&other)
                        };
                        Operation::defined(Type::Number(result), Some(Type::Number(other)))
                    }
                    _ => Operation::defined(Type::Number(unit), Some(Type::unitless())),
                },
                BinaryOp::Power => {
                    let result = if unit.is_unitless() {
                        Unit::unitless()
                    } else {
                        match integral_literal(right) {
                            Some(exponent) => unit.power(exponent),
                            None => unit,
                        }
                    };
                    Operation::defined(Type::Number(result), Some(Type::unitless()))
                }
                _ if op.is_ordering() => {
                    Operation::defined(Type::Bool, Some(Type::Number(unit)))
                }
                _ => undefined(Type::Number(unit)),
            },
            other => undefined(other),
        }
    }
}

/// The value of an integral number literal, for unit exponents.
pub fn integral_literal(node: &Node) -> Option<i32> {
    match node.kind() {
        NodeKind::NumberLiteral { value, unit } if unit.is_unitless() && value.fract() == 0.0 => {
            // Exponents beyond i32 have no meaningful unit anyway.
            if value.abs() <= f64::from(i32::MAX) {
                Some(*value as i32)
            } else {
                None
            }
        }
        _ => None,
    }
}
