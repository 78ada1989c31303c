//! Lowering nodes to steps.
//!
//! Operands are compiled left to right with no reordering. Composite nodes
//! are bracketed by `Start`/`Finish`; their `Finish` pops operands in
//! reverse. Nodes that cannot evaluate compile to a single `Halt`.
//! Conditionals and reactions use relative jumps patched once their branch
//! lengths are known.

use lumen_ir::{ensure_sufficient_stack, NodeKind, NodeRef};
use lumen_types::{Context, Definition, Type, UnknownReason};
use lumen_values::{Exception, Value};

use crate::Step;

/// Steps for `node`.
#[tracing::instrument(level = "debug", skip_all, fields(node = %node.id()))]
pub fn compile(context: &Context, node: &NodeRef) -> Vec<Step> {
    let steps = Compiler::new(context).compile(node);
    tracing::debug!(steps = steps.len(), "compiled");
    steps
}

/// Steps that evaluate a call to `definition` once its first `provided`
/// inputs are bound: defaults for the omitted inputs, then the body (or,
/// for a structure, its construction).
#[tracing::instrument(level = "debug", skip_all, fields(definition = %definition.id(), provided = provided))]
pub fn compile_function(context: &Context, definition: &NodeRef, provided: usize) -> Vec<Step> {
    Compiler::new(context).compile_function(definition, provided)
}

pub struct Compiler<'a> {
    context: &'a Context,
}

impl<'a> Compiler<'a> {
    pub fn new(context: &'a Context) -> Self {
        Compiler { context }
    }

    pub fn compile(&self, node: &NodeRef) -> Vec<Step> {
        let mut steps = Vec::with_capacity(node.size().saturating_mul(2));
        self.compile_into(node, &mut steps);
        steps
    }

    pub fn compile_function(&self, definition: &NodeRef, provided: usize) -> Vec<Step> {
        let mut steps = Vec::new();
        let inputs = match definition.kind() {
            NodeKind::FunctionDefinition { inputs, .. }
            | NodeKind::StructureDefinition { inputs, .. } => inputs.as_slice(),
            _ => {
                halt(&mut steps, definition, Exception::value_expected(definition.id()));
                return steps;
            }
        };
        for input in inputs.iter().skip(provided) {
            match input.kind() {
                NodeKind::Bind { value: Some(_), .. } => self.compile_into(input, &mut steps),
                _ => halt(&mut steps, input, Exception::value_expected(input.id())),
            }
        }
        match definition.kind() {
            NodeKind::FunctionDefinition {
                body: Some(body), ..
            } => self.compile_into(body, &mut steps),
            NodeKind::StructureDefinition { .. } => steps.push(Step::Construct {
                node: NodeRef::clone(definition),
            }),
            _ => halt(&mut steps, definition, Exception::value_expected(definition.id())),
        }
        steps
    }

    fn compile_into(&self, node: &NodeRef, steps: &mut Vec<Step>) {
        ensure_sufficient_stack(|| self.compile_node(node, steps));
    }

    fn compile_node(&self, node: &NodeRef, steps: &mut Vec<Step>) {
        let id = node.id();
        match node.kind() {
            NodeKind::Program { borrows, block } => {
                let children: Vec<&NodeRef> = borrows.iter().chain([block]).collect();
                self.composite(node, &children, steps);
            }
            NodeKind::Block { statements } => {
                if statements.is_empty() && !self.context.is_program_block(node) {
                    halt(steps, node, Exception::value_expected(id));
                } else {
                    let children: Vec<&NodeRef> = statements.iter().collect();
                    self.composite(node, &children, steps);
                }
            }
            NodeKind::Bind { value, .. } => match value {
                Some(value) => self.composite(node, &[value], steps),
                None => halt(steps, node, Exception::value_expected(id)),
            },
            NodeKind::BooleanLiteral(b) => literal(steps, node, Value::Bool(*b)),
            NodeKind::NumberLiteral { value, unit } => {
                literal(steps, node, Value::measure(*value, unit.clone()));
            }
            NodeKind::TextLiteral(text) => literal(steps, node, Value::Text(text.clone())),
            NodeKind::NoneLiteral => literal(steps, node, Value::None),
            NodeKind::ListLiteral { items } | NodeKind::SetLiteral { items } => {
                let children: Vec<&NodeRef> = items.iter().collect();
                self.composite(node, &children, steps);
            }
            NodeKind::MapLiteral { entries } => {
                let mut children = Vec::with_capacity(entries.len().saturating_mul(2));
                for entry in entries {
                    if let NodeKind::KeyValue { key, value } = entry.kind() {
                        children.push(key);
                        children.push(value);
                    } else {
                        let exception = Exception::type_mismatch(
                            entry.id(),
                            Type::map(Type::Any, Type::Any),
                            self.context.type_of(entry),
                        );
                        halt(steps, node, exception);
                        return;
                    }
                }
                self.composite(node, &children, steps);
            }
            NodeKind::KeyValue { .. } => {
                let exception = Exception::type_mismatch(
                    id,
                    Type::map(Type::Any, Type::Any),
                    self.context.type_of(node),
                );
                halt(steps, node, exception);
            }
            NodeKind::ListAccess { list, index } => self.composite(node, &[list, index], steps),
            NodeKind::Reference { name } => match self.context.resolve(node) {
                Some(Definition::ReactionValue { reaction, .. }) => steps.push(Step::Latest {
                    node: NodeRef::clone(node),
                    reaction: reaction.id(),
                }),
                _ if self.context.is_reference_cycle(node) => {
                    halt(steps, node, Exception::cycle(id, Some(*name)));
                }
                _ => steps.push(Step::StartFinish {
                    node: NodeRef::clone(node),
                }),
            },
            NodeKind::PropertyReference { structure, .. } => {
                self.composite(node, &[structure], steps);
            }
            NodeKind::BinaryOperation { left, right, .. } => {
                self.composite(node, &[left, right], steps);
            }
            NodeKind::UnaryOperation { operand, .. } => self.composite(node, &[operand], steps),
            NodeKind::Conditional { condition, yes, no } => {
                self.conditional(node, condition, yes, no, steps);
            }
            NodeKind::Is { expression, .. } => self.composite(node, &[expression], steps),
            NodeKind::FunctionDefinition { .. }
            | NodeKind::StructureDefinition { .. }
            | NodeKind::Borrow { .. } => steps.push(Step::StartFinish {
                node: NodeRef::clone(node),
            }),
            NodeKind::Evaluate { function, inputs } => {
                let children: Vec<&NodeRef> = std::iter::once(function).chain(inputs).collect();
                self.composite(node, &children, steps);
            }
            NodeKind::Reaction {
                initial,
                condition,
                next,
            } => self.reaction(node, initial, condition, next, steps),
            NodeKind::Previous { stream, offset } => {
                let start = push_start(node, steps);
                self.stream(stream, steps);
                if let Some(offset) = offset {
                    self.compile_into(offset, steps);
                }
                finish(node, start, steps);
            }
            NodeKind::Changed { stream } => {
                let start = push_start(node, steps);
                self.stream(stream, steps);
                finish(node, start, steps);
            }
            NodeKind::Placeholder => halt(steps, node, Exception::placeholder(id)),
            NodeKind::Unparsable { .. } => halt(steps, node, Exception::unparsable(id)),
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
            | NodeKind::FunctionType { .. } => halt(steps, node, Exception::value_expected(id)),
        }
    }

    fn composite(&self, node: &NodeRef, children: &[&NodeRef], steps: &mut Vec<Step>) {
        let start = push_start(node, steps);
        for child in children {
            self.compile_into(child, steps);
        }
        finish(node, start, steps);
    }

    /// The operand of `Previous` or `Changed`: the stream itself.
    fn stream(&self, operand: &NodeRef, steps: &mut Vec<Step>) {
        if self.context.stream_source(operand).is_some() {
            steps.push(Step::Stream {
                node: NodeRef::clone(operand),
            });
        } else {
            let exception = Exception::type_mismatch(
                operand.id(),
                Type::unknown(operand.id(), UnknownReason::NotAStream),
                self.context.type_of(operand),
            );
            halt(steps, operand, exception);
        }
    }

    /// `Start, condition, JumpIfFalse, yes, Jump, no, Finish`
    fn conditional(
        &self,
        node: &NodeRef,
        condition: &NodeRef,
        yes: &NodeRef,
        no: &NodeRef,
        steps: &mut Vec<Step>,
    ) {
        let start = push_start(node, steps);
        self.compile_into(condition, steps);
        let if_false = jump(steps, node, JumpKind::IfFalse);
        self.compile_into(yes, steps);
        let to_finish = jump(steps, node, JumpKind::Always);
        patch(steps, if_false);
        self.compile_into(no, steps);
        patch(steps, to_finish);
        finish(node, start, steps);
    }

    /// `Start, JumpIfPrimed, initial, Jump, condition, JumpIfFalse, next,
    /// Jump, Latest, Finish`
    fn reaction(
        &self,
        node: &NodeRef,
        initial: &NodeRef,
        condition: &NodeRef,
        next: &NodeRef,
        steps: &mut Vec<Step>,
    ) {
        let start = push_start(node, steps);
        let if_primed = jump(steps, node, JumpKind::IfPrimed);
        self.compile_into(initial, steps);
        let to_finish = jump(steps, node, JumpKind::Always);
        patch(steps, if_primed);
        self.compile_into(condition, steps);
        let if_false = jump(steps, node, JumpKind::IfFalse);
        self.compile_into(next, steps);
        steps.push(Step::Jump {
            node: NodeRef::clone(node),
            offset: 1,
        });
        patch(steps, if_false);
        steps.push(Step::Latest {
            node: NodeRef::clone(node),
            reaction: node.id(),
        });
        patch(steps, to_finish);
        finish(node, start, steps);
    }
}

#[derive(Copy, Clone)]
enum JumpKind {
    Always,
    IfFalse,
    IfPrimed,
}

#[expect(
    clippy::arithmetic_side_effects,
    reason = "a step was just pushed, so len >= 1"
)]
fn push_start(node: &NodeRef, steps: &mut Vec<Step>) -> usize {
    steps.push(Step::Start {
        node: NodeRef::clone(node),
        skip: 0,
    });
    steps.len() - 1
}

/// Push a jump whose offset is patched later; returns its index.
#[expect(
    clippy::arithmetic_side_effects,
    reason = "a step was just pushed, so len >= 1"
)]
fn jump(steps: &mut Vec<Step>, node: &NodeRef, kind: JumpKind) -> usize {
    let node = NodeRef::clone(node);
    steps.push(match kind {
        JumpKind::Always => Step::Jump { node, offset: 0 },
        JumpKind::IfFalse => Step::JumpIfFalse { node, offset: 0 },
        JumpKind::IfPrimed => Step::JumpIfPrimed { node, offset: 0 },
    });
    steps.len() - 1
}

/// Point the jump at `index` to the next step to be pushed.
#[expect(
    clippy::arithmetic_side_effects,
    reason = "the jump at index is already in steps"
)]
fn patch(steps: &mut [Step], index: usize) {
    let target = steps.len() - index - 1;
    if let Step::Jump { offset, .. }
    | Step::JumpIfFalse { offset, .. }
    | Step::JumpIfPrimed { offset, .. } = &mut steps[index]
    {
        *offset = target;
    }
}

#[expect(
    clippy::arithmetic_side_effects,
    reason = "the start step precedes the finish just pushed"
)]
fn finish(node: &NodeRef, start: usize, steps: &mut Vec<Step>) {
    steps.push(Step::Finish {
        node: NodeRef::clone(node),
    });
    let length = steps.len() - start - 1;
    if let Step::Start { skip, .. } = &mut steps[start] {
        *skip = length;
    }
}

fn literal(steps: &mut Vec<Step>, node: &NodeRef, value: Value) {
    steps.push(Step::Literal {
        node: NodeRef::clone(node),
        value,
    });
}

fn halt(steps: &mut Vec<Step>, node: &NodeRef, exception: Exception) {
    steps.push(Step::Halt {
        node: NodeRef::clone(node),
        exception,
    });
}
