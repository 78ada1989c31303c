//! `Finish` steps: pop a node's operands and produce its value.
//!
//! Operands were pushed left to right, so they are popped as one run from
//! the top of the stack and read in source order.

use std::sync::Arc;

use lumen_ir::{Name, NodeKind, NodeRef};
use lumen_types::{FunctionType, StreamSource, Type, UnknownReason};
use lumen_values::{Binding, Exception, FunctionValue, Heap, Value};

use super::{Evaluator, Frame};
use crate::{compile_function, evaluate_binary, evaluate_unary, Step, StreamState};

pub(super) enum Finished {
    Value(Value),
    /// A function frame was pushed; the node completes when it returns.
    Called,
}

impl Evaluator {
    pub(super) fn finish(&mut self, node: &NodeRef) -> Result<Finished, Exception> {
        let id = node.id();
        let value = match node.kind() {
            NodeKind::Program { borrows, .. } => self.pop_values(borrows.len().saturating_add(1)).pop(),
            NodeKind::Block { statements } => {
                let mut values = self.pop_values(statements.len());
                if !self.context.is_program_block(node) {
                    if let Some(frame) = self.frames.last_mut() {
                        frame.scopes.pop();
                    }
                }
                match statements.last() {
                    Some(last) if matches!(last.kind(), NodeKind::Bind { .. }) => None,
                    _ => values.pop(),
                }
            }
            NodeKind::Bind { name, .. } => {
                let value = self.pop();
                self.bind(*name, value.clone());
                Some(value)
            }
            NodeKind::ListLiteral { items } => Some(Value::list(self.pop_values(items.len()))),
            NodeKind::SetLiteral { items } => Some(Value::set(self.pop_values(items.len()))),
            NodeKind::MapLiteral { entries } => {
                let mut values = self.pop_values(entries.len().saturating_mul(2)).into_iter();
                let mut pairs = Vec::with_capacity(entries.len());
                while let (Some(key), Some(value)) = (values.next(), values.next()) {
                    pairs.push((key, value));
                }
                Some(Value::map(pairs))
            }
            NodeKind::ListAccess { .. } => {
                let index = self.pop();
                let list = self.pop();
                Some(list_access(node, &list, &index)?)
            }
            NodeKind::PropertyReference { name, .. } => {
                let structure = self.pop();
                Some(property(node, &structure, *name)?)
            }
            NodeKind::BinaryOperation { op, .. } => {
                let right = self.pop();
                let left = self.pop();
                Some(evaluate_binary(id, &left, *op, &right)?)
            }
            NodeKind::UnaryOperation { op, .. } => {
                let operand = self.pop();
                Some(evaluate_unary(id, *op, &operand)?)
            }
            // The condition was consumed by the jump; only the branch's value
            // is left.
            NodeKind::Conditional { .. } => Some(self.pop()),
            NodeKind::Is { ty, .. } => {
                let value = self.pop();
                let tested = self.context.type_of(ty);
                Some(Value::Bool(tested.accepts(&value.type_of())))
            }
            NodeKind::Evaluate { inputs, .. } => return self.call(node, inputs),
            NodeKind::Reaction { .. } => Some(self.finish_reaction(node)),
            NodeKind::Previous { offset, .. } => {
                let offset = match offset {
                    Some(_) => {
                        let value = self.pop();
                        previous_offset(node, &value)?
                    }
                    None => 1,
                };
                let source = stream_operand(node, &self.pop())?;
                let history = match source {
                    StreamSource::External(stream) => self.streams.get(&stream),
                    StreamSource::Reaction(reaction) => self.reactions.get(&reaction),
                };
                Some(
                    history
                        .and_then(|history| history.previous(offset))
                        .cloned()
                        .unwrap_or(Value::None),
                )
            }
            NodeKind::Changed { .. } => {
                let source = stream_operand(node, &self.pop())?;
                if let Some(top) = self.dependencies.last_mut() {
                    top.mark_volatile();
                }
                Some(Value::Bool(self.changed.contains(&source)))
            }
            _ => return Err(Exception::value_expected(id)),
        };
        Ok(Finished::Value(value.unwrap_or(Value::None)))
    }

    fn pop(&mut self) -> Value {
        self.stack.pop().unwrap_or(Value::None)
    }

    /// The top `count` values, in the order they were pushed.
    fn pop_values(&mut self, count: usize) -> Vec<Value> {
        let base = self.frames.last().map_or(0, |frame| frame.stack_base);
        let at = self.stack.len().saturating_sub(count).max(base);
        self.stack.split_off(at)
    }

    fn bind(&mut self, name: Name, value: Value) {
        let dependencies = self.dependencies.last().cloned().unwrap_or_default();
        if let Some(scope) = self.scope() {
            scope.write().define(name, Binding::new(value, dependencies));
        }
    }

    /// Record a reaction's value for this pass.
    fn finish_reaction(&mut self, node: &NodeRef) -> Value {
        let id = node.id();
        let value = self.pop();
        if !self.unchanged_reactions.remove(&id) {
            let limit = self.config.stream_history_limit;
            self.reactions
                .entry(id)
                .or_insert_with(|| StreamState::new(limit))
                .push(value.clone());
            self.changed.insert(StreamSource::Reaction(id));
        }
        if let Some(top) = self.dependencies.last_mut() {
            top.add_stream(StreamSource::Reaction(id));
            top.mark_volatile();
        }
        value
    }

    /// Bind the arguments and enter the function's frame.
    fn call(&mut self, node: &NodeRef, inputs: &[NodeRef]) -> Result<Finished, Exception> {
        let arguments = self.pop_values(inputs.len());
        let function = match self.pop() {
            Value::Function(function) => function,
            other => {
                let expected = Type::Function(Arc::new(FunctionType {
                    definition: None,
                    inputs: Vec::new(),
                    output: Type::Any,
                }));
                return Err(Exception::type_mismatch(node.id(), expected, other.type_of()));
            }
        };
        check_arguments(node, &function, inputs, &arguments)?;

        let calls = self.frames.len().saturating_sub(1);
        if calls >= self.config.max_depth {
            return Err(Exception::function_limit(node.id(), self.config.max_depth));
        }

        let dependencies = self.dependencies.last().cloned().unwrap_or_default();
        let scope = self.new_scope(Some(&function.scope));
        {
            let mut scope = scope.write();
            for (input, argument) in function.inputs().iter().zip(arguments) {
                if let Some(name) = input.defines_name() {
                    scope.define(name, Binding::new(argument, dependencies.clone()));
                }
            }
        }
        let provided = inputs.len().min(function.inputs().len());
        let steps = self.function_steps(&function.definition, provided);
        tracing::trace!(function = %function.name, provided, "call");
        self.frames.push(Frame {
            steps,
            pc: 0,
            scopes: vec![scope],
            stack_base: self.stack.len(),
            call: Some(NodeRef::clone(node)),
        });
        Ok(Finished::Called)
    }

    fn function_steps(&mut self, definition: &NodeRef, provided: usize) -> Arc<[Step]> {
        let key = (definition.id(), provided);
        if let Some(steps) = self.functions.get(&key) {
            return Arc::clone(steps);
        }
        let steps: Arc<[Step]> = Arc::from(compile_function(&self.context, definition, provided));
        self.functions.insert(key, Arc::clone(&steps));
        steps
    }
}

/// Missing required inputs and arguments of the wrong type. Extra
/// arguments are ignored.
fn check_arguments(
    node: &NodeRef,
    function: &Heap<FunctionValue>,
    inputs: &[NodeRef],
    arguments: &[Value],
) -> Result<(), Exception> {
    let signature = &function.ty.inputs;
    if signature
        .iter()
        .skip(arguments.len())
        .any(|input| !input.optional)
    {
        return Err(Exception::value_expected(node.id()));
    }
    for ((input, argument), argument_node) in signature.iter().zip(arguments).zip(inputs) {
        if input.ty.contains_unknown() {
            continue;
        }
        let given = argument.type_of();
        if !input.ty.accepts(&given) {
            return Err(Exception::type_mismatch(
                argument_node.id(),
                input.ty.clone(),
                given,
            ));
        }
    }
    Ok(())
}

fn list_access(node: &NodeRef, list: &Value, index: &Value) -> Result<Value, Exception> {
    let Value::List(list) = list else {
        return Err(Exception::type_mismatch(
            node.id(),
            Type::list(Type::Any),
            list.type_of(),
        ));
    };
    let Value::Number(index) = index else {
        return Err(Exception::type_mismatch(
            node.id(),
            Type::unitless(),
            index.type_of(),
        ));
    };
    Ok(list.get(index.value).cloned().unwrap_or(Value::None))
}

fn property(node: &NodeRef, structure: &Value, name: Name) -> Result<Value, Exception> {
    match structure {
        Value::Structure(structure) => structure
            .get(name)
            .cloned()
            .ok_or_else(|| Exception::name_unbound(node.id(), name)),
        other => Err(Exception::type_mismatch(
            node.id(),
            Type::unknown(node.id(), UnknownReason::NotAStructure),
            other.type_of(),
        )),
    }
}

fn stream_operand(node: &NodeRef, value: &Value) -> Result<StreamSource, Exception> {
    match value {
        Value::Stream(stream) => Ok(stream.source),
        other => Err(Exception::type_mismatch(
            node.id(),
            Type::unknown(node.id(), UnknownReason::NotAStream),
            other.type_of(),
        )),
    }
}

/// A `Previous` offset must be a whole, positive, unitless number.
fn previous_offset(node: &NodeRef, value: &Value) -> Result<usize, Exception> {
    match value {
        Value::Number(number)
            if number.unit.is_unitless() && number.value >= 1.0 && number.value.fract() == 0.0 =>
        {
            Ok(number.value as usize)
        }
        other => Err(Exception::type_mismatch(
            node.id(),
            Type::unitless(),
            other.type_of(),
        )),
    }
}
