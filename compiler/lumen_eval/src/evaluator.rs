//! The stack machine.
//!
//! One [`Evaluator`] runs one project. Each call to [`Evaluator::step`]
//! executes exactly one step of the current pass. A pass evaluates every
//! source in dependency order, main source last, and ends when the main
//! source produces a value or any step halts it.
//!
//! # State
//!
//! - a value stack shared by all frames; a frame remembers where its
//!   operands begin
//! - a frame per source root and per function or structure evaluation,
//!   each with its own stack of lexical scopes
//! - a stack of dependency accumulators, one per node between its `Start`
//!   and `Finish`, collecting the streams the node's value was computed from
//!
//! # Reuse
//!
//! In a source's root frame, a composite node whose streams have not
//! received a value since its last value was computed is not re-evaluated:
//! its `Start` pushes the remembered value and skips to after its
//! `Finish`. Each stream history carries a version for this comparison, so
//! emissions during passes that did not reach the node still count.

mod finish;
mod reactive;
mod travel;

use std::collections::VecDeque;
use std::sync::Arc;

use crossbeam::channel::{Receiver, Sender};
use lumen_ir::{Name, Node, NodeId, NodeKind, NodeRef, StreamId};
use lumen_types::{ConflictSet, Context, Definition, Project, StreamSource, Type};
use lumen_values::{
    Binding, Dependencies, Exception, FunctionValue, Scope, SharedScope, StreamValue,
    StructureValue, Value,
};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::stream::{Notification, StreamState};
use crate::{compile, EngineError, EngineResult, EvalConfig, Step};

/// What happened in one pass, kept for replay.
#[derive(Clone, Debug, Default)]
pub struct PassRecord {
    /// Notifications applied to stream history before the pass began, one
    /// batch per drain, oldest first. Drains that began no pass still
    /// changed history, so they are kept too.
    pub drains: Vec<Vec<Notification>>,
    /// The main source's value, once the pass has finished.
    pub result: Option<Value>,
    pub steps: usize,
}

struct Frame {
    steps: Arc<[Step]>,
    pc: usize,
    scopes: Vec<SharedScope>,
    /// Stack height when the frame was entered.
    stack_base: usize,
    /// The `Evaluate` node waiting on this frame, or `None` for a source.
    call: Option<NodeRef>,
}

struct Memo {
    value: Value,
    dependencies: Dependencies,
    /// Version of each stream in `dependencies` when `value` was computed.
    versions: Vec<(StreamSource, u64)>,
}

pub struct Evaluator {
    context: Context,
    config: EvalConfig,

    programs: FxHashMap<NodeId, Arc<[Step]>>,
    functions: FxHashMap<(NodeId, usize), Arc<[Step]>>,

    stack: Vec<Value>,
    frames: Vec<Frame>,
    dependencies: Vec<Dependencies>,
    step_count: usize,
    started: bool,

    pending_sources: VecDeque<usize>,
    current_source: Option<usize>,
    current_root: Option<SharedScope>,
    source_results: FxHashMap<Name, Binding>,
    source_scopes: FxHashMap<Name, SharedScope>,
    pass_scopes: Vec<SharedScope>,

    changed: FxHashSet<StreamSource>,
    reused: FxHashSet<NodeId>,
    unchanged_reactions: FxHashSet<NodeId>,

    result: Option<Value>,
    memo: FxHashMap<NodeId, Memo>,
    values: FxHashMap<NodeId, Value>,
    reactions: FxHashMap<NodeId, StreamState>,
    streams: FxHashMap<StreamId, StreamState>,

    sender: Sender<Notification>,
    receiver: Receiver<Notification>,
    passes: Vec<PassRecord>,
    current_pass: usize,
    viewing: Option<usize>,
    deferred: Vec<Notification>,
    pending_record: Vec<Vec<Notification>>,
}

impl Evaluator {
    pub fn new(project: Arc<Project>, config: EvalConfig) -> Self {
        let streams = project
            .streams()
            .iter()
            .map(|stream| (stream.id, StreamState::new(config.stream_history_limit)))
            .collect();
        let (sender, receiver) = crossbeam::channel::unbounded();
        Evaluator {
            context: Context::new(project),
            config,
            programs: FxHashMap::default(),
            functions: FxHashMap::default(),
            stack: Vec::new(),
            frames: Vec::new(),
            dependencies: Vec::new(),
            step_count: 0,
            started: false,
            pending_sources: VecDeque::new(),
            current_source: None,
            current_root: None,
            source_results: FxHashMap::default(),
            source_scopes: FxHashMap::default(),
            pass_scopes: Vec::new(),
            changed: FxHashSet::default(),
            reused: FxHashSet::default(),
            unchanged_reactions: FxHashSet::default(),
            result: None,
            memo: FxHashMap::default(),
            values: FxHashMap::default(),
            reactions: FxHashMap::default(),
            streams,
            sender,
            receiver,
            passes: Vec::new(),
            current_pass: 0,
            viewing: None,
            deferred: Vec::new(),
            pending_record: Vec::new(),
        }
    }

    /// Set the value `stream` has before it first emits.
    pub fn declare_initial(&mut self, stream: StreamId, value: Value) -> EngineResult<()> {
        let state = self
            .streams
            .get_mut(&stream)
            .ok_or(EngineError::UnknownStream(stream))?;
        state.set_initial(value);
        Ok(())
    }

    /// Begin the first pass. Does nothing once started.
    pub fn start(&mut self) {
        if self.started {
            return;
        }
        self.started = true;
        self.passes.push(PassRecord::default());
        self.current_pass = 0;
        self.begin_pass(FxHashSet::default());
    }

    /// Execute one step. Returns false if the pass was already finished.
    #[expect(
        clippy::arithmetic_side_effects,
        reason = "pc stays within its step sequence and step_count stops one past max_steps"
    )]
    pub fn step(&mut self) -> bool {
        if !self.started {
            self.start();
        }
        let Some(frame) = self.frames.last_mut() else {
            return false;
        };
        let steps = Arc::clone(&frame.steps);
        let Some(step) = steps.get(frame.pc) else {
            self.unwind();
            return true;
        };
        frame.pc += 1;
        self.step_count += 1;

        if self.step_count > self.config.max_steps {
            let exception = Exception::step_limit(step.node().id(), self.config.max_steps);
            self.halt(exception);
            return true;
        }

        tracing::trace!(pass = self.current_pass, count = self.step_count, %step);
        self.execute(step);
        self.unwind();
        true
    }

    /// Run the current pass to its end.
    pub fn run_to_end(&mut self) {
        while self.step() {}
    }

    /// Start if needed, finish the current pass, and return its value.
    pub fn run(&mut self) -> Option<&Value> {
        self.run_to_end();
        self.result.as_ref()
    }

    pub fn is_done(&self) -> bool {
        self.started && self.frames.is_empty()
    }

    /// The main source's value from the last finished pass.
    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    /// The step the next call to [`Evaluator::step`] will execute.
    pub fn current_step(&self) -> Option<&Step> {
        self.frames
            .last()
            .and_then(|frame| frame.steps.get(frame.pc))
    }

    /// Steps executed so far in this pass.
    pub fn step_count(&self) -> usize {
        self.step_count
    }

    pub fn pass(&self) -> usize {
        self.current_pass
    }

    pub fn passes(&self) -> &[PassRecord] {
        &self.passes
    }

    /// Latest value of `node` in a source's root frame.
    pub fn value_of(&self, node: NodeId) -> Option<&Value> {
        self.values.get(&node)
    }

    /// Whether `node`'s value was reused rather than recomputed this pass.
    pub fn was_reused(&self, node: NodeId) -> bool {
        self.reused.contains(&node)
    }

    pub fn conflicts(&self) -> ConflictSet {
        self.context.conflicts()
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    pub fn config(&self) -> &EvalConfig {
        &self.config
    }

    pub fn stream_state(&self, stream: StreamId) -> Option<&StreamState> {
        self.streams.get(&stream)
    }

    /// Values `reaction` has had, newest last.
    pub fn reaction_history(&self, reaction: NodeId) -> Option<&StreamState> {
        self.reactions.get(&reaction)
    }
}

// Passes and sources
impl Evaluator {
    fn begin_pass(&mut self, changed: FxHashSet<StreamSource>) {
        for scope in self.pass_scopes.drain(..) {
            scope.write().clear();
        }
        self.stack.clear();
        self.frames.clear();
        self.dependencies.clear();
        self.step_count = 0;
        self.result = None;
        self.source_results.clear();
        self.source_scopes.clear();
        self.changed = changed;
        self.reused.clear();
        self.unchanged_reactions.clear();
        self.pending_sources = self
            .context
            .evaluation_order()
            .order
            .iter()
            .copied()
            .collect();
        tracing::debug!(
            pass = self.current_pass,
            changed = self.changed.len(),
            "pass started"
        );
        self.enter_next_source();
    }

    fn enter_next_source(&mut self) {
        let Some(index) = self.pending_sources.pop_front() else {
            return;
        };
        let Some(root) = self
            .context
            .project()
            .sources()
            .get(index)
            .map(|source| NodeRef::clone(source.root()))
        else {
            return;
        };
        let steps = match self.programs.get(&root.id()) {
            Some(steps) => Arc::clone(steps),
            None => {
                let steps: Arc<[Step]> = Arc::from(compile(&self.context, &root));
                self.programs.insert(root.id(), Arc::clone(&steps));
                steps
            }
        };
        let scope = self.new_scope(None);
        self.current_source = Some(index);
        self.current_root = Some(Arc::clone(&scope));
        self.dependencies.clear();
        self.dependencies.push(Dependencies::new());
        self.frames.push(Frame {
            steps,
            pc: 0,
            scopes: vec![scope],
            stack_base: self.stack.len(),
            call: None,
        });
    }

    /// Record the current source's value, then move on to the next source
    /// or, after the main source, end the pass.
    fn finish_source(&mut self, value: Value, dependencies: Dependencies) {
        let Some(index) = self.current_source.take() else {
            return;
        };
        let name = self.context.project().sources()[index].name();
        if let Some(scope) = self.current_root.take() {
            self.source_scopes.insert(name, scope);
        }
        self.source_results
            .insert(name, Binding::new(value.clone(), dependencies));
        if index == 0 {
            self.finish_pass(value);
        } else {
            self.enter_next_source();
        }
    }

    fn finish_pass(&mut self, value: Value) {
        self.frames.clear();
        self.stack.clear();
        self.pending_sources.clear();
        if let Some(record) = self.passes.get_mut(self.current_pass) {
            record.result = Some(value.clone());
            record.steps = self.step_count;
        }
        tracing::debug!(
            pass = self.current_pass,
            steps = self.step_count,
            reused = self.reused.len(),
            result = %value,
            "pass finished"
        );
        self.result = Some(value);
    }

    /// Pop every frame that has run out of steps.
    fn unwind(&mut self) {
        while let Some(frame) = self.frames.last() {
            if frame.pc < frame.steps.len() {
                return;
            }
            let Some(frame) = self.frames.pop() else {
                return;
            };
            let value = if self.stack.len() > frame.stack_base {
                self.stack.pop().unwrap_or(Value::None)
            } else {
                Value::None
            };
            self.stack.truncate(frame.stack_base);
            match frame.call {
                Some(call) => {
                    let dependencies = self.dependencies.pop().unwrap_or_default();
                    self.complete(&call, value, dependencies);
                }
                None => {
                    let dependencies = self.dependencies.pop().unwrap_or_default();
                    self.dependencies.clear();
                    self.finish_source(value, dependencies);
                }
            }
        }
    }

    /// End the current source with `exception`.
    fn halt(&mut self, exception: Exception) {
        tracing::debug!(
            pass = self.current_pass,
            node = %exception.node,
            kind = %exception.kind,
            "halted"
        );
        self.stack.clear();
        self.frames.clear();
        self.dependencies.clear();
        self.finish_source(Value::exception(exception), Dependencies::new());
    }
}

// Steps
impl Evaluator {
    fn execute(&mut self, step: &Step) {
        match step {
            Step::Start { node, skip } => self.start_node(node, *skip),
            Step::Finish { node } => match self.finish(node) {
                Ok(finish::Finished::Value(value)) => {
                    let dependencies = self.dependencies.pop().unwrap_or_default();
                    self.complete(node, value, dependencies);
                }
                Ok(finish::Finished::Called) => {}
                Err(exception) => self.halt(exception),
            },
            Step::StartFinish { node } => match self.evaluate_single(node) {
                Ok((value, dependencies)) => self.complete(node, value, dependencies),
                Err(exception) => self.halt(exception),
            },
            Step::Literal { node, value } => {
                self.complete(node, value.clone(), Dependencies::new());
            }
            Step::Jump { offset, .. } => self.jump(*offset),
            Step::JumpIfFalse { node, offset } => match self.stack.pop() {
                Some(Value::Bool(true)) => {}
                Some(Value::Bool(false)) => self.jump(*offset),
                other => {
                    let given = other.map_or(Type::None, |value| value.type_of());
                    self.halt(Exception::type_mismatch(node.id(), Type::Bool, given));
                }
            },
            Step::JumpIfPrimed { node, offset } => {
                let primed = self
                    .reactions
                    .get(&node.id())
                    .is_some_and(|history| history.latest().is_some());
                if primed {
                    self.jump(*offset);
                }
            }
            Step::Latest { node, reaction } => self.latest(node, *reaction),
            Step::Stream { node } => self.stream(node),
            Step::Construct { node } => self.construct(node),
            Step::Halt { exception, .. } => self.halt(exception.clone()),
        }
    }

    #[expect(
        clippy::arithmetic_side_effects,
        reason = "compiled offsets never jump past the end of their sequence"
    )]
    fn jump(&mut self, offset: usize) {
        if let Some(frame) = self.frames.last_mut() {
            frame.pc += offset;
        }
    }

    fn start_node(&mut self, node: &NodeRef, skip: usize) {
        if self.try_reuse(node) {
            self.jump(skip);
            return;
        }
        self.dependencies.push(Dependencies::new());
        if let NodeKind::Reaction { condition, .. } = node.kind() {
            self.watch(node.id(), condition);
        }
        if let NodeKind::Block { statements } = node.kind() {
            if !self.context.is_program_block(node) {
                if let Some(parent) = self.scope() {
                    let scope = self.new_scope(Some(&parent));
                    if let Some(frame) = self.frames.last_mut() {
                        frame.scopes.push(scope);
                    }
                }
            }
            for statement in statements {
                if matches!(
                    statement.kind(),
                    NodeKind::FunctionDefinition { .. } | NodeKind::StructureDefinition { .. }
                ) {
                    self.define_function(statement);
                }
            }
        }
    }

    /// Subscribe `reaction` to every stream its condition names, so it is
    /// woken even before the condition has been evaluated.
    fn watch(&mut self, reaction: NodeId, condition: &NodeRef) {
        let mut pending = vec![condition];
        while let Some(node) = pending.pop() {
            if let Some(Definition::Stream(stream)) = self.context.resolve(node) {
                if let Some(state) = self.streams.get_mut(&stream) {
                    state.subscribe(reaction);
                }
            }
            pending.extend(node.children());
        }
    }

    /// Push the remembered value of `node` if nothing it depends on changed.
    fn try_reuse(&mut self, node: &Node) -> bool {
        if !self.config.memoize || self.frames.len() != 1 || !self.is_reusable(node) {
            return false;
        }
        let Some(memo) = self.memo.get(&node.id()) else {
            return false;
        };
        if memo.dependencies.is_volatile()
            || memo
                .versions
                .iter()
                .any(|&(source, version)| self.version_of(source) != version)
        {
            return false;
        }
        let value = memo.value.clone();
        if let Some(top) = self.dependencies.last_mut() {
            top.merge(&memo.dependencies);
        }
        self.stack.push(value);
        self.reused.insert(node.id());
        true
    }

    fn version_of(&self, source: StreamSource) -> u64 {
        let history = match source {
            StreamSource::External(stream) => self.streams.get(&stream),
            StreamSource::Reaction(reaction) => self.reactions.get(&reaction),
        };
        history.map_or(0, StreamState::version)
    }

    fn is_reusable(&self, node: &Node) -> bool {
        match node.kind() {
            NodeKind::Program { .. }
            | NodeKind::Bind { .. }
            | NodeKind::FunctionDefinition { .. }
            | NodeKind::StructureDefinition { .. }
            | NodeKind::Borrow { .. }
            | NodeKind::Reaction { .. }
            | NodeKind::Changed { .. } => false,
            NodeKind::Block { .. } => !self.context.is_program_block(node),
            _ => true,
        }
    }

    /// Push a node's value, remembering it when evaluated in a root frame.
    fn complete(&mut self, node: &Node, value: Value, dependencies: Dependencies) {
        if self.frames.len() == 1 {
            if self.config.memoize
                && self.is_reusable(node)
                && !value.is_exception()
                && !value.contains_function()
            {
                let versions = dependencies
                    .streams()
                    .iter()
                    .map(|&source| (source, self.version_of(source)))
                    .collect();
                self.memo.insert(
                    node.id(),
                    Memo {
                        value: value.clone(),
                        dependencies: dependencies.clone(),
                        versions,
                    },
                );
            }
            self.values.insert(node.id(), value.clone());
        }
        if let Some(top) = self.dependencies.last_mut() {
            top.merge(&dependencies);
        }
        self.stack.push(value);
    }

    /// References, definitions and borrows.
    fn evaluate_single(&mut self, node: &NodeRef) -> Result<(Value, Dependencies), Exception> {
        match node.kind() {
            NodeKind::Reference { name } => self.reference(node, *name),
            NodeKind::FunctionDefinition { .. } | NodeKind::StructureDefinition { .. } => self
                .define_function(node)
                .map(|value| (value, Dependencies::new()))
                .ok_or_else(|| Exception::value_expected(node.id())),
            NodeKind::Borrow { source, name } => self.borrow(node, *source, *name),
            _ => Err(Exception::value_expected(node.id())),
        }
    }

    fn reference(&mut self, node: &NodeRef, name: Name) -> Result<(Value, Dependencies), Exception> {
        if let Some(Definition::Stream(stream)) = self.context.resolve(node) {
            let Some(state) = self.streams.get_mut(&stream) else {
                return Err(Exception::name_unbound(node.id(), name));
            };
            state.subscribe(node.id());
            let value = state.latest().cloned().unwrap_or(Value::None);
            return Ok((
                value,
                Dependencies::on_stream(StreamSource::External(stream)),
            ));
        }
        let scope = self
            .scope()
            .ok_or_else(|| Exception::name_unbound(node.id(), name))?;
        Scope::lookup(&scope, name)
            .map(|binding| (binding.value, binding.dependencies))
            .ok_or_else(|| Exception::name_unbound(node.id(), name))
    }

    fn borrow(
        &mut self,
        node: &NodeRef,
        source: Name,
        name: Option<Name>,
    ) -> Result<(Value, Dependencies), Exception> {
        if self.context.evaluation_order().cyclic.contains(&source) {
            return Err(Exception::cycle(node.id(), Some(source)));
        }
        let binding = match name {
            None => self.source_results.get(&source).cloned(),
            Some(name) => self
                .source_scopes
                .get(&source)
                .and_then(|scope| Scope::lookup(scope, name)),
        };
        let binding =
            binding.ok_or_else(|| Exception::name_unbound(node.id(), name.unwrap_or(source)))?;
        if let Some(scope) = self.scope() {
            scope
                .write()
                .define(name.unwrap_or(source), binding.clone());
        }
        Ok((binding.value, binding.dependencies))
    }

    /// Close `definition` over the current scope and bind its name there.
    fn define_function(&mut self, definition: &NodeRef) -> Option<Value> {
        let ty = self.context.signature(definition)?;
        let scope = self.scope()?;
        let function = FunctionValue::new(NodeRef::clone(definition), Arc::clone(&scope), ty)?;
        let name = function.name;
        let value = Value::function(function);
        scope
            .write()
            .define(name, Binding::new(value.clone(), Dependencies::new()));
        Some(value)
    }

    fn latest(&mut self, node: &NodeRef, reaction: NodeId) {
        let Some(value) = self
            .reactions
            .get(&reaction)
            .and_then(StreamState::latest)
            .cloned()
        else {
            self.halt(Exception::value_expected(node.id()));
            return;
        };
        // A reaction's value may change later in the same pass.
        let mut dependencies = Dependencies::on_stream(StreamSource::Reaction(reaction));
        dependencies.mark_volatile();
        if node.id() == reaction {
            // The reaction keeps its value; its `Finish` must not record it
            // again.
            self.unchanged_reactions.insert(reaction);
            if let Some(top) = self.dependencies.last_mut() {
                top.merge(&dependencies);
            }
            self.stack.push(value);
        } else {
            self.complete(node, value, dependencies);
        }
    }

    fn stream(&mut self, node: &NodeRef) {
        let Some(source) = self.context.stream_source(node) else {
            let given = self.context.type_of(node);
            self.halt(Exception::type_mismatch(node.id(), Type::Any, given));
            return;
        };
        if let StreamSource::External(stream) = source {
            if let Some(state) = self.streams.get_mut(&stream) {
                state.subscribe(node.id());
            }
        }
        let value_type = self.context.stream_value_type(node).unwrap_or(Type::Any);
        if let Some(top) = self.dependencies.last_mut() {
            top.add_stream(source);
        }
        self.stack
            .push(Value::stream(StreamValue::new(source, value_type)));
    }

    /// Build a structure from the inputs bound in the current frame.
    fn construct(&mut self, node: &NodeRef) {
        let NodeKind::StructureDefinition { name, inputs } = node.kind() else {
            self.halt(Exception::value_expected(node.id()));
            return;
        };
        let Some(scope) = self.scope() else {
            self.halt(Exception::value_expected(node.id()));
            return;
        };
        let mut fields = Vec::with_capacity(inputs.len());
        for input in inputs {
            let Some(field) = input.defines_name() else {
                continue;
            };
            let binding = Scope::lookup(&scope, field)
                .unwrap_or_else(|| Binding::new(Value::None, Dependencies::new()));
            if let Some(top) = self.dependencies.last_mut() {
                top.merge(&binding.dependencies);
            }
            fields.push((field, binding.value));
        }
        self.stack.push(Value::structure(StructureValue::new(
            node.id(),
            *name,
            fields,
        )));
    }

    /// Innermost scope of the current frame.
    fn scope(&self) -> Option<SharedScope> {
        self.frames
            .last()
            .and_then(|frame| frame.scopes.last())
            .cloned()
    }

    fn new_scope(&mut self, parent: Option<&SharedScope>) -> SharedScope {
        let scope = match parent {
            Some(parent) => Scope::child(parent),
            None => Scope::root(),
        };
        self.pass_scopes.push(Arc::clone(&scope));
        scope
    }
}

impl Drop for Evaluator {
    fn drop(&mut self) {
        // Function values hold their defining scope, which holds them.
        for scope in self.pass_scopes.drain(..) {
            scope.write().clear();
        }
    }
}

#[cfg(test)]
mod tests;
