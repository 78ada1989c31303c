//! Analysis context.
//!
//! A `Context` answers static questions about one [`Project`]: what a name
//! refers to, what type a node has, and what conflicts the project contains.
//! Answers are computed lazily and memoized for the lifetime of the context;
//! an edited program gets a new project and so a new context.

use std::cell::{OnceCell, RefCell};
use std::sync::Arc;

use rustc_hash::{FxHashMap, FxHashSet};

use lumen_ir::{ensure_sufficient_stack, Node, NodeId, NodeRef, StreamId};

use crate::{EvaluationOrder, Project, Type, UnknownReason};

/// What a name refers to.
#[derive(Clone, Debug)]
pub enum Definition {
    /// A bind statement, or a function or structure input.
    Bind(NodeRef),
    Function(NodeRef),
    Structure(NodeRef),
    Borrow(NodeRef),
    /// Inside a reaction's condition or next value, the name of the bind
    /// that owns the reaction reads the reaction's latest value.
    ReactionValue { bind: NodeRef, reaction: NodeRef },
    Stream(StreamId),
}

impl Definition {
    /// The defining node, if the definition is part of a program.
    pub fn node(&self) -> Option<&NodeRef> {
        match self {
            Definition::Bind(node)
            | Definition::Function(node)
            | Definition::Structure(node)
            | Definition::Borrow(node)
            | Definition::ReactionValue { bind: node, .. } => Some(node),
            Definition::Stream(_) => None,
        }
    }
}

impl PartialEq for Definition {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Definition::Stream(a), Definition::Stream(b)) => a == b,
            _ => match (self.node(), other.node()) {
                (Some(a), Some(b)) => a.id() == b.id(),
                _ => false,
            },
        }
    }
}

pub struct Context {
    project: Arc<Project>,
    types: RefCell<FxHashMap<NodeId, Type>>,
    /// Nodes whose type is being computed, for cycle detection.
    visiting: RefCell<FxHashSet<NodeId>>,
    resolutions: RefCell<FxHashMap<NodeId, Option<Definition>>>,
    order: OnceCell<EvaluationOrder>,
}

impl Context {
    pub fn new(project: Arc<Project>) -> Self {
        Context {
            project,
            types: RefCell::new(FxHashMap::default()),
            visiting: RefCell::new(FxHashSet::default()),
            resolutions: RefCell::new(FxHashMap::default()),
            order: OnceCell::new(),
        }
    }

    #[inline]
    pub fn project(&self) -> &Arc<Project> {
        &self.project
    }

    /// Source evaluation order, computed once.
    pub fn evaluation_order(&self) -> &EvaluationOrder {
        self.order.get_or_init(|| self.project.evaluation_order())
    }

    /// The static type of `node`.
    ///
    /// Memoized. A node whose type depends on itself gets
    /// `Unknown(Cycle)` rather than recursing forever.
    pub fn type_of(&self, node: &Node) -> Type {
        let id = node.id();
        if let Some(ty) = self.types.borrow().get(&id) {
            return ty.clone();
        }
        if !self.visiting.borrow_mut().insert(id) {
            return Type::unknown(id, UnknownReason::Cycle);
        }
        let ty = ensure_sufficient_stack(|| self.infer(node));
        self.visiting.borrow_mut().remove(&id);
        self.types.borrow_mut().insert(id, ty.clone());
        ty
    }

    /// Type of the node with id `id`, if it belongs to this project.
    pub fn type_of_id(&self, id: NodeId) -> Option<Type> {
        self.project.get(id).map(|node| self.type_of(node))
    }

    pub(crate) fn cached_resolution(&self, id: NodeId) -> Option<Option<Definition>> {
        self.resolutions.borrow().get(&id).cloned()
    }

    pub(crate) fn cache_resolution(&self, id: NodeId, definition: Option<Definition>) {
        self.resolutions.borrow_mut().insert(id, definition);
    }
}

#[cfg(test)]
mod tests;
