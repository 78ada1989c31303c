//! Lexical scopes and the stream dependencies of bound values.
//!
//! Scopes are shared: a function value keeps its defining scope alive, and
//! names bound later in that scope (including the function's own name) stay
//! visible to it.

use std::sync::Arc;

use lumen_ir::Name;
use lumen_types::StreamSource;
use parking_lot::RwLock;
use rustc_hash::{FxHashMap, FxHashSet};
use smallvec::SmallVec;

use crate::Value;

pub type SharedScope = Arc<RwLock<Scope>>;

/// Streams a value was computed from.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Dependencies {
    streams: SmallVec<[StreamSource; 2]>,
    volatile: bool,
}

impl Dependencies {
    pub fn new() -> Self {
        Dependencies::default()
    }

    pub fn on_stream(source: StreamSource) -> Self {
        let mut dependencies = Dependencies::new();
        dependencies.add_stream(source);
        dependencies
    }

    pub fn add_stream(&mut self, source: StreamSource) {
        if let Err(position) = self.streams.binary_search(&source) {
            self.streams.insert(position, source);
        }
    }

    /// Marks the value as one that must be recomputed every pass.
    pub fn mark_volatile(&mut self) {
        self.volatile = true;
    }

    pub fn merge(&mut self, other: &Dependencies) {
        for source in &other.streams {
            self.add_stream(*source);
        }
        self.volatile |= other.volatile;
    }

    pub fn streams(&self) -> &[StreamSource] {
        &self.streams
    }

    pub fn is_volatile(&self) -> bool {
        self.volatile
    }

    pub fn is_empty(&self) -> bool {
        self.streams.is_empty() && !self.volatile
    }

    /// Whether any dependency is in `changed`.
    pub fn intersects(&self, changed: &FxHashSet<StreamSource>) -> bool {
        self.streams.iter().any(|source| changed.contains(source))
    }
}

#[derive(Clone, Debug)]
pub struct Binding {
    pub value: Value,
    pub dependencies: Dependencies,
}

impl Binding {
    pub fn new(value: Value, dependencies: Dependencies) -> Self {
        Binding {
            value,
            dependencies,
        }
    }
}

#[derive(Debug, Default)]
pub struct Scope {
    bindings: FxHashMap<Name, Binding>,
    parent: Option<SharedScope>,
}

impl Scope {
    pub fn root() -> SharedScope {
        Arc::new(RwLock::new(Scope::default()))
    }

    pub fn child(parent: &SharedScope) -> SharedScope {
        Arc::new(RwLock::new(Scope {
            bindings: FxHashMap::default(),
            parent: Some(Arc::clone(parent)),
        }))
    }

    /// Binds `name`, replacing an earlier binding of the same name.
    pub fn define(&mut self, name: Name, binding: Binding) {
        self.bindings.insert(name, binding);
    }

    /// The nearest binding of `name` in `scope` or its ancestors.
    pub fn lookup(scope: &SharedScope, name: Name) -> Option<Binding> {
        let mut current = Arc::clone(scope);
        loop {
            let parent = {
                let guard = current.read();
                if let Some(binding) = guard.bindings.get(&name) {
                    return Some(binding.clone());
                }
                guard.parent.clone()
            };
            current = parent?;
        }
    }

    pub fn is_defined_here(&self, name: Name) -> bool {
        self.bindings.contains_key(&name)
    }

    /// Drops every binding, breaking reference cycles between this scope and
    /// the function values defined in it.
    pub fn clear(&mut self) {
        self.bindings.clear();
    }
}

#[cfg(test)]
mod tests;
