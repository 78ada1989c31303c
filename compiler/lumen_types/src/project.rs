//! Projects: the unit of analysis and evaluation.
//!
//! A project is a main source plus supplementary sources it may borrow from,
//! and the external streams its programs may read. Every source is indexed
//! once, on construction, so analysis can go from any node to its tree.

use rustc_hash::{FxHashMap, FxHashSet};

use lumen_ir::{Name, NodeId, NodeKind, NodeRef, StreamId, Tree};

use crate::Type;

/// One named program.
#[derive(Debug, Clone)]
pub struct Source {
    name: Name,
    tree: Tree,
}

impl Source {
    pub fn new(name: &str, root: NodeRef) -> Self {
        Source {
            name: Name::intern(name),
            tree: Tree::new(root),
        }
    }

    #[inline]
    pub fn name(&self) -> Name {
        self.name
    }

    #[inline]
    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    #[inline]
    pub fn root(&self) -> &NodeRef {
        self.tree.root()
    }

    /// Names of the sources this program borrows from, in order.
    pub fn borrowed_sources(&self) -> Vec<Name> {
        match self.root().kind() {
            NodeKind::Program { borrows, .. } => borrows
                .iter()
                .filter_map(|borrow| match borrow.kind() {
                    NodeKind::Borrow { source, .. } => Some(*source),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        }
    }

    /// The top-level statement of this program that defines `name`.
    pub fn top_level(&self, name: Name) -> Option<&NodeRef> {
        let NodeKind::Program { block, .. } = self.root().kind() else {
            return None;
        };
        let NodeKind::Block { statements } = block.kind() else {
            return None;
        };
        statements
            .iter()
            .rev()
            .find(|statement| statement.defines_name() == Some(name))
    }
}

/// An external stream a program may reference by name.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamDeclaration {
    pub id: StreamId,
    pub name: Name,
    pub value_type: Type,
}

impl StreamDeclaration {
    pub fn new(id: StreamId, name: &str, value_type: Type) -> Self {
        StreamDeclaration {
            id,
            name: Name::intern(name),
            value_type,
        }
    }
}

/// Order in which a project's sources must be evaluated.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EvaluationOrder {
    /// Source indices, dependencies before dependents; the main source last.
    pub order: Vec<usize>,
    /// Sources that take part in a borrow cycle.
    pub cyclic: FxHashSet<Name>,
}

#[derive(Debug, Clone)]
pub struct Project {
    /// Index 0 is the main source.
    sources: Vec<Source>,
    streams: Vec<StreamDeclaration>,
    owners: FxHashMap<NodeId, usize>,
}

impl Project {
    pub fn new(main: Source) -> Self {
        let mut project = Project {
            sources: Vec::new(),
            streams: Vec::new(),
            owners: FxHashMap::default(),
        };
        project.push_source(main);
        project
    }

    #[must_use]
    pub fn with_supplement(mut self, source: Source) -> Self {
        self.push_source(source);
        self
    }

    #[must_use]
    pub fn with_stream(mut self, stream: StreamDeclaration) -> Self {
        self.streams.push(stream);
        self
    }

    fn push_source(&mut self, source: Source) {
        let index = self.sources.len();
        for node in source.tree().preorder() {
            self.owners.insert(node.id(), index);
        }
        self.sources.push(source);
    }

    pub fn main(&self) -> &Source {
        &self.sources[0]
    }

    pub fn supplements(&self) -> &[Source] {
        &self.sources[1..]
    }

    /// All sources, main first.
    pub fn sources(&self) -> &[Source] {
        &self.sources
    }

    pub fn source(&self, name: Name) -> Option<&Source> {
        self.sources.iter().find(|source| source.name() == name)
    }

    pub fn source_index(&self, name: Name) -> Option<usize> {
        self.sources.iter().position(|source| source.name() == name)
    }

    /// The source containing `node`.
    pub fn source_of(&self, node: NodeId) -> Option<&Source> {
        self.owners.get(&node).map(|&index| &self.sources[index])
    }

    pub fn tree_of(&self, node: NodeId) -> Option<&Tree> {
        self.source_of(node).map(Source::tree)
    }

    /// Look up a node in any source.
    pub fn get(&self, node: NodeId) -> Option<&NodeRef> {
        self.tree_of(node).and_then(|tree| tree.get(node))
    }

    pub fn streams(&self) -> &[StreamDeclaration] {
        &self.streams
    }

    pub fn stream(&self, name: Name) -> Option<&StreamDeclaration> {
        self.streams.iter().find(|stream| stream.name == name)
    }

    pub fn stream_by_id(&self, id: StreamId) -> Option<&StreamDeclaration> {
        self.streams.iter().find(|stream| stream.id == id)
    }

    /// Copy of this project with a new main program.
    #[must_use]
    pub fn with_main(&self, root: NodeRef) -> Project {
        let mut project = Project::new(Source::new(self.main().name().as_str(), root));
        for source in self.supplements() {
            project.push_source(source.clone());
        }
        project.streams.clone_from(&self.streams);
        project
    }

    /// Depth-first topological order over borrows, starting from the main
    /// source. Sources the main source never reaches are still evaluated,
    /// after their own dependencies, before the main source.
    pub fn evaluation_order(&self) -> EvaluationOrder {
        #[derive(Copy, Clone, PartialEq)]
        enum Mark {
            Unvisited,
            Active,
            Done,
        }

        fn visit(
            project: &Project,
            index: usize,
            marks: &mut [Mark],
            stack: &mut Vec<usize>,
            result: &mut EvaluationOrder,
        ) {
            match marks[index] {
                Mark::Done => return,
                Mark::Active => {
                    // Every source from the first occurrence of `index` on the
                    // stack is on the cycle.
                    if let Some(start) = stack.iter().position(|&i| i == index) {
                        for &member in &stack[start..] {
                            result.cyclic.insert(project.sources[member].name());
                        }
                    }
                    return;
                }
                Mark::Unvisited => {}
            }
            marks[index] = Mark::Active;
            stack.push(index);
            for dependency in project.sources[index].borrowed_sources() {
                if let Some(dependency) = project.source_index(dependency) {
                    visit(project, dependency, marks, stack, result);
                }
            }
            stack.pop();
            marks[index] = Mark::Done;
            result.order.push(index);
        }

        let mut marks = vec![Mark::Unvisited; self.sources.len()];
        let mut stack = Vec::new();
        let mut result = EvaluationOrder::default();
        for index in (1..self.sources.len()).chain(std::iter::once(0)) {
            visit(self, index, &mut marks, &mut stack, &mut result);
        }
        // A supplement that borrows main would otherwise pull it in early.
        if let Some(position) = result.order.iter().position(|&index| index == 0) {
            result.order.remove(position);
        }
        result.order.push(0);
        result
    }
}

#[cfg(test)]
mod tests;
