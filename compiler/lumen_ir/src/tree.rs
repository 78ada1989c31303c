//! Parent and lookup index over one tree.
//!
//! Nodes only point at their children. Name resolution and type narrowing
//! need to walk upward, so analysis builds a `Tree` once per root and keeps
//! it for the lifetime of the analysis context.

use rustc_hash::FxHashMap;

use crate::{Node, NodeId, NodeRef};

#[derive(Debug, Clone)]
pub struct Tree {
    root: NodeRef,
    nodes: FxHashMap<NodeId, NodeRef>,
    parents: FxHashMap<NodeId, NodeId>,
    preorder: Vec<NodeId>,
}

impl Tree {
    /// Index every node under `root`.
    pub fn new(root: NodeRef) -> Self {
        let mut nodes = FxHashMap::default();
        let mut parents = FxHashMap::default();
        let mut preorder = Vec::new();
        let mut pending = vec![NodeRef::clone(&root)];

        while let Some(node) = pending.pop() {
            preorder.push(node.id());
            for child in node.children().into_iter().rev() {
                parents.insert(child.id(), node.id());
                pending.push(NodeRef::clone(child));
            }
            nodes.insert(node.id(), node);
        }

        Tree {
            root,
            nodes,
            parents,
            preorder,
        }
    }

    #[inline]
    pub fn root(&self) -> &NodeRef {
        &self.root
    }

    pub fn get(&self, id: NodeId) -> Option<&NodeRef> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn parent(&self, id: NodeId) -> Option<&NodeRef> {
        self.parents.get(&id).and_then(|parent| self.nodes.get(parent))
    }

    /// Ancestors of `id`, nearest first. Excludes the node itself.
    pub fn ancestors(&self, id: NodeId) -> impl Iterator<Item = &NodeRef> + '_ {
        std::iter::successors(self.parent(id), |node| self.parent(node.id()))
    }

    /// Whether `ancestor` is `id` or one of its ancestors.
    pub fn is_within(&self, id: NodeId, ancestor: NodeId) -> bool {
        id == ancestor || self.ancestors(id).any(|node| node.id() == ancestor)
    }

    /// All nodes in pre-order (parents before children, left to right).
    pub fn preorder(&self) -> impl Iterator<Item = &NodeRef> + '_ {
        self.preorder.iter().filter_map(|id| self.nodes.get(id))
    }

    pub fn len(&self) -> usize {
        self.preorder.len()
    }

    pub fn is_empty(&self) -> bool {
        self.preorder.is_empty()
    }

    /// Clone-and-replace, re-indexed.
    pub fn replace(&self, original: NodeId, replacement: &NodeRef) -> Tree {
        Tree::new(Node::replace(&self.root, original, replacement))
    }
}
