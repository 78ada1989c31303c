//! Lumen IR - the program tree.
//!
//! This crate holds the data the rest of the engine analyzes and runs:
//! - `Name`: interned identifiers
//! - `NodeId`/`StreamId`: identities for syntax nodes and external streams
//! - `Unit`: products of named base units carried by numbers
//! - `Node`/`NodeKind`: the immutable, persistent syntax tree
//! - `Tree`: a parent/lookup index over one tree
//! - `build`: constructors used by hosts (and tests) in place of a parser
//!
//! # Persistence
//!
//! Trees are never edited in place. `Node::replace` builds a new root that
//! shares every untouched subtree with the old one through `Arc`, so node
//! identity survives an edit everywhere except along the replaced path.

pub mod build;
mod ids;
mod name;
mod node;
mod operators;
mod stack;
mod tree;
mod unit;

pub use ids::{NodeId, StreamId};
pub use name::Name;
pub use node::{Node, NodeKind, NodeRef};
pub use operators::{BinaryOp, OperatorGroup, UnaryOp};
pub use stack::ensure_sufficient_stack;
pub use tree::Tree;
pub use unit::Unit;
