//! Static analysis for lumen programs.
//!
//! - [`Type`]: what a node may evaluate to, with structural acceptance
//! - [`Project`]/[`Source`]: the programs being analyzed and the streams
//!   they may read
//! - [`Context`]: lazily computed, memoized answers about a project (name
//!   resolution, types, conflicts)
//! - [`Conflict`]/[`ConflictSet`]: static problems, which never stop
//!   analysis or evaluation

mod check;
mod conflict;
mod context;
mod infer;
mod project;
mod resolve;
mod ty;
mod type_set;

pub use conflict::{Conflict, ConflictKind, ConflictSet};
pub use context::{Context, Definition};
pub use infer::{integral_literal, Operation};
pub use project::{EvaluationOrder, Project, Source, StreamDeclaration};
pub use resolve::reaction_of;
pub use ty::{FunctionType, InputType, StreamSource, Type, UnknownReason, UnknownType};
pub use type_set::TypeSet;
