//! Runtime values for the lumen evaluator.
//!
//! Every value is immutable. Containers live behind [`Heap`], whose
//! constructor is private to this crate, and every update returns a fresh
//! value that shares nothing mutable with the original.

mod exception;
mod function;
mod heap;
mod list;
mod map;
mod number;
mod scope;
mod set;
mod stream;
mod structure;
mod value;

pub use exception::{Exception, ExceptionKind};
pub use function::{FunctionKind, FunctionValue};
pub use heap::Heap;
pub use list::ListValue;
pub use map::MapValue;
pub use number::{Number, UnitMismatch};
pub use scope::{Binding, Dependencies, Scope, SharedScope};
pub use set::SetValue;
pub use stream::StreamValue;
pub use structure::StructureValue;
pub use value::Value;
