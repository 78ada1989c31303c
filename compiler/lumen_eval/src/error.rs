//! Host-facing engine errors.
//!
//! These report misuse of the evaluator's API. Problems in the program
//! itself are never errors: they are conflicts or exception values.

use lumen_ir::StreamId;
use thiserror::Error;

pub type EngineResult<T> = std::result::Result<T, EngineError>;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum EngineError {
    /// A notification or query named a stream the program never declared.
    #[error("unknown stream: {0}")]
    UnknownStream(StreamId),

    #[error("pass {requested} does not exist; {available} passes recorded")]
    NoSuchPass { requested: usize, available: usize },

    /// Stepping backwards from the first step of the first pass.
    #[error("already at the first step")]
    AtBeginning,

    /// Reacting to streams while viewing an earlier pass.
    #[error("cannot evaluate while viewing pass {0}")]
    InThePast(usize),

    #[error("no program is loaded")]
    NoProgram,
}
