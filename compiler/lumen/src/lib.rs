//! Lumen - a reactive evaluation engine for live performance programs.
//!
//! Programs are trees of expressions that recompute as external streams
//! (time, input devices, audio) emit values. The engine is split into:
//!
//! - [`lumen_ir`]: the persistent program tree
//! - [`lumen_types`]: type inference and static conflicts
//! - [`lumen_values`]: immutable runtime values
//! - [`lumen_eval`]: the step compiler, the stack-machine evaluator, and
//!   the stream boundary
//!
//! This crate re-exports the parts a host needs and sets up logging.
//!
//! ```text
//! let project = Project::new(Source::new("main", build::program([...])));
//! let Evaluation { value, conflicts } = lumen::evaluate(project);
//! ```

use std::sync::{Arc, Once};

pub use lumen_diagnostic::{Diagnostic, ErrorCode, KeyFormatter, Template, TemplateFormatter};
pub use lumen_eval::{
    EngineError, EngineResult, EvalConfig, Evaluator, LevelFeeder, LevelStream, ManualHandle,
    ManualStream, Notification, PassRecord, Session, Step, StreamConfig, StreamProducer,
    StreamSink,
};
pub use lumen_ir::{build, BinaryOp, Name, Node, NodeId, NodeKind, NodeRef, StreamId, UnaryOp, Unit};
pub use lumen_types::{
    Conflict, ConflictKind, ConflictSet, Project, Source, StreamDeclaration, Type,
};
pub use lumen_values::{Exception, ExceptionKind, Value};

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Safe to call more than once. Does nothing unless `RUST_LOG` is set, e.g.
/// `RUST_LOG=lumen_eval=debug` for pass boundaries or
/// `RUST_LOG=lumen_eval=trace` for every step.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_bracketed_fields(true),
                )
                .with(filter)
                .init();
        }
    });
}

/// The outcome of evaluating a program once.
#[derive(Clone, Debug)]
pub struct Evaluation {
    /// The main source's value, or the exception that halted it.
    pub value: Value,
    pub conflicts: ConflictSet,
}

/// Analyze `project` and run its first pass with the default limits.
pub fn evaluate(project: Project) -> Evaluation {
    evaluate_with(project, EvalConfig::default())
}

#[tracing::instrument(level = "debug", skip_all, fields(sources = project.sources().len()))]
pub fn evaluate_with(project: Project, config: EvalConfig) -> Evaluation {
    let mut evaluator = Evaluator::new(Arc::new(project), config);
    let value = evaluator.run().cloned().unwrap_or(Value::None);
    let conflicts = evaluator.conflicts();
    tracing::debug!(
        steps = evaluator.step_count(),
        conflicts = conflicts.len(),
        "evaluated"
    );
    Evaluation { value, conflicts }
}
