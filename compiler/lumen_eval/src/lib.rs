#![deny(clippy::arithmetic_side_effects)]
//! Lumen Eval - compiler and evaluator for lumen programs.
//!
//! # Architecture
//!
//! - [`compile`]: lowers a node into a flat sequence of [`Step`]s with
//!   relative jumps
//! - [`Evaluator`]: a single-threaded stack machine over those steps, with
//!   per-pass limits, memoized reuse of unaffected nodes, reactions, and
//!   time travel over the recorded stream history
//! - [`StreamProducer`]: the boundary to external streams, which only ever
//!   enqueue notifications through a [`StreamSink`]
//! - [`Session`]: owns one evaluator and replaces it atomically when the
//!   program changes

mod compile;
mod config;
mod error;
mod evaluator;
mod operators;
mod session;
mod step;
mod stream;

pub use compile::{compile, compile_function, Compiler};
pub use config::EvalConfig;
pub use error::{EngineError, EngineResult};
pub use evaluator::{Evaluator, PassRecord};
pub use operators::{evaluate_binary, evaluate_unary};
pub use session::Session;
pub use step::Step;
pub use stream::{
    LevelFeeder, LevelStream, ManualHandle, ManualStream, Notification, StreamConfig,
    StreamProducer, StreamSink, StreamState,
};
