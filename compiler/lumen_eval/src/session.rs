//! Program replacement.
//!
//! A [`Session`] owns the stream producers and at most one evaluator.
//! Replacing the program stops every producer and drops the old evaluator,
//! with its subscriptions and notification queue, before the new one
//! exists. Nothing the old program enqueued can reach the new one.

use std::sync::Arc;

use lumen_types::Project;
use lumen_values::Value;

use crate::{EngineError, EngineResult, EvalConfig, Evaluator, StreamProducer};

pub struct Session {
    config: EvalConfig,
    producers: Vec<Box<dyn StreamProducer>>,
    evaluator: Option<Evaluator>,
}

impl Session {
    pub fn new(config: EvalConfig) -> Self {
        Session {
            config,
            producers: Vec::new(),
            evaluator: None,
        }
    }

    /// Register a producer. It starts with the next loaded program.
    pub fn add_producer(&mut self, producer: Box<dyn StreamProducer>) {
        self.producers.push(producer);
    }

    /// Start evaluating `project` and run its first pass.
    ///
    /// Producers whose stream the project does not declare stay stopped.
    #[tracing::instrument(level = "debug", skip_all)]
    pub fn load(&mut self, project: Project) -> EngineResult<Option<&Value>> {
        self.stop();
        let mut evaluator = Evaluator::new(Arc::new(project), self.config.clone());
        for producer in &mut self.producers {
            let stream = producer.stream();
            match evaluator.sink(stream) {
                Ok(sink) => {
                    evaluator.declare_initial(stream, producer.initial_value())?;
                    producer.start(sink);
                }
                Err(EngineError::UnknownStream(_)) => {
                    tracing::debug!(%stream, "producer not used by this program");
                }
                Err(error) => return Err(error),
            }
        }
        evaluator.start();
        evaluator.run_to_end();
        let evaluator = self.evaluator.insert(evaluator);
        Ok(evaluator.result())
    }

    /// Discard the running program and load `project` in its place.
    pub fn replace(&mut self, project: Project) -> EngineResult<Option<&Value>> {
        tracing::debug!("replacing program");
        self.load(project)
    }

    /// Stop every producer and drop the evaluator.
    pub fn stop(&mut self) {
        for producer in &mut self.producers {
            producer.stop();
        }
        self.evaluator = None;
    }

    pub fn evaluator(&self) -> EngineResult<&Evaluator> {
        self.evaluator.as_ref().ok_or(EngineError::NoProgram)
    }

    pub fn evaluator_mut(&mut self) -> EngineResult<&mut Evaluator> {
        self.evaluator.as_mut().ok_or(EngineError::NoProgram)
    }

    /// Run a pass for pending notifications, if any stream that matters
    /// changed. Returns the new result when a pass ran.
    pub fn react(&mut self) -> EngineResult<Option<&Value>> {
        let evaluator = self.evaluator.as_mut().ok_or(EngineError::NoProgram)?;
        if !evaluator.react()? {
            return Ok(None);
        }
        evaluator.run_to_end();
        Ok(evaluator.result())
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests;
