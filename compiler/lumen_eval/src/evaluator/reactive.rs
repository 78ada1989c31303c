//! Stream notifications and reactive passes.
//!
//! Producers enqueue notifications through a [`StreamSink`] at any time.
//! The evaluator only drains the queue between passes, so every node sees
//! one stable value per stream for the whole of a pass.

use std::mem;

use lumen_ir::StreamId;
use lumen_types::StreamSource;
use lumen_values::Value;
use rustc_hash::{FxHashMap, FxHashSet};

use super::{Evaluator, PassRecord};
use crate::stream::{Notification, StreamSink};
use crate::{EngineError, EngineResult};

impl Evaluator {
    /// A sink that producers of `stream` emit into.
    pub fn sink(&self, stream: StreamId) -> EngineResult<StreamSink> {
        if self.context.project().stream_by_id(stream).is_none() {
            return Err(EngineError::UnknownStream(stream));
        }
        Ok(StreamSink::new(stream, self.sender.clone()))
    }

    /// Enqueue a value for `stream`, as a producer would.
    pub fn notify(&self, stream: StreamId, value: Value) -> EngineResult<()> {
        self.sink(stream)?.emit(value);
        Ok(())
    }

    /// Drain pending notifications and, if any stream that was read in the
    /// last pass changed, begin a new pass.
    ///
    /// Returns whether a pass began. Nothing is drained while a pass is in
    /// progress. While viewing an earlier pass, notifications are kept
    /// until [`Evaluator::return_to_present`] and `InThePast` is returned.
    #[tracing::instrument(level = "debug", skip_all, fields(pass = self.current_pass))]
    pub fn react(&mut self) -> EngineResult<bool> {
        if let Some(pass) = self.viewing {
            self.deferred.extend(self.receiver.try_iter());
            return Err(EngineError::InThePast(pass));
        }
        if !self.is_done() {
            return Ok(false);
        }
        let mut drained = mem::take(&mut self.deferred);
        drained.extend(self.receiver.try_iter());
        if drained.is_empty() {
            return Ok(false);
        }
        tracing::debug!(notifications = drained.len(), "drained");

        let changed = self.apply(&drained);
        self.pending_record.push(drained);
        let affected = changed.iter().any(|source| match source {
            StreamSource::External(stream) => self
                .streams
                .get(stream)
                .is_some_and(|state| state.is_subscribed()),
            StreamSource::Reaction(_) => false,
        });
        if !affected {
            return Ok(false);
        }

        self.current_pass = self.passes.len();
        self.passes.push(PassRecord {
            drains: mem::take(&mut self.pending_record),
            result: None,
            steps: 0,
        });
        self.begin_pass(changed);
        Ok(true)
    }

    /// Append the latest value per stream to its history. Returns the
    /// streams that received a value.
    pub(super) fn apply(&mut self, notifications: &[Notification]) -> FxHashSet<StreamSource> {
        let mut latest: FxHashMap<StreamId, &Value> = FxHashMap::default();
        let mut order = Vec::new();
        for notification in notifications {
            if latest.insert(notification.stream, &notification.value).is_none() {
                order.push(notification.stream);
            }
        }

        let mut changed = FxHashSet::default();
        for stream in order {
            let (Some(state), Some(value)) = (self.streams.get_mut(&stream), latest.get(&stream))
            else {
                tracing::debug!(%stream, "notification for an undeclared stream");
                continue;
            };
            state.push((*value).clone());
            changed.insert(StreamSource::External(stream));
        }
        changed
    }
}
