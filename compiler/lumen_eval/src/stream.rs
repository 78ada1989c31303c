//! Streams: subscription state, the notification queue, and producers.
//!
//! Producers never touch evaluator state. They are handed a [`StreamSink`]
//! when started and enqueue a [`Notification`] for every new value; the
//! evaluator drains the queue between passes.

mod level;
mod manual;

use std::collections::VecDeque;
use std::time::Duration;

use crossbeam::channel::Sender;
use lumen_ir::{NodeId, StreamId};
use lumen_types::Type;
use lumen_values::Value;
use rustc_hash::FxHashSet;

pub use level::{LevelFeeder, LevelStream};
pub use manual::{ManualHandle, ManualStream};

/// A stream produced a value.
#[derive(Clone, Debug, PartialEq)]
pub struct Notification {
    pub stream: StreamId,
    pub value: Value,
}

/// The producer's end of the notification queue for one stream.
#[derive(Clone, Debug)]
pub struct StreamSink {
    stream: StreamId,
    sender: Sender<Notification>,
}

impl StreamSink {
    pub(crate) fn new(stream: StreamId, sender: Sender<Notification>) -> Self {
        StreamSink { stream, sender }
    }

    pub fn stream(&self) -> StreamId {
        self.stream
    }

    /// Enqueue `value`. Returns false once the evaluator is gone.
    pub fn emit(&self, value: Value) -> bool {
        self.sender
            .send(Notification {
                stream: self.stream,
                value,
            })
            .is_ok()
    }
}

/// Producer settings that may change while it runs.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StreamConfig {
    /// Minimum time between emitted values, measured on the producer's own
    /// sample clock.
    pub interval: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        StreamConfig {
            interval: Duration::from_millis(33),
        }
    }
}

/// An external source of values, such as a timer or an input device.
pub trait StreamProducer: Send {
    fn stream(&self) -> StreamId;

    /// Begin emitting into `sink`.
    fn start(&mut self, sink: StreamSink);

    /// Stop emitting and drop the sink.
    fn stop(&mut self);

    fn configure(&mut self, config: StreamConfig);

    /// Type of every value this producer emits.
    fn value_type(&self) -> Type;

    /// The value a program sees before the first emission.
    fn initial_value(&self) -> Value;
}

/// Values a stream has had, newest last, and the nodes that read it.
#[derive(Clone, Debug)]
pub struct StreamState {
    initial: Option<Value>,
    history: VecDeque<Value>,
    limit: usize,
    dependents: FxHashSet<NodeId>,
    /// Bumped whenever `history` changes; never decreases.
    version: u64,
}

impl StreamState {
    pub fn new(limit: usize) -> Self {
        StreamState {
            initial: None,
            history: VecDeque::new(),
            limit: limit.max(1),
            dependents: FxHashSet::default(),
            version: 0,
        }
    }

    pub fn with_initial(initial: Value, limit: usize) -> Self {
        let mut state = StreamState::new(limit);
        state.set_initial(initial);
        state
    }

    /// Replace the starting value and forget everything since.
    pub fn set_initial(&mut self, initial: Value) {
        self.initial = Some(initial);
        self.reset();
    }

    /// Back to the starting value, with no subscribers.
    pub fn reset(&mut self) {
        self.history.clear();
        self.history.extend(self.initial.clone());
        self.dependents.clear();
        self.version = self.version.wrapping_add(1);
    }

    pub fn push(&mut self, value: Value) {
        if self.history.len() == self.limit {
            self.history.pop_front();
        }
        self.history.push_back(value);
        self.version = self.version.wrapping_add(1);
    }

    /// Changes whenever a value is pushed or the history is reset, so a
    /// value computed from this stream can tell whether it is stale.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn latest(&self) -> Option<&Value> {
        self.history.back()
    }

    /// The value `offset` emissions before the latest.
    pub fn previous(&self, offset: usize) -> Option<&Value> {
        let newest = self.history.len().checked_sub(1)?;
        self.history.get(newest.checked_sub(offset)?)
    }

    pub fn len(&self) -> usize {
        self.history.len()
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty()
    }

    pub fn subscribe(&mut self, node: NodeId) {
        self.dependents.insert(node);
    }

    pub fn is_subscribed(&self) -> bool {
        !self.dependents.is_empty()
    }

    pub fn dependents(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.dependents.iter().copied()
    }
}

#[cfg(test)]
mod tests;
