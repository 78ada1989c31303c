//! Audio level: raw frequency bins in, a unitless percentage out.
//!
//! Each sample's level is `floor(100 · max / 256)` over its bins. At most
//! one value is emitted per configured interval of sample time; the loudest
//! level seen since the last emission is the one emitted.
//!
//! Reconfiguring keeps whatever was already emitted, drops the pending
//! peak, and restarts the interval, so the next sample emits immediately.

use std::sync::Arc;
use std::time::Duration;

use lumen_ir::StreamId;
use lumen_types::Type;
use lumen_values::Value;
use parking_lot::Mutex;

use super::{StreamConfig, StreamProducer, StreamSink};

#[derive(Default)]
struct LevelState {
    sink: Option<StreamSink>,
    interval: Duration,
    last_emitted: Option<Duration>,
    pending: Option<u8>,
}

pub struct LevelStream {
    stream: StreamId,
    state: Arc<Mutex<LevelState>>,
}

/// Feeds raw samples to a [`LevelStream`], typically from an audio thread.
#[derive(Clone)]
pub struct LevelFeeder {
    state: Arc<Mutex<LevelState>>,
}

impl LevelStream {
    pub fn new(stream: StreamId, config: &StreamConfig) -> Self {
        LevelStream {
            stream,
            state: Arc::new(Mutex::new(LevelState {
                interval: config.interval,
                ..LevelState::default()
            })),
        }
    }

    pub fn feeder(&self) -> LevelFeeder {
        LevelFeeder {
            state: Arc::clone(&self.state),
        }
    }

    /// `floor(100 · max / 256)`; 0 for no bins.
    #[expect(
        clippy::arithmetic_side_effects,
        reason = "255 * 100 fits in a u16"
    )]
    pub fn level(bins: &[u8]) -> u8 {
        let max = bins.iter().copied().max().unwrap_or(0);
        (u16::from(max) * 100 / 256) as u8
    }
}

impl LevelFeeder {
    /// Record the bins sampled at `at`. Returns whether a value was emitted.
    pub fn sample(&self, at: Duration, bins: &[u8]) -> bool {
        let level = LevelStream::level(bins);
        let mut state = self.state.lock();
        let peak = state.pending.map_or(level, |pending| pending.max(level));
        let due = state
            .last_emitted
            .map_or(true, |last| at.saturating_sub(last) >= state.interval);
        if !due {
            state.pending = Some(peak);
            return false;
        }
        state.pending = None;
        state.last_emitted = Some(at);
        match &state.sink {
            Some(sink) => sink.emit(Value::number(f64::from(peak))),
            None => false,
        }
    }
}

impl StreamProducer for LevelStream {
    fn stream(&self) -> StreamId {
        self.stream
    }

    fn start(&mut self, sink: StreamSink) {
        let mut state = self.state.lock();
        state.sink = Some(sink);
        state.last_emitted = None;
        state.pending = None;
    }

    fn stop(&mut self) {
        self.state.lock().sink = None;
    }

    fn configure(&mut self, config: StreamConfig) {
        let mut state = self.state.lock();
        state.interval = config.interval;
        state.pending = None;
        state.last_emitted = None;
    }

    fn value_type(&self) -> Type {
        Type::unitless()
    }

    fn initial_value(&self) -> Value {
        Value::number(0.0)
    }
}
