use std::sync::Arc;

use lumen_ir::StreamId;
use lumen_types::Type;
use lumen_values::Value;
use parking_lot::Mutex;

use super::{StreamConfig, StreamProducer, StreamSink};

/// A stream the host drives by hand through a [`ManualHandle`].
pub struct ManualStream {
    stream: StreamId,
    value_type: Type,
    initial: Value,
    sink: Arc<Mutex<Option<StreamSink>>>,
}

/// Emits into a [`ManualStream`] while it is started.
#[derive(Clone)]
pub struct ManualHandle {
    sink: Arc<Mutex<Option<StreamSink>>>,
}

impl ManualStream {
    pub fn new(stream: StreamId, value_type: Type, initial: Value) -> Self {
        ManualStream {
            stream,
            value_type,
            initial,
            sink: Arc::new(Mutex::new(None)),
        }
    }

    pub fn handle(&self) -> ManualHandle {
        ManualHandle {
            sink: Arc::clone(&self.sink),
        }
    }
}

impl ManualHandle {
    /// Returns false if the stream is stopped or its evaluator is gone.
    pub fn emit(&self, value: Value) -> bool {
        self.sink
            .lock()
            .as_ref()
            .is_some_and(|sink| sink.emit(value))
    }
}

impl StreamProducer for ManualStream {
    fn stream(&self) -> StreamId {
        self.stream
    }

    fn start(&mut self, sink: StreamSink) {
        *self.sink.lock() = Some(sink);
    }

    fn stop(&mut self) {
        *self.sink.lock() = None;
    }

    fn configure(&mut self, _config: StreamConfig) {}

    fn value_type(&self) -> Type {
        self.value_type.clone()
    }

    fn initial_value(&self) -> Value {
        self.initial.clone()
    }
}
