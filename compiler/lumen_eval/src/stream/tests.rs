use std::time::Duration;

use super::*;
use crossbeam::channel::{unbounded, Receiver};
use lumen_ir::build;
use pretty_assertions::assert_eq;

const LEVEL: StreamId = StreamId::new(7);

fn sink() -> (StreamSink, Receiver<Notification>) {
    let (sender, receiver) = unbounded();
    (StreamSink::new(LEVEL, sender), receiver)
}

fn values(receiver: &Receiver<Notification>) -> Vec<Value> {
    receiver.try_iter().map(|notification| notification.value).collect()
}

#[test]
fn history_is_bounded() {
    let mut state = StreamState::with_initial(Value::number(0.0), 3);
    for n in 1..=4 {
        state.push(Value::number(f64::from(n)));
    }
    assert_eq!(state.len(), 3);
    assert_eq!(state.latest(), Some(&Value::number(4.0)));
    assert_eq!(state.previous(1), Some(&Value::number(3.0)));
    assert_eq!(state.previous(2), Some(&Value::number(2.0)));
    assert_eq!(state.previous(3), None);
}

#[test]
fn reset_returns_to_initial() {
    let mut state = StreamState::with_initial(Value::number(0.0), 8);
    state.push(Value::number(1.0));
    state.subscribe(build::none().id());
    assert!(state.is_subscribed());

    state.reset();
    assert_eq!(state.len(), 1);
    assert_eq!(state.latest(), Some(&Value::number(0.0)));
    assert!(!state.is_subscribed());
}

#[test]
fn version_moves_on_every_change() {
    let mut state = StreamState::with_initial(Value::number(0.0), 2);
    let start = state.version();

    state.push(Value::number(1.0));
    let pushed = state.version();
    assert_ne!(pushed, start);

    // A full history still counts as a change.
    state.push(Value::number(2.0));
    state.push(Value::number(3.0));
    assert!(state.version() > pushed);

    let before_reset = state.version();
    state.reset();
    assert!(state.version() > before_reset);
}

#[test]
fn without_initial_value_history_is_empty() {
    let state = StreamState::new(8);
    assert!(state.is_empty());
    assert_eq!(state.latest(), None);
}

#[test]
fn sink_enqueues_notifications() {
    let (sink, receiver) = sink();
    assert!(sink.emit(Value::number(1.0)));
    assert_eq!(
        receiver.try_recv().ok(),
        Some(Notification {
            stream: LEVEL,
            value: Value::number(1.0)
        })
    );
    drop(receiver);
    assert!(!sink.emit(Value::number(2.0)));
}

#[test]
fn manual_stream_emits_only_while_started() {
    let mut stream = ManualStream::new(LEVEL, Type::Text, Value::text(""));
    let handle = stream.handle();
    assert!(!handle.emit(Value::text("early")));

    let (sink, receiver) = sink();
    stream.start(sink);
    assert!(handle.emit(Value::text("a")));
    stream.stop();
    assert!(!handle.emit(Value::text("late")));

    assert_eq!(values(&receiver), vec![Value::text("a")]);
    assert_eq!(stream.initial_value(), Value::text(""));
}

#[test]
fn level_is_a_percentage_of_the_loudest_bin() {
    assert_eq!(LevelStream::level(&[]), 0);
    assert_eq!(LevelStream::level(&[0, 128, 12]), 50);
    assert_eq!(LevelStream::level(&[255, 3]), 99);
}

fn level_stream(interval_ms: u64) -> (LevelStream, LevelFeeder, Receiver<Notification>) {
    let config = StreamConfig {
        interval: Duration::from_millis(interval_ms),
    };
    let mut stream = LevelStream::new(LEVEL, &config);
    let feeder = stream.feeder();
    let (sink, receiver) = sink();
    stream.start(sink);
    (stream, feeder, receiver)
}

#[test]
fn level_emits_at_most_once_per_interval() {
    let (_stream, feeder, receiver) = level_stream(100);
    let at = Duration::from_millis;

    assert!(feeder.sample(at(0), &[128]));
    assert!(!feeder.sample(at(40), &[255]));
    assert!(!feeder.sample(at(80), &[0]));
    // The loudest level since the last emission wins.
    assert!(feeder.sample(at(100), &[64]));
    assert!(feeder.sample(at(250), &[64]));

    assert_eq!(
        values(&receiver),
        vec![Value::number(50.0), Value::number(99.0), Value::number(25.0)]
    );
}

#[test]
fn reconfiguring_restarts_the_interval() {
    let (mut stream, feeder, receiver) = level_stream(100);
    let at = Duration::from_millis;

    assert!(feeder.sample(at(0), &[128]));
    assert!(!feeder.sample(at(10), &[255]));
    stream.configure(StreamConfig {
        interval: Duration::from_millis(500),
    });
    // The pending peak is dropped and the next sample emits at once.
    assert!(feeder.sample(at(20), &[0]));
    assert!(!feeder.sample(at(400), &[128]));

    assert_eq!(
        values(&receiver),
        vec![Value::number(50.0), Value::number(0.0)]
    );
    assert_eq!(stream.value_type(), Type::unitless());
}
