use super::*;
use lumen_ir::{build, BinaryOp, NodeRef, StreamId};
use lumen_types::{Source, StreamDeclaration, Type};
use pretty_assertions::assert_eq;

use crate::{ManualHandle, ManualStream};

const CLICKS: StreamId = StreamId::new(3);

fn project(root: NodeRef) -> Project {
    Project::new(Source::new("main", root)).with_stream(StreamDeclaration::new(
        CLICKS,
        "Clicks",
        Type::unitless(),
    ))
}

fn session() -> (Session, ManualHandle) {
    let stream = ManualStream::new(CLICKS, Type::unitless(), Value::number(0.0));
    let handle = stream.handle();
    let mut session = Session::new(EvalConfig::default());
    session.add_producer(Box::new(stream));
    (session, handle)
}

fn clicks_plus(n: f64) -> NodeRef {
    build::program([build::binary(
        build::reference("Clicks"),
        BinaryOp::Add,
        build::number(n),
    )])
}

#[test]
fn no_program_until_loaded() {
    let (mut session, _) = session();
    assert!(matches!(session.evaluator(), Err(EngineError::NoProgram)));
    assert_eq!(session.react(), Err(EngineError::NoProgram));
}

#[test]
fn load_runs_the_first_pass_with_initial_values() {
    let (mut session, _) = session();
    let result = session.load(project(clicks_plus(1.0))).unwrap().cloned();
    assert_eq!(result, Some(Value::number(1.0)));
}

#[test]
fn producers_drive_passes() {
    let (mut session, handle) = session();
    session.load(project(clicks_plus(1.0))).unwrap();

    assert!(handle.emit(Value::number(4.0)));
    assert_eq!(session.react().unwrap().cloned(), Some(Value::number(5.0)));
    assert_eq!(session.react().unwrap(), None);
}

#[test]
fn replacing_discards_the_old_program() {
    let (mut session, handle) = session();
    session.load(project(clicks_plus(1.0))).unwrap();
    handle.emit(Value::number(4.0));

    let result = session
        .replace(project(clicks_plus(100.0)))
        .unwrap()
        .cloned();
    assert_eq!(result, Some(Value::number(100.0)));
    // The click sent to the old program is gone with it.
    assert_eq!(session.react().unwrap(), None);
    assert_eq!(session.evaluator().unwrap().passes().len(), 1);

    handle.emit(Value::number(1.0));
    assert_eq!(session.react().unwrap().cloned(), Some(Value::number(101.0)));
}

#[test]
fn producers_for_undeclared_streams_stay_stopped() {
    let (mut session, handle) = session();
    let program = Project::new(Source::new("main", build::program([build::number(1.0)])));
    session.load(program).unwrap();
    assert!(!handle.emit(Value::number(1.0)));
}

#[test]
fn stop_disconnects_producers() {
    let (mut session, handle) = session();
    session.load(project(clicks_plus(1.0))).unwrap();
    session.stop();
    assert!(!handle.emit(Value::number(1.0)));
    assert!(session.evaluator().is_err());
}
