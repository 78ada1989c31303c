use std::sync::Arc;

use super::*;
use lumen_ir::{build, BinaryOp, NodeRef, StreamId};
use lumen_types::{ConflictKind, Project, Source, StreamDeclaration, Type};
use lumen_values::ExceptionKind;
use pretty_assertions::assert_eq;

const TIME: StreamId = StreamId::new(1);

fn project(root: NodeRef) -> Arc<Project> {
    Arc::new(
        Project::new(Source::new("main", root)).with_stream(StreamDeclaration::new(
            TIME,
            "Time",
            Type::unitless(),
        )),
    )
}

fn evaluator_with(root: NodeRef, config: EvalConfig) -> Evaluator {
    let mut evaluator = Evaluator::new(project(root), config);
    evaluator.declare_initial(TIME, Value::number(0.0)).unwrap();
    evaluator.start();
    evaluator.run_to_end();
    evaluator
}

fn evaluator(root: NodeRef) -> Evaluator {
    evaluator_with(root, EvalConfig::default())
}

fn evaluate(root: NodeRef) -> Value {
    evaluator(root).result().cloned().unwrap()
}

fn kind(value: &Value) -> Option<ExceptionKind> {
    value.as_exception().map(|exception| exception.kind)
}

/// Emit `value` on Time, react, and finish the pass if one began.
fn tick(evaluator: &mut Evaluator, value: f64) -> bool {
    evaluator.notify(TIME, Value::number(value)).unwrap();
    let began = evaluator.react().unwrap();
    evaluator.run_to_end();
    began
}

#[test]
fn one_plus_one() {
    let program = build::program([build::binary(
        build::number(1.0),
        BinaryOp::Add,
        build::number(1.0),
    )]);
    let evaluator = evaluator(program);
    assert_eq!(evaluator.result(), Some(&Value::number(2.0)));
    assert!(evaluator.conflicts().is_empty());
    assert!(evaluator.is_done());
}

#[test]
fn operands_keep_their_order() {
    let program = build::program([build::binary(
        build::text("left"),
        BinaryOp::Add,
        build::text("right"),
    )]);
    assert_eq!(evaluate(program), Value::text("leftright"));

    let program = build::program([build::binary(
        build::number(10.0),
        BinaryOp::Subtract,
        build::number(4.0),
    )]);
    assert_eq!(evaluate(program), Value::number(6.0));
}

#[test]
fn containers() {
    let program = build::program([build::list([
        build::number(1.0),
        build::number(2.0),
        build::number(3.0),
    ])]);
    assert_eq!(
        evaluate(program),
        Value::list(vec![
            Value::number(1.0),
            Value::number(2.0),
            Value::number(3.0)
        ])
    );

    let program = build::program([build::map([
        build::key_value(build::text("a"), build::number(1.0)),
        build::key_value(build::text("b"), build::number(2.0)),
    ])]);
    assert_eq!(
        evaluate(program),
        Value::map([
            (Value::text("a"), Value::number(1.0)),
            (Value::text("b"), Value::number(2.0)),
        ])
    );
}

#[test]
fn binds_and_references() {
    let program = build::program([
        build::bind("x", build::number(4.0)),
        build::binary(build::reference("x"), BinaryOp::Multiply, build::number(2.0)),
    ]);
    assert_eq!(evaluate(program), Value::number(8.0));
}

#[test]
fn block_ending_in_bind_is_none() {
    let program = build::program([build::bind("x", build::number(4.0))]);
    assert_eq!(evaluate(program), Value::None);
}

#[test]
fn empty_program_is_none() {
    assert_eq!(evaluate(build::program([])), Value::None);
}

#[test]
fn nested_block_scopes_its_names() {
    let program = build::program([
        build::bind("x", build::number(1.0)),
        build::block([
            build::bind("x", build::number(2.0)),
            build::reference("x"),
        ]),
    ]);
    assert_eq!(evaluate(program), Value::number(2.0));
}

#[test]
fn unbound_name_halts() {
    let reference = build::reference("nope");
    let program = build::program([NodeRef::clone(&reference)]);
    let result = evaluate(program);
    assert_eq!(kind(&result), Some(ExceptionKind::NameUnbound));
    assert_eq!(result.exception_node(), Some(reference.id()));
}

#[test]
fn reference_before_its_bind_halts() {
    let program = build::program([
        build::reference("later"),
        build::bind("later", build::number(1.0)),
    ]);
    assert_eq!(kind(&evaluate(program)), Some(ExceptionKind::NameUnbound));
}

#[test]
fn placeholder_halts() {
    let program = build::program([build::binary(
        build::number(1.0),
        BinaryOp::Add,
        build::placeholder(),
    )]);
    assert_eq!(kind(&evaluate(program)), Some(ExceptionKind::Placeholder));
}

#[test]
fn conditionals() {
    let program = build::program([build::conditional(
        build::boolean(false),
        build::text("yes"),
        build::text("no"),
    )]);
    assert_eq!(evaluate(program), Value::text("no"));

    let program = build::program([build::conditional(
        build::number(1.0),
        build::text("yes"),
        build::text("no"),
    )]);
    assert_eq!(kind(&evaluate(program)), Some(ExceptionKind::TypeMismatch));
}

#[test]
fn list_access() {
    let list = || build::list([build::text("a"), build::text("b")]);
    let program = build::program([build::list_access(list(), build::number(2.0))]);
    assert_eq!(evaluate(program), Value::text("b"));

    let program = build::program([build::list_access(list(), build::number(5.0))]);
    assert_eq!(evaluate(program), Value::None);
}

#[test]
fn is_tests_runtime_type() {
    let program = build::program([build::is(build::number(1.0), build::number_type(""))]);
    assert_eq!(evaluate(program), Value::Bool(true));

    let program = build::program([build::is(build::text("1"), build::number_type(""))]);
    assert_eq!(evaluate(program), Value::Bool(false));
}

#[test]
fn unit_mismatch_halts() {
    let program = build::program([build::binary(
        build::measure(1.0, "m"),
        BinaryOp::Add,
        build::measure(1.0, "s"),
    )]);
    assert_eq!(kind(&evaluate(program)), Some(ExceptionKind::TypeMismatch));
}

#[test]
fn function_call() {
    let program = build::program([
        build::function(
            "double",
            [build::input("n", None)],
            None,
            build::binary(build::reference("n"), BinaryOp::Multiply, build::number(2.0)),
        ),
        build::call("double", [build::number(4.0)]),
    ]);
    assert_eq!(evaluate(program), Value::number(8.0));
}

#[test]
fn functions_are_hoisted() {
    let program = build::program([
        build::bind("early", build::call("identity", [build::number(2.0)])),
        build::function(
            "identity",
            [build::input("n", None)],
            None,
            build::reference("n"),
        ),
        build::reference("early"),
    ]);
    assert_eq!(evaluate(program), Value::number(2.0));
}

#[test]
fn omitted_inputs_take_defaults() {
    let add = build::function(
        "add",
        [
            build::input("a", None),
            build::input_with_default("b", None, build::number(10.0)),
        ],
        None,
        build::binary(build::reference("a"), BinaryOp::Add, build::reference("b")),
    );
    let program = build::program([add, build::call("add", [build::number(1.0)])]);
    assert_eq!(evaluate(program), Value::number(11.0));
}

#[test]
fn missing_required_input_halts() {
    let program = build::program([
        build::function(
            "f",
            [build::input("a", None)],
            None,
            build::reference("a"),
        ),
        build::call("f", []),
    ]);
    assert_eq!(kind(&evaluate(program)), Some(ExceptionKind::ValueExpected));
}

#[test]
fn argument_of_wrong_type_halts() {
    let program = build::program([
        build::function(
            "f",
            [build::input("a", Some(build::number_type("")))],
            None,
            build::reference("a"),
        ),
        build::call("f", [build::text("one")]),
    ]);
    assert_eq!(kind(&evaluate(program)), Some(ExceptionKind::TypeMismatch));
}

#[test]
fn evaluating_a_non_function_halts() {
    let program = build::program([
        build::bind("x", build::number(1.0)),
        build::call("x", []),
    ]);
    assert_eq!(kind(&evaluate(program)), Some(ExceptionKind::TypeMismatch));
}

#[test]
fn unbounded_recursion_hits_function_limit() {
    let program = build::program([
        build::function("forever", [], None, build::call("forever", [])),
        build::call("forever", []),
    ]);
    let config = EvalConfig {
        max_depth: 16,
        ..EvalConfig::default()
    };
    let evaluator = evaluator_with(program, config);
    let result = evaluator.result().unwrap();
    assert_eq!(kind(result), Some(ExceptionKind::FunctionLimit));
    assert_eq!(result.as_exception().unwrap().limit, Some(16));
}

#[test]
fn step_limit() {
    let program = build::program([build::binary(
        build::binary(build::number(1.0), BinaryOp::Add, build::number(2.0)),
        BinaryOp::Add,
        build::number(3.0),
    )]);
    let config = EvalConfig {
        max_steps: 5,
        ..EvalConfig::default()
    };
    let evaluator = evaluator_with(program, config);
    assert_eq!(kind(evaluator.result().unwrap()), Some(ExceptionKind::StepLimit));
    assert_eq!(evaluator.step_count(), 6);
}

#[test]
fn structures() {
    let program = build::program([
        build::structure("Point", [build::input("x", None), build::input("y", None)]),
        build::bind(
            "p",
            build::call("Point", [build::number(1.0), build::number(2.0)]),
        ),
        build::property(build::reference("p"), "y"),
    ]);
    assert_eq!(evaluate(program), Value::number(2.0));
}

#[test]
fn missing_property_halts() {
    let program = build::program([
        build::structure("Point", [build::input("x", None)]),
        build::property(build::call("Point", [build::number(1.0)]), "z"),
    ]);
    assert_eq!(kind(&evaluate(program)), Some(ExceptionKind::NameUnbound));
}

#[test]
fn conflicts_do_not_stop_evaluation() {
    let program = build::program([
        build::typed_bind("bignumber", build::number_type(""), build::text("one zillion")),
    ]);
    let evaluator = evaluator(program);
    assert_eq!(evaluator.result(), Some(&Value::None));
    assert_eq!(
        evaluator.conflicts().count(ConflictKind::IncompatibleBind),
        1
    );
}

#[test]
fn borrows_read_supplements() {
    let library = build::program([build::bind("x", build::number(41.0))]);
    let main = build::program_with_borrows(
        [build::borrow("library", Some("x"))],
        [build::binary(build::reference("x"), BinaryOp::Add, build::number(1.0))],
    );
    let project = Project::new(Source::new("main", main))
        .with_supplement(Source::new("library", library));
    let mut evaluator = Evaluator::new(Arc::new(project), EvalConfig::default());
    assert_eq!(evaluator.run(), Some(&Value::number(42.0)));
}

#[test]
fn reads_stream_values() {
    let program = build::program([build::binary(
        build::reference("Time"),
        BinaryOp::Add,
        build::number(1.0),
    )]);
    let mut evaluator = evaluator(program);
    assert_eq!(evaluator.result(), Some(&Value::number(1.0)));

    assert!(tick(&mut evaluator, 5.0));
    assert_eq!(evaluator.result(), Some(&Value::number(6.0)));
    assert_eq!(evaluator.passes().len(), 2);
}

#[test]
fn programs_without_streams_evaluate_once() {
    let program = build::program([build::binary(
        build::number(1.0),
        BinaryOp::Add,
        build::number(1.0),
    )]);
    let mut evaluator = evaluator(program);
    assert!(!tick(&mut evaluator, 5.0));
    assert_eq!(evaluator.passes().len(), 1);
}

#[test]
fn unaffected_nodes_are_reused() {
    let constant = build::binary(build::number(2.0), BinaryOp::Multiply, build::number(3.0));
    let live = build::binary(build::reference("Time"), BinaryOp::Add, build::number(1.0));
    let program = build::program([
        build::bind("a", NodeRef::clone(&constant)),
        build::bind("b", NodeRef::clone(&live)),
        build::binary(build::reference("a"), BinaryOp::Add, build::reference("b")),
    ]);
    let mut evaluator = evaluator(program);
    assert_eq!(evaluator.result(), Some(&Value::number(7.0)));

    assert!(tick(&mut evaluator, 10.0));
    assert!(evaluator.was_reused(constant.id()));
    assert!(!evaluator.was_reused(live.id()));
    assert_eq!(evaluator.value_of(constant.id()), Some(&Value::number(6.0)));
    assert_eq!(evaluator.result(), Some(&Value::number(17.0)));
}

const GATE: StreamId = StreamId::new(2);

/// An evaluator over Time and Gate that has finished its first pass.
fn gated(root: NodeRef, time: f64, gate: f64) -> Evaluator {
    let project = Project::new(Source::new("main", root))
        .with_stream(StreamDeclaration::new(TIME, "Time", Type::unitless()))
        .with_stream(StreamDeclaration::new(GATE, "Gate", Type::unitless()));
    let mut evaluator = Evaluator::new(Arc::new(project), EvalConfig::default());
    evaluator.declare_initial(TIME, Value::number(time)).unwrap();
    evaluator.declare_initial(GATE, Value::number(gate)).unwrap();
    evaluator.run_to_end();
    evaluator
}

fn emit(evaluator: &mut Evaluator, stream: StreamId, value: f64) -> bool {
    evaluator.notify(stream, Value::number(value)).unwrap();
    let began = evaluator.react().unwrap();
    evaluator.run_to_end();
    began
}

fn gate_open() -> NodeRef {
    build::binary(build::reference("Gate"), BinaryOp::Greater, build::number(3.0))
}

#[test]
fn emissions_skipped_by_a_branch_still_invalidate() {
    let doubled = build::binary(build::reference("Time"), BinaryOp::Multiply, build::number(2.0));
    let program = build::program([build::conditional(
        gate_open(),
        NodeRef::clone(&doubled),
        build::number(-1.0),
    )]);
    let mut evaluator = gated(program, 0.0, 5.0);
    assert_eq!(evaluator.result(), Some(&Value::number(0.0)));

    assert!(emit(&mut evaluator, GATE, 0.0));
    assert_eq!(evaluator.result(), Some(&Value::number(-1.0)));
    // Time changes while its branch is not taken.
    assert!(emit(&mut evaluator, TIME, 7.0));
    assert_eq!(evaluator.result(), Some(&Value::number(-1.0)));

    assert!(emit(&mut evaluator, GATE, 5.0));
    assert!(!evaluator.was_reused(doubled.id()));
    assert_eq!(evaluator.result(), Some(&Value::number(14.0)));
}

#[test]
fn reuse_can_be_disabled() {
    let constant = build::binary(build::number(2.0), BinaryOp::Multiply, build::number(3.0));
    let program = build::program([
        build::bind("a", NodeRef::clone(&constant)),
        build::binary(build::reference("a"), BinaryOp::Add, build::reference("Time")),
    ]);
    let config = EvalConfig {
        memoize: false,
        ..EvalConfig::default()
    };
    let mut evaluator = evaluator_with(program, config);
    assert!(tick(&mut evaluator, 1.0));
    assert!(!evaluator.was_reused(constant.id()));
    assert_eq!(evaluator.result(), Some(&Value::number(7.0)));
}

fn counter() -> NodeRef {
    build::program([
        build::bind(
            "count",
            build::reaction(
                build::number(0.0),
                build::changed(build::reference("Time")),
                build::binary(build::reference("count"), BinaryOp::Add, build::number(1.0)),
            ),
        ),
        build::reference("count"),
    ])
}

#[test]
fn reactions_count_changes() {
    let mut evaluator = evaluator(counter());
    assert_eq!(evaluator.result(), Some(&Value::number(0.0)));

    assert!(tick(&mut evaluator, 1.0));
    assert_eq!(evaluator.result(), Some(&Value::number(1.0)));
    assert!(tick(&mut evaluator, 2.0));
    assert_eq!(evaluator.result(), Some(&Value::number(2.0)));
}

#[test]
fn changed_is_true_only_after_an_emission() {
    let program = build::program([build::changed(build::reference("Time"))]);
    let mut evaluator = evaluator(program);
    assert_eq!(evaluator.result(), Some(&Value::Bool(false)));
    assert!(tick(&mut evaluator, 1.0));
    assert_eq!(evaluator.result(), Some(&Value::Bool(true)));
}

#[test]
fn previous_reads_history() {
    let program = build::program([build::previous(build::reference("Time"), None)]);
    let mut evaluator = evaluator(program);
    assert_eq!(evaluator.result(), Some(&Value::None));

    assert!(tick(&mut evaluator, 5.0));
    assert_eq!(evaluator.result(), Some(&Value::number(0.0)));
    assert!(tick(&mut evaluator, 9.0));
    assert_eq!(evaluator.result(), Some(&Value::number(5.0)));
}

#[test]
fn notifications_between_passes_coalesce() {
    let program = build::program([build::reference("Time")]);
    let mut evaluator = evaluator(program);
    evaluator.notify(TIME, Value::number(1.0)).unwrap();
    evaluator.notify(TIME, Value::number(2.0)).unwrap();
    assert!(evaluator.react().unwrap());
    evaluator.run_to_end();

    assert_eq!(evaluator.result(), Some(&Value::number(2.0)));
    assert_eq!(evaluator.passes()[1].drains.len(), 1);
    assert_eq!(evaluator.passes()[1].drains[0].len(), 2);
    assert_eq!(evaluator.stream_state(TIME).unwrap().len(), 2);
}

#[test]
fn replay_and_return() {
    let mut evaluator = evaluator(counter());
    tick(&mut evaluator, 1.0);
    tick(&mut evaluator, 2.0);

    evaluator.replay(0).unwrap();
    assert_eq!(evaluator.viewing(), Some(0));
    assert_eq!(evaluator.result(), Some(&Value::number(0.0)));

    evaluator.replay(1).unwrap();
    assert_eq!(evaluator.result(), Some(&Value::number(1.0)));

    evaluator.return_to_present().unwrap();
    assert_eq!(evaluator.viewing(), None);
    assert_eq!(evaluator.result(), Some(&Value::number(2.0)));

    assert_eq!(
        evaluator.replay(3),
        Err(EngineError::NoSuchPass {
            requested: 3,
            available: 3
        })
    );
}

#[test]
fn notifications_wait_while_in_the_past() {
    let mut evaluator = evaluator(counter());
    tick(&mut evaluator, 1.0);
    evaluator.replay(0).unwrap();

    evaluator.notify(TIME, Value::number(2.0)).unwrap();
    assert_eq!(evaluator.react(), Err(EngineError::InThePast(0)));

    evaluator.return_to_present().unwrap();
    assert!(evaluator.react().unwrap());
    evaluator.run_to_end();
    assert_eq!(evaluator.result(), Some(&Value::number(2.0)));
}

#[test]
fn replay_keeps_drains_that_began_no_pass() {
    let program = build::program([build::conditional(
        gate_open(),
        build::previous(build::reference("Time"), None),
        build::number(0.0),
    )]);
    let mut evaluator = gated(program, 0.0, 0.0);

    // Nothing has read Time yet, so this only extends its history.
    assert!(!emit(&mut evaluator, TIME, 1.0));
    evaluator.notify(TIME, Value::number(2.0)).unwrap();
    assert!(emit(&mut evaluator, GATE, 5.0));
    let live = evaluator.result().cloned();
    assert_eq!(live, Some(Value::number(1.0)));
    assert_eq!(evaluator.passes()[1].drains.len(), 2);

    evaluator.replay(0).unwrap();
    assert_eq!(evaluator.result(), Some(&Value::number(0.0)));
    evaluator.replay(1).unwrap();
    assert_eq!(evaluator.result().cloned(), live);
    assert_eq!(evaluator.stream_state(TIME).unwrap().len(), 3);
}

#[test]
fn stepping_back() {
    let program = build::program([build::binary(
        build::number(1.0),
        BinaryOp::Add,
        build::number(1.0),
    )]);
    let mut evaluator = evaluator(program);
    let steps = evaluator.step_count();
    assert_eq!(steps, 8);

    evaluator.step_back().unwrap();
    assert_eq!(evaluator.step_count(), steps.saturating_sub(1));
    assert!(!evaluator.is_done());
    assert_eq!(evaluator.viewing(), Some(0));
    assert!(matches!(evaluator.current_step(), Some(Step::Finish { .. })));

    assert!(evaluator.step());
    assert!(evaluator.is_done());
    assert_eq!(evaluator.result(), Some(&Value::number(2.0)));

    for _ in 0..steps {
        evaluator.step_back().unwrap();
    }
    assert_eq!(evaluator.step_count(), 0);
    assert_eq!(evaluator.step_back(), Err(EngineError::AtBeginning));
}

#[test]
fn stepping_back_crosses_passes() {
    let mut evaluator = evaluator(counter());
    evaluator.notify(TIME, Value::number(1.0)).unwrap();
    assert!(evaluator.react().unwrap());
    assert_eq!(evaluator.step_count(), 0);

    evaluator.step_back().unwrap();
    assert_eq!(evaluator.viewing(), Some(0));
    assert!(evaluator.is_done());
    assert_eq!(evaluator.result(), Some(&Value::number(0.0)));
}

#[test]
fn evaluation_is_deterministic() {
    let program = counter();
    let run = || {
        let mut evaluator = Evaluator::new(project(NodeRef::clone(&program)), EvalConfig::default());
        evaluator.declare_initial(TIME, Value::number(0.0)).unwrap();
        evaluator.run_to_end();
        for value in [3.0, 4.0, 5.0] {
            tick(&mut evaluator, value);
        }
        (
            evaluator.result().cloned(),
            evaluator.conflicts().kinds(),
            evaluator.step_count(),
        )
    };
    assert_eq!(run(), run());
}

#[test]
fn unknown_streams_are_rejected() {
    let mut evaluator = evaluator(build::program([]));
    let unknown = StreamId::new(99);
    assert_eq!(
        evaluator.declare_initial(unknown, Value::None),
        Err(EngineError::UnknownStream(unknown))
    );
    assert!(evaluator.sink(unknown).is_err());
}
