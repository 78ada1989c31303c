use super::*;
use crate::{Source, StreamDeclaration, StreamSource};
use lumen_ir::build::*;
use lumen_ir::{BinaryOp, Name, NodeKind, Unit};
use pretty_assertions::assert_eq;

fn analyze(root: NodeRef) -> Context {
    Context::new(Arc::new(Project::new(Source::new("main", root))))
}

fn with_time(root: NodeRef) -> Context {
    let project = Project::new(Source::new("main", root)).with_stream(StreamDeclaration::new(
        StreamId::new(7),
        "Time",
        Type::Number(Unit::base("ms")),
    ));
    Context::new(Arc::new(project))
}

#[test]
fn literal_types() {
    let ctx = analyze(program([]));
    assert_eq!(ctx.type_of(&boolean(true)), Type::Bool);
    assert_eq!(ctx.type_of(&measure(2.0, "m")), Type::Number(Unit::base("m")));
    assert_eq!(ctx.type_of(&text("hi")), Type::Text);
    assert_eq!(ctx.type_of(&none()), Type::None);
}

#[test]
fn one_plus_one_is_a_number() {
    let sum = binary(number(1.0), BinaryOp::Add, number(1.0));
    let root = program([sum.clone()]);
    let ctx = analyze(root.clone());
    assert_eq!(ctx.type_of(&sum), Type::unitless());
    assert_eq!(ctx.type_of(&root), Type::unitless());
}

#[test]
fn units_combine_through_multiplication_and_division() {
    let area = binary(measure(2.0, "m"), BinaryOp::Multiply, measure(3.0, "m"));
    let speed = binary(measure(2.0, "m"), BinaryOp::Divide, measure(3.0, "s"));
    let cube = binary(measure(2.0, "m"), BinaryOp::Power, number(3.0));
    let ctx = analyze(program([area.clone(), speed.clone(), cube.clone()]));
    assert_eq!(ctx.type_of(&area), Type::Number(Unit::parse("m^2")));
    assert_eq!(ctx.type_of(&speed), Type::Number(Unit::parse("m/s")));
    assert_eq!(ctx.type_of(&cube), Type::Number(Unit::parse("m^3")));
}

#[test]
fn comparisons_are_boolean() {
    let less = binary(number(1.0), BinaryOp::Less, number(2.0));
    let equal = binary(text("a"), BinaryOp::Equal, number(2.0));
    let ctx = analyze(program([less.clone(), equal.clone()]));
    assert_eq!(ctx.type_of(&less), Type::Bool);
    assert_eq!(ctx.type_of(&equal), Type::Bool);
}

#[test]
fn program_ending_in_bind_is_none() {
    let root = program([bind("a", number(1.0))]);
    let ctx = analyze(root.clone());
    assert_eq!(ctx.type_of(&root), Type::None);
}

#[test]
fn containers() {
    let items = list([number(1.0), text("a")]);
    let empty = set([]);
    let pairs = map([key_value(text("a"), number(1.0))]);
    let access = list_access(list([text("a")]), number(1.0));
    let ctx = analyze(program([
        items.clone(),
        empty.clone(),
        pairs.clone(),
        access.clone(),
    ]));
    assert_eq!(
        ctx.type_of(&items),
        Type::list(Type::union(Type::unitless(), Type::Text))
    );
    assert_eq!(ctx.type_of(&empty), Type::set(Type::Any));
    assert_eq!(ctx.type_of(&pairs), Type::map(Type::Text, Type::unitless()));
    assert_eq!(ctx.type_of(&access), Type::union(Type::Text, Type::None));
}

#[test]
fn references_use_declared_type_over_value() {
    let declared = reference("a");
    let inferred = reference("b");
    let ctx = analyze(program([
        typed_bind("a", number_type("m"), measure(1.0, "m")),
        bind("b", text("x")),
        declared.clone(),
        inferred.clone(),
    ]));
    assert_eq!(ctx.type_of(&declared), Type::Number(Unit::base("m")));
    assert_eq!(ctx.type_of(&inferred), Type::Text);
}

#[test]
fn nearest_preceding_definition_wins() {
    let first = bind("a", number(1.0));
    let second = bind("a", text("x"));
    let early = reference("a");
    let late = reference("a");
    let ctx = analyze(program([first.clone(), early.clone(), second.clone(), late.clone()]));
    assert_eq!(ctx.resolve(&early).and_then(|d| d.node().map(|n| n.id())), Some(first.id()));
    assert_eq!(ctx.resolve(&late).and_then(|d| d.node().map(|n| n.id())), Some(second.id()));
}

#[test]
fn later_definitions_are_still_visible() {
    let early = reference("later");
    let ctx = analyze(program([early.clone(), bind("later", number(1.0))]));
    assert!(matches!(ctx.resolve(&early), Some(Definition::Bind(_))));
}

#[test]
fn unresolved_name_is_unknown() {
    let missing = reference("nope");
    let ctx = analyze(program([missing.clone()]));
    assert!(ctx.resolve(&missing).is_none());
    match ctx.type_of(&missing) {
        Type::Unknown(unknown) => assert_eq!(unknown.reason, UnknownReason::UnknownName),
        other => panic!("expected unknown, got {other}"),
    }
}

#[test]
fn self_referencing_bind_is_a_cycle() {
    let inner = reference("a");
    let root = program([bind("a", binary(inner.clone(), BinaryOp::Add, number(1.0)))]);
    let ctx = analyze(root);
    assert!(ctx.is_reference_cycle(&inner));
    match ctx.type_of(&inner) {
        Type::Unknown(unknown) => assert_eq!(unknown.reason, UnknownReason::Cycle),
        other => panic!("expected unknown, got {other}"),
    }
}

#[test]
fn recursive_function_terminates() {
    let n = || reference("n");
    let body = conditional(
        binary(n(), BinaryOp::Equal, number(0.0)),
        number(0.0),
        call("f", [binary(n(), BinaryOp::Subtract, number(1.0))]),
    );
    let f = function("f", [input("n", Some(number_type("")))], None, body);
    let ctx = analyze(program([f.clone(), call("f", [number(3.0)])]));
    match ctx.type_of(&f) {
        Type::Function(signature) => {
            assert_eq!(signature.inputs.len(), 1);
            assert!(signature.output.contains_unknown());
        }
        other => panic!("expected a function, got {other}"),
    }
}

#[test]
fn functions_and_calls() {
    let f = function(
        "double",
        [input("x", Some(number_type("")))],
        None,
        binary(reference("x"), BinaryOp::Multiply, number(2.0)),
    );
    let call_site = call("double", [number(4.0)]);
    let ctx = analyze(program([f, call_site.clone()]));
    assert_eq!(ctx.type_of(&call_site), Type::unitless());
}

#[test]
fn structures_and_properties() {
    let point = structure(
        "Point",
        [
            input("x", Some(number_type("m"))),
            input_with_default("label", None, text("origin")),
        ],
    );
    let made = call("Point", [measure(1.0, "m")]);
    let x = property(reference("p"), "x");
    let label = property(reference("p"), "label");
    let missing = property(reference("p"), "z");
    let ctx = analyze(program([
        point.clone(),
        bind("p", made.clone()),
        x.clone(),
        label.clone(),
        missing.clone(),
    ]));
    assert_eq!(
        ctx.type_of(&made),
        Type::Structure {
            definition: point.id(),
            name: Name::intern("Point")
        }
    );
    assert_eq!(ctx.type_of(&x), Type::Number(Unit::base("m")));
    assert_eq!(ctx.type_of(&label), Type::Text);
    assert!(ctx.type_of(&missing).is_unknown());

    let Type::Function(signature) = ctx.type_of(&point) else {
        panic!("structure definitions are constructors");
    };
    assert_eq!(signature.required(), 1);
}

#[test]
fn is_narrows_conditional_branches() {
    let yes = reference("x");
    let no = reference("x");
    let root = program([
        typed_bind(
            "x",
            union_type(number_type(""), text_type()),
            number(1.0),
        ),
        conditional(is(reference("x"), number_type("")), yes.clone(), no.clone()),
    ]);
    let ctx = analyze(root);
    assert_eq!(ctx.type_of(&yes), Type::unitless());
    assert_eq!(ctx.type_of(&no), Type::Text);
}

#[test]
fn stream_references_have_the_stream_value_type() {
    let time = reference("Time");
    let ctx = with_time(program([time.clone()]));
    assert!(matches!(ctx.resolve(&time), Some(Definition::Stream(_))));
    assert_eq!(ctx.type_of(&time), Type::Number(Unit::base("ms")));
    assert_eq!(
        ctx.stream_source(&time),
        Some(StreamSource::External(StreamId::new(7)))
    );
}

#[test]
fn reaction_reads_its_own_latest_value() {
    let own = reference("count");
    let counter = reaction(
        number(0.0),
        changed(reference("Time")),
        binary(own.clone(), BinaryOp::Add, number(1.0)),
    );
    let count = bind("count", counter.clone());
    let ctx = with_time(program([count.clone(), reference("count")]));
    match ctx.resolve(&own) {
        Some(Definition::ReactionValue { bind, reaction }) => {
            assert_eq!(bind.id(), count.id());
            assert_eq!(reaction.id(), counter.id());
        }
        other => panic!("expected the reaction's value, got {other:?}"),
    }
    assert!(!ctx.is_reference_cycle(&own));
    assert_eq!(ctx.type_of(&counter), Type::unitless());
}

#[test]
fn previous_is_optional_stream_value() {
    let before = previous(reference("Time"), None);
    let ctx = with_time(program([before.clone()]));
    assert_eq!(
        ctx.type_of(&before),
        Type::union(Type::Number(Unit::base("ms")), Type::None)
    );
}

#[test]
fn borrows_see_other_sources() {
    let pi = reference("pi");
    let whole = reference("lib");
    let main = program_with_borrows(
        [borrow("lib", Some("pi")), borrow("lib", None)],
        [pi.clone(), whole.clone()],
    );
    let lib = program([bind("pi", measure(3.0, "rad")), text("library")]);
    let project =
        Project::new(Source::new("main", main)).with_supplement(Source::new("lib", lib));
    let ctx = Context::new(Arc::new(project));
    assert_eq!(ctx.type_of(&pi), Type::Number(Unit::base("rad")));
    assert_eq!(ctx.type_of(&whole), Type::Text);
}

#[test]
fn types_are_memoized() {
    let sum = binary(number(1.0), BinaryOp::Add, number(2.0));
    let ctx = analyze(program([sum.clone()]));
    let first = ctx.type_of(&sum);
    assert_eq!(ctx.type_of(&sum), first);
    assert!(matches!(sum.kind(), NodeKind::BinaryOperation { .. }));
}
