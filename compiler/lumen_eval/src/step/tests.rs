use super::*;
use lumen_diagnostic::KeyFormatter;
use lumen_ir::build;
use pretty_assertions::assert_eq;

#[test]
fn explanations_start_with_the_node() {
    let node = build::number(1.0);
    let step = Step::Literal {
        node: NodeRef::clone(&node),
        value: Value::number(1.0),
    };
    let rendered = step.explanation().render(&KeyFormatter);
    assert_eq!(rendered, format!("step.literal({}, \"1\")", node.id()));
}

#[test]
fn jumps_explain_their_offset() {
    let node = build::conditional(build::boolean(true), build::number(1.0), build::number(2.0));
    let step = Step::JumpIfFalse { node, offset: 2 };
    assert!(step.explanation().render(&KeyFormatter).ends_with(", 2)"));
    assert_eq!(step.to_string(), "jump if false +2");
}

#[test]
fn halts_name_their_exception() {
    let node = build::placeholder();
    let step = Step::Halt {
        node: NodeRef::clone(&node),
        exception: Exception::placeholder(node.id()),
    };
    assert_eq!(step.key(), "step.halt");
    assert_eq!(step.node().id(), node.id());
    assert!(step.explanation().render(&KeyFormatter).contains("exception.placeholder"));
}
