use super::*;
use lumen_diagnostic::KeyFormatter;
use lumen_ir::build;

#[test]
fn kinds_map_to_runtime_codes() {
    let kinds = [
        ExceptionKind::NameUnbound,
        ExceptionKind::TypeMismatch,
        ExceptionKind::StepLimit,
        ExceptionKind::FunctionLimit,
        ExceptionKind::Cycle,
        ExceptionKind::Placeholder,
        ExceptionKind::Unparsable,
        ExceptionKind::ValueExpected,
    ];
    for kind in kinds {
        assert!(kind.error_code().is_runtime(), "{kind}");
    }
}

#[test]
fn name_unbound_carries_the_name() {
    let node = build::reference("missing");
    let exception = Exception::name_unbound(node.id(), Name::intern("missing"));
    assert_eq!(exception.kind, ExceptionKind::NameUnbound);
    assert_eq!(exception.name, Some(Name::intern("missing")));

    let diagnostic = exception.to_diagnostic(&KeyFormatter);
    assert_eq!(diagnostic.code, ErrorCode::E6001);
    assert_eq!(diagnostic.primary_node(), Some(node.id()));
    assert!(diagnostic.message.starts_with("exception.name-unbound("));
    assert!(diagnostic.message.contains("missing"));
}

#[test]
fn type_mismatch_renders_both_types() {
    let node = build::number(1.0);
    let exception = Exception::type_mismatch(node.id(), Type::Text, Type::unitless());
    let message = exception.template().render(&KeyFormatter);
    assert!(message.contains("\"\""));
    assert!(message.contains('#'));
}

#[test]
fn limits_are_recorded() {
    let node = build::number(1.0);
    let exception = Exception::step_limit(node.id(), 10);
    assert_eq!(exception.limit, Some(10));
    assert_eq!(exception.to_string(), "!exception.step-limit");
}
