use super::*;
use lumen_ir::build::*;
use pretty_assertions::assert_eq;

fn source(name: &str, borrows: &[&str]) -> Source {
    Source::new(
        name,
        program_with_borrows(
            borrows.iter().map(|source| borrow(source, None)),
            [number(1.0)],
        ),
    )
}

#[test]
fn nodes_map_back_to_their_source() {
    let pi = number(2.5);
    let project = Project::new(source("main", &[]))
        .with_supplement(Source::new("lib", program([bind("pi", pi.clone())])));
    assert_eq!(
        project.source_of(pi.id()).map(Source::name),
        Some(Name::intern("lib"))
    );
    assert!(project.get(pi.id()).is_some());
}

#[test]
fn top_level_finds_definitions() {
    let lib = Source::new("lib", program([bind("pi", number(2.5)), number(1.0)]));
    assert!(lib.top_level(Name::intern("pi")).is_some());
    assert!(lib.top_level(Name::intern("tau")).is_none());
}

#[test]
fn dependencies_come_first() {
    let project = Project::new(source("main", &["b"]))
        .with_supplement(source("a", &[]))
        .with_supplement(source("b", &["a"]));
    let order = project.evaluation_order();
    assert_eq!(order.order, vec![1, 2, 0]);
    assert!(order.cyclic.is_empty());
}

#[test]
fn cycles_are_reported() {
    let project = Project::new(source("main", &["a"]))
        .with_supplement(source("a", &["b"]))
        .with_supplement(source("b", &["a"]));
    let order = project.evaluation_order();
    assert!(order.cyclic.contains(&Name::intern("a")));
    assert!(order.cyclic.contains(&Name::intern("b")));
    assert!(!order.cyclic.contains(&Name::intern("main")));
    assert_eq!(order.order.last(), Some(&0));
    assert_eq!(order.order.len(), 3);
}

#[test]
fn with_main_keeps_supplements_and_streams() {
    let project = Project::new(source("main", &[]))
        .with_supplement(source("lib", &[]))
        .with_stream(StreamDeclaration::new(StreamId::new(1), "Time", Type::unitless()));
    let replaced = project.with_main(program([text("new")]));
    assert_eq!(replaced.main().name(), Name::intern("main"));
    assert_eq!(replaced.supplements().len(), 1);
    assert!(replaced.stream(Name::intern("Time")).is_some());
}
