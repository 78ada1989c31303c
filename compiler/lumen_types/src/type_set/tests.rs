use super::*;
use pretty_assertions::assert_eq;

#[test]
fn flattens_nested_unions() {
    let ty = Type::Union(
        Box::new(Type::Text),
        Box::new(Type::Union(Box::new(Type::None), Box::new(Type::Text))),
    );
    let set = TypeSet::of(&ty);
    assert_eq!(set.len(), 2);
    assert_eq!(set.iter().cloned().collect::<Vec<_>>(), vec![Type::Text, Type::None]);
}

#[test]
fn difference_removes_accepted_members() {
    let set = TypeSet::of(&Type::union(Type::Text, Type::None));
    assert_eq!(set.difference(&Type::None).to_type(), Type::Text);
    assert_eq!(set.difference(&Type::Bool), set);
}

#[test]
fn empty_set_is_unreachable() {
    let set = TypeSet::of(&Type::Text).difference(&Type::Any);
    assert!(set.is_empty());
    match set.to_type() {
        Type::Unknown(unknown) => assert_eq!(unknown.reason, UnknownReason::Unreachable),
        other => panic!("expected unknown, got {other}"),
    }
}

#[test]
fn reduced_keeps_most_general_member() {
    let mut set = TypeSet::of(&Type::list(Type::Text));
    set.add(&Type::list(Type::Any));
    set.add(&Type::Bool);
    // Each list type accepts the other; the first one wins.
    assert_eq!(
        set.reduced().to_type(),
        Type::union(Type::list(Type::Text), Type::Bool)
    );
}
