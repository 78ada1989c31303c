use super::*;
use crate::build::*;
use pretty_assertions::assert_eq;

#[test]
fn children_follow_evaluation_order() {
    let left = number(1.0);
    let right = number(2.0);
    let sum = binary(left.clone(), BinaryOp::Add, right.clone());
    let ids: Vec<_> = sum.children().iter().map(|c| c.id()).collect();
    assert_eq!(ids, vec![left.id(), right.id()]);
}

#[test]
fn bind_children_skip_missing_parts() {
    let required = input("x", None);
    assert!(required.children().is_empty());
    let typed = typed_bind("x", number_type(""), number(1.0));
    assert_eq!(typed.children().len(), 2);
}

#[test]
fn fresh_nodes_get_distinct_ids() {
    assert_ne!(number(1.0).id(), number(1.0).id());
}

#[test]
fn replace_rebuilds_only_the_path() {
    let untouched = list([number(1.0), number(2.0)]);
    let target = number(3.0);
    let sum = binary(target.clone(), BinaryOp::Add, number(4.0));
    let root = program([bind("a", untouched.clone()), sum.clone()]);

    let replacement = number(30.0);
    let new_root = Node::replace(&root, target.id(), &replacement);

    assert_ne!(new_root.id(), root.id());
    assert!(new_root.contains(replacement.id()));
    assert!(!new_root.contains(target.id()));
    assert!(!new_root.contains(sum.id()));
    // The unaffected subtree is shared, not copied.
    assert!(new_root.contains(untouched.id()));
    // The old tree is unchanged.
    assert!(root.contains(target.id()));
    assert_eq!(root.size(), new_root.size());
}

#[test]
fn replace_missing_node_returns_same_root() {
    let root = program([number(1.0)]);
    let stranger = number(2.0);
    let same = Node::replace(&root, stranger.id(), &number(3.0));
    assert!(Arc::ptr_eq(&root, &same));
}

#[test]
fn replace_root_returns_replacement() {
    let root = number(1.0);
    let replacement = number(2.0);
    let new_root = Node::replace(&root, root.id(), &replacement);
    assert!(Arc::ptr_eq(&new_root, &replacement));
}

#[test]
fn defines_name_covers_binds_definitions_and_borrows() {
    assert_eq!(bind("a", none()).defines_name(), Some(Name::intern("a")));
    assert_eq!(
        function("f", [], None, none()).defines_name(),
        Some(Name::intern("f"))
    );
    assert_eq!(
        borrow("lib", Some("pi")).defines_name(),
        Some(Name::intern("pi"))
    );
    assert_eq!(borrow("lib", None).defines_name(), Some(Name::intern("lib")));
    assert_eq!(number(1.0).defines_name(), None);
}

#[test]
fn classification() {
    assert!(number(1.0).is_literal());
    assert!(!list([]).is_literal());
    assert!(list_type(None).is_type());
    assert!(!reference("x").is_type());
    assert_eq!(placeholder().label(), "Placeholder");
}
