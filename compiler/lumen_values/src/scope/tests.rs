use super::*;
use lumen_ir::StreamId;
use pretty_assertions::assert_eq;

fn binding(n: f64) -> Binding {
    Binding::new(Value::number(n), Dependencies::new())
}

#[test]
fn lookup_walks_parents() {
    let root = Scope::root();
    root.write().define(Name::intern("a"), binding(1.0));
    let child = Scope::child(&root);
    child.write().define(Name::intern("b"), binding(2.0));

    let a = Scope::lookup(&child, Name::intern("a")).map(|b| b.value);
    let b = Scope::lookup(&child, Name::intern("b")).map(|b| b.value);
    assert_eq!(a, Some(Value::number(1.0)));
    assert_eq!(b, Some(Value::number(2.0)));
    assert!(Scope::lookup(&root, Name::intern("b")).is_none());
}

#[test]
fn inner_binding_shadows_outer() {
    let root = Scope::root();
    root.write().define(Name::intern("x"), binding(1.0));
    let child = Scope::child(&root);
    child.write().define(Name::intern("x"), binding(2.0));
    let x = Scope::lookup(&child, Name::intern("x")).map(|b| b.value);
    assert_eq!(x, Some(Value::number(2.0)));
}

#[test]
fn later_definitions_are_visible_through_shared_scope() {
    let root = Scope::root();
    let captured = Arc::clone(&root);
    root.write().define(Name::intern("late"), binding(3.0));
    assert!(Scope::lookup(&captured, Name::intern("late")).is_some());
    root.write().clear();
    assert!(Scope::lookup(&captured, Name::intern("late")).is_none());
}

#[test]
fn dependencies_stay_sorted_and_unique() {
    let a = StreamSource::External(StreamId::new(2));
    let b = StreamSource::External(StreamId::new(1));
    let mut deps = Dependencies::on_stream(a);
    deps.add_stream(b);
    deps.add_stream(a);
    assert_eq!(deps.streams(), &[b, a]);
    assert!(!deps.is_volatile());

    let mut other = Dependencies::new();
    other.mark_volatile();
    deps.merge(&other);
    assert!(deps.is_volatile());

    let mut changed = FxHashSet::default();
    assert!(!deps.intersects(&changed));
    changed.insert(b);
    assert!(deps.intersects(&changed));
}
