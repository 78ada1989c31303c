use super::*;

#[test]
fn interning_is_idempotent() {
    let a = Name::intern("velocity");
    let b = Name::intern("velocity");
    assert_eq!(a, b);
    assert_eq!(a.as_str(), "velocity");
}

#[test]
fn distinct_text_gives_distinct_names() {
    assert_ne!(Name::intern("left"), Name::intern("right"));
}

#[test]
fn empty_name_is_preinterned() {
    assert_eq!(Name::intern(""), Name::EMPTY);
    assert!(Name::EMPTY.is_empty());
    assert_eq!(Name::EMPTY.as_str(), "");
}

#[test]
fn ordering_follows_text_not_interning_order() {
    let late = Name::intern("zz-interned-first");
    let early = Name::intern("aa-interned-second");
    assert!(early < late);
}

#[test]
fn display_and_debug() {
    let name = Name::intern("mic");
    assert_eq!(name.to_string(), "mic");
    assert_eq!(format!("{name:?}"), "Name(\"mic\")");
}
