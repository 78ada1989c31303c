use super::*;
use pretty_assertions::assert_eq;

fn numbers(values: &[f64]) -> ListValue {
    ListValue::new(values.iter().copied().map(Value::number).collect())
}

#[test]
fn indexing_starts_at_one() {
    let list = numbers(&[10.0, 20.0, 30.0]);
    assert_eq!(list.get(1.0), Some(&Value::number(10.0)));
    assert_eq!(list.get(3.0), Some(&Value::number(30.0)));
    assert_eq!(list.get(-1.0), Some(&Value::number(30.0)));
    assert_eq!(list.get(-3.0), Some(&Value::number(10.0)));
    assert_eq!(list.get(0.0), None);
    assert_eq!(list.get(4.0), None);
    assert_eq!(list.get(-4.0), None);
    assert_eq!(list.get(1.5), None);
}

#[test]
fn updates_leave_the_original_alone() {
    let list = numbers(&[1.0, 2.0, 3.0]);
    assert_eq!(list.replace(2.0, Value::number(9.0)).items(), numbers(&[1.0, 9.0, 3.0]).items());
    assert_eq!(list.replace(7.0, Value::number(9.0)).items(), list.items());
    assert_eq!(list.sans_first().items(), numbers(&[2.0, 3.0]).items());
    assert_eq!(list.sans_last().items(), numbers(&[1.0, 2.0]).items());
    assert_eq!(list.reverse().items(), numbers(&[3.0, 2.0, 1.0]).items());
    assert_eq!(list.append(&numbers(&[4.0])).len(), 4);
    assert_eq!(list.items(), numbers(&[1.0, 2.0, 3.0]).items());
}

#[test]
fn removal() {
    let list = numbers(&[1.0, 2.0, 1.0]);
    assert_eq!(list.sans(&Value::number(1.0)).items(), numbers(&[2.0, 1.0]).items());
    assert_eq!(list.sans_all(&Value::number(1.0)).items(), numbers(&[2.0]).items());
    assert!(list.has(&Value::number(2.0)));
    assert!(!list.has(&Value::number(5.0)));
    assert!(ListValue::default().sans_last().is_empty());
}

#[test]
fn join_uses_raw_text() {
    let list = ListValue::new(vec![Value::text("a"), Value::number(1.0), Value::text("b")]);
    assert_eq!(list.join(","), "a,1,b");
}
