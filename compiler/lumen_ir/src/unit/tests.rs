use super::*;
use pretty_assertions::assert_eq;

#[test]
fn parse_and_display_agree() {
    for text in ["m", "m·kg/s^2", "/s", "kg·m", "m^3"] {
        assert_eq!(Unit::parse(text).to_string(), text, "display of {text}");
    }
}

#[test]
fn factor_order_is_canonical() {
    assert_eq!(Unit::parse("m·kg"), Unit::parse("kg·m"));
    assert_eq!(Unit::parse("m·kg").to_string(), "kg·m");
}

#[test]
fn empty_text_is_unitless() {
    assert!(Unit::parse("").is_unitless());
    assert!(Unit::base("").is_unitless());
    assert_eq!(Unit::unitless().to_string(), "");
}

#[test]
fn product_and_quotient_cancel() {
    let m = Unit::base("m");
    let s = Unit::base("s");
    let speed = m.quotient(&s);
    assert_eq!(speed.to_string(), "m/s");
    assert_eq!(speed.product(&s), m);
    assert!(speed.quotient(&speed).is_unitless());
}

#[test]
fn power_scales_exponents() {
    let m = Unit::base("m");
    assert_eq!(m.power(2), Unit::parse("m^2"));
    assert!(m.power(0).is_unitless());
    assert_eq!(Unit::parse("m/s").power(2).to_string(), "m^2/s^2");
}
