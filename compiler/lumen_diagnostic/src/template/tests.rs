use super::*;
use pretty_assertions::assert_eq;

#[test]
fn key_formatter_without_args() {
    assert_eq!(Template::new("conflict.placeholder").render(&KeyFormatter), "conflict.placeholder");
}

#[test]
fn key_formatter_with_args() {
    let template = Template::new("conflict.incompatible-bind")
        .arg(Name::intern("bignumber"))
        .ty("#")
        .ty("\"\"")
        .text("one zillion")
        .arg(2.5);
    assert_eq!(
        template.render(&KeyFormatter),
        "conflict.incompatible-bind(bignumber, #, \"\", \"one zillion\", 2.5)"
    );
}

#[test]
fn closures_are_formatters() {
    let shout = |template: &Template| template.key.to_uppercase();
    assert_eq!(Template::new("halt").render(&shout), "HALT");
}
