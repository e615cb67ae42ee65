//! Member classification tests

use std::cell::Cell;
use std::rc::Rc;

use cowcell::*;
use pretty_assertions::assert_eq;

fn three_level_chain() -> ObjectRef {
    let grandparent = Object::new("Shape")
        .with_getter("area", |_| Ok(Value::Int(0)))
        .with_method("describe", |_, _| Ok(Value::from("shape")))
        .into_ref();
    let parent = Object::new("Polygon")
        .with_prototype(grandparent)
        .with_field("sides", 0)
        .into_ref();
    Object::new("Square")
        .with_prototype(parent)
        .with_field("side", 2)
        .into_ref()
}

#[test]
fn test_accessor_found_two_levels_up() {
    let square = three_level_chain();
    assert!(is_accessor(&square, &"area".into()));
    assert_eq!(classify(&square, &"area".into()), MemberKind::Accessor);
}

#[test]
fn test_inherited_method_and_field() {
    let square = three_level_chain();
    assert_eq!(classify(&square, &"describe".into()), MemberKind::Method);
    assert_eq!(classify(&square, &"sides".into()), MemberKind::Field);
    assert_eq!(classify(&square, &"side".into()), MemberKind::Field);
}

#[test]
fn test_missing_key_is_not_accessor() {
    let square = three_level_chain();
    assert_eq!(classify(&square, &"volume".into()), MemberKind::Missing);
    assert!(!is_accessor(&square, &"volume".into()));
}

#[test]
fn test_nearest_definition_wins() {
    let proto = Object::new("Base")
        .with_field("label", "plain")
        .into_ref();
    let derived = Object::new("Derived")
        .with_prototype(proto)
        .with_getter("label", |_| Ok(Value::from("computed")))
        .into_ref();
    assert!(is_accessor(&derived, &"label".into()));
}

#[test]
fn test_symbol_keyed_accessor() {
    let size = Symbol::for_key("size");
    let object = Object::new("Sized")
        .with_getter(&size, |_| Ok(Value::Int(3)))
        .into_ref();
    assert!(is_accessor(&object, &Symbol::for_key("size").into()));
    assert!(!is_accessor(&object, &"size".into()));
}

#[test]
fn test_setter_only_accessor_counts() {
    let object = Object::new("Sink").into_ref();
    let sink: Setter = Rc::new(|_: &ObjectRef, _: Value| -> Result<()> { Ok(()) });
    object.define_property("input", Property::accessor(None, Some(sink)));
    assert!(is_accessor(&object, &"input".into()));
    assert_eq!(object.get(&"input".into()).unwrap(), Value::Unit);
}

#[test]
fn test_classification_never_runs_getters() {
    let runs = Rc::new(Cell::new(0));
    let seen = runs.clone();
    let object = Object::new("Lazy")
        .with_getter("value", move |_| {
            seen.set(seen.get() + 1);
            Ok(Value::Int(1))
        })
        .into_ref();

    classify(&object, &"value".into());
    is_accessor(&object, &"value".into());

    assert_eq!(runs.get(), 0);
}
