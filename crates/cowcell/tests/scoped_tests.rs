//! One-shot clone-mutate-return tests

use cowcell::*;
use pretty_assertions::assert_eq;

fn profile() -> Value {
    let address = Object::new("Address").with_field("city", "Oslo");
    Object::new("Profile")
        .with_field("name", "kari")
        .with_field("address", address)
        .into_value()
}

fn city_of(profile: &Value) -> Value {
    let profile = profile.expect_object().unwrap();
    let address = profile.get(&"address".into()).unwrap();
    address.expect_object().unwrap().get(&"city".into()).unwrap()
}

#[test]
fn test_nested_change_stays_in_the_copy() {
    let original = profile();

    let moved = immutable_mut(
        &original,
        |copy| {
            let address = copy.expect_object()?.get(&"address".into())?;
            address.expect_object()?.set(&"city".into(), Value::from("Bergen"))
        },
        true,
    )
    .unwrap();

    assert_eq!(city_of(&moved), Value::from("Bergen"));
    assert_eq!(city_of(&original), Value::from("Oslo"));
    assert!(!moved.same(&original));
}

#[test]
fn test_callback_error_propagates() {
    let original = profile();

    let err = immutable_mut(
        &original,
        |copy| {
            copy.expect_object()?.set(&"name".into(), Value::from("ola"))?;
            Err(CowError::thrown("rejected"))
        },
        true,
    )
    .unwrap_err();

    assert!(matches!(err, CowError::Thrown(v) if v == Value::from("rejected")));
    let name = original.expect_object().unwrap().get(&"name".into()).unwrap();
    assert_eq!(name, Value::from("kari"));
}

#[test]
fn test_list_values() {
    let original = Value::list(vec![Value::Int(1), Value::Int(2)]);

    let moved = immutable_mut(
        &original,
        |copy| {
            copy.as_list().unwrap().push(Value::Int(3));
            Ok(())
        },
        true,
    )
    .unwrap();

    assert_eq!(moved.as_list().unwrap().len(), 3);
    assert_eq!(original.as_list().unwrap().len(), 2);
}

#[test]
fn test_respect_custom_selects_hook() {
    let original = Object::new("Ticket")
        .with_field("stamped", false)
        .with_clone_hook(|this, depth| {
            let copy = clone_object(this, depth, false)?;
            copy.set(&"stamped".into(), Value::Bool(true))?;
            Ok(copy)
        })
        .into_value();
    let stamped = |value: &Value| {
        value
            .expect_object()
            .unwrap()
            .get(&"stamped".into())
            .unwrap()
    };

    let with_hook = immutable_mut(&original, |_| Ok(()), true).unwrap();
    let without_hook = immutable_mut(&original, |_| Ok(()), false).unwrap();

    assert_eq!(stamped(&with_hook), Value::Bool(true));
    assert_eq!(stamped(&without_hook), Value::Bool(false));
}

#[test]
fn test_unclonable_value_fails_before_callback() {
    let original = Value::Opaque(OpaqueHandle::new("FileHandle", 3_i32));
    let mut called = false;

    let err = immutable_mut(
        &original,
        |_| {
            called = true;
            Ok(())
        },
        true,
    )
    .unwrap_err();

    assert!(matches!(err, CowError::Unclonable { .. }));
    assert!(!called);
}

// ═══════════════════════════════════════════════════════════════════════
// Typed Values
// ═══════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
struct Inventory {
    items: Vec<String>,
    revision: u32,
}

impl CustomClone for Inventory {
    fn clone_with_depth(&self, _depth: CloneDepth) -> Result<Self> {
        Ok(Inventory {
            revision: self.revision + 1,
            ..self.clone()
        })
    }
}

#[test]
fn test_typed_mutate_returns_changed_copy() {
    let original = Inventory {
        items: vec!["rope".to_string()],
        revision: 0,
    };

    let moved = immutable_mut_typed(
        &original,
        |copy| {
            copy.items.push("lamp".to_string());
            Ok(())
        },
        true,
    )
    .unwrap();

    assert_eq!(moved.items, vec!["rope", "lamp"]);
    assert_eq!(moved.revision, 1);
    assert_eq!(original.items, vec!["rope"]);
}

#[test]
fn test_typed_mutate_without_hook() {
    let original = Inventory {
        items: Vec::new(),
        revision: 0,
    };

    let moved = immutable_mut_typed(&original, |_| Ok(()), false).unwrap();

    assert_eq!(moved, original);
}
