//! Member classification along the prototype chain

use crate::value::{ObjectRef, PropertyKey, Slot, Value};

/// What kind of member a key resolves to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberKind {
    /// Computed member; reading it runs a getter
    Accessor,

    /// Stored function
    Method,

    /// Stored non-function value
    Field,

    /// Nothing on the chain has the key
    Missing,
}

/// Check whether reading `key` on `object` runs a getter.
///
/// The first object on the chain that owns `key` decides; a key no object
/// owns is not an accessor.
pub fn is_accessor(object: &ObjectRef, key: &PropertyKey) -> bool {
    classify(object, key) == MemberKind::Accessor
}

/// Classify `key` on `object`, searching up the prototype chain.
///
/// Never runs a getter.
pub fn classify(object: &ObjectRef, key: &PropertyKey) -> MemberKind {
    let mut current = Some(object.clone());
    while let Some(candidate) = current {
        if let Some(property) = candidate.get_own_property(key) {
            return match property.slot {
                Slot::Accessor(_) => MemberKind::Accessor,
                Slot::Data(Value::Function(_)) => MemberKind::Method,
                Slot::Data(_) => MemberKind::Field,
            };
        }
        current = candidate.prototype();
    }
    MemberKind::Missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::value::Object;

    #[test]
    fn test_classify_own_members() {
        let obj = Object::new("Thing")
            .with_field("x", 1)
            .with_method("run", |_, _| Ok(Value::Unit))
            .with_getter("total", |_| Ok(Value::Int(0)))
            .into_ref();
        assert_eq!(classify(&obj, &"x".into()), MemberKind::Field);
        assert_eq!(classify(&obj, &"run".into()), MemberKind::Method);
        assert_eq!(classify(&obj, &"total".into()), MemberKind::Accessor);
        assert_eq!(classify(&obj, &"nope".into()), MemberKind::Missing);
    }

    #[test]
    fn test_own_member_shadows_prototype_accessor() {
        let proto = Object::new("Base")
            .with_getter("size", |_| Ok(Value::Int(1)))
            .into_ref();
        let obj = Object::new("Derived")
            .with_prototype(proto)
            .with_field("size", 2)
            .into_ref();
        assert!(!is_accessor(&obj, &"size".into()));
    }
}
