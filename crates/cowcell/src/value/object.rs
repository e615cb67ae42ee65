//! Objects: ordered own members, accessors, and a prototype chain

use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use super::{CloneHook, Getter, NativeFn, PropertyKey, Setter, Value};
use crate::depth::CloneDepth;
use crate::error::{CowError, Result};

/// Accessor pair: either half may be absent.
#[derive(Clone, Default)]
pub struct Accessor {
    /// Computed read
    pub get: Option<Getter>,

    /// Computed write
    pub set: Option<Setter>,
}

/// Storage of a member: a plain value or an accessor.
#[derive(Clone)]
pub enum Slot {
    /// Stored value
    Data(Value),

    /// Computed member; reading it runs code
    Accessor(Accessor),
}

/// An own member together with its attributes.
#[derive(Clone)]
pub struct Property {
    /// What the member holds
    pub slot: Slot,

    /// Whether the member shows up in enumeration
    pub enumerable: bool,

    /// Whether a data member may be reassigned
    pub writable: bool,
}

impl Property {
    /// A plain, enumerable, writable data member
    pub fn data(value: Value) -> Self {
        Self {
            slot: Slot::Data(value),
            enumerable: true,
            writable: true,
        }
    }

    /// A non-enumerable, writable data member (methods are stored this way)
    pub fn hidden(value: Value) -> Self {
        Self {
            enumerable: false,
            ..Self::data(value)
        }
    }

    /// An accessor member
    pub fn accessor(get: Option<Getter>, set: Option<Setter>) -> Self {
        Self {
            slot: Slot::Accessor(Accessor { get, set }),
            enumerable: false,
            writable: true,
        }
    }

    /// Check whether reading this member runs a getter
    pub fn is_accessor(&self) -> bool {
        matches!(self.slot, Slot::Accessor(_))
    }

    /// The stored value, if this is a data member
    pub fn value(&self) -> Option<&Value> {
        match &self.slot {
            Slot::Data(value) => Some(value),
            Slot::Accessor(_) => None,
        }
    }
}

/// An object instance.
///
/// Own members keep insertion order. Lookups that miss fall through to
/// the prototype, which is shared and never copied along with the object.
#[derive(Clone)]
pub struct Object {
    /// The object's class name (e.g., "Counter"), for display
    pub class_name: String,

    /// Own members in definition order
    pub properties: IndexMap<PropertyKey, Property>,

    /// Next object on the delegation chain
    pub prototype: Option<ObjectRef>,

    /// Type-supplied clone capability
    pub clone_hook: Option<CloneHook>,
}

impl Object {
    /// Create an empty object
    pub fn new(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            properties: IndexMap::new(),
            prototype: None,
            clone_hook: None,
        }
    }

    /// An empty object of the same class, prototype and clone hook
    pub fn shell_of(source: &Object) -> Self {
        Self {
            class_name: source.class_name.clone(),
            properties: IndexMap::with_capacity(source.properties.len()),
            prototype: source.prototype.clone(),
            clone_hook: source.clone_hook.clone(),
        }
    }

    /// Add a data member (builder pattern)
    pub fn with_field(mut self, key: impl Into<PropertyKey>, value: impl Into<Value>) -> Self {
        let property = Property::data(value.into());
        self.properties.insert(key.into(), property);
        self
    }

    /// Add a non-enumerable data member (builder pattern)
    pub fn with_hidden_field(
        mut self,
        key: impl Into<PropertyKey>,
        value: impl Into<Value>,
    ) -> Self {
        let property = Property::hidden(value.into());
        self.properties.insert(key.into(), property);
        self
    }

    /// Add a read-only data member (builder pattern)
    pub fn with_constant(mut self, key: impl Into<PropertyKey>, value: impl Into<Value>) -> Self {
        let property = Property {
            writable: false,
            ..Property::data(value.into())
        };
        self.properties.insert(key.into(), property);
        self
    }

    /// Add a method (builder pattern)
    pub fn with_method(
        mut self,
        name: &str,
        func: impl Fn(&Value, &[Value]) -> Result<Value> + 'static,
    ) -> Self {
        let method = Value::Function(NativeFn::new(name, func));
        self.properties.insert(name.into(), Property::hidden(method));
        self
    }

    /// Add a getter-only accessor (builder pattern)
    pub fn with_getter(
        self,
        key: impl Into<PropertyKey>,
        get: impl Fn(&ObjectRef) -> Result<Value> + 'static,
    ) -> Self {
        self.with_accessor_parts(key, Some(Rc::new(get)), None)
    }

    /// Add a getter/setter accessor (builder pattern)
    pub fn with_accessor(
        self,
        key: impl Into<PropertyKey>,
        get: impl Fn(&ObjectRef) -> Result<Value> + 'static,
        set: impl Fn(&ObjectRef, Value) -> Result<()> + 'static,
    ) -> Self {
        self.with_accessor_parts(key, Some(Rc::new(get)), Some(Rc::new(set)))
    }

    fn with_accessor_parts(
        mut self,
        key: impl Into<PropertyKey>,
        get: Option<Getter>,
        set: Option<Setter>,
    ) -> Self {
        let property = Property::accessor(get, set);
        self.properties.insert(key.into(), property);
        self
    }

    /// Set the prototype (builder pattern)
    pub fn with_prototype(mut self, prototype: ObjectRef) -> Self {
        self.prototype = Some(prototype);
        self
    }

    /// Install a clone hook (builder pattern)
    pub fn with_clone_hook(
        mut self,
        hook: impl Fn(&ObjectRef, CloneDepth) -> Result<ObjectRef> + 'static,
    ) -> Self {
        self.clone_hook = Some(Rc::new(hook));
        self
    }

    /// Move the object behind a shared handle
    pub fn into_ref(self) -> ObjectRef {
        ObjectRef::new(self)
    }

    /// Move the object behind a shared handle, as a value
    pub fn into_value(self) -> Value {
        Value::Object(self.into_ref())
    }
}

/// Shared handle to an object.
///
/// Every method that can run user code (getters, setters, methods) releases
/// its borrow of the object first, so user code may freely touch the
/// object again.
#[derive(Clone)]
pub struct ObjectRef(Rc<RefCell<Object>>);

impl ObjectRef {
    /// Move `object` behind a new handle
    pub fn new(object: Object) -> Self {
        Self(Rc::new(RefCell::new(object)))
    }

    /// Check whether two handles point at the same object.
    pub fn ptr_eq(&self, other: &ObjectRef) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }

    /// Identity of the underlying object, stable while it is alive.
    pub fn id(&self) -> usize {
        Rc::as_ptr(&self.0) as *const () as usize
    }

    /// The object's class name
    pub fn class_name(&self) -> String {
        self.0.borrow().class_name.clone()
    }

    /// The next object on the delegation chain
    pub fn prototype(&self) -> Option<ObjectRef> {
        self.0.borrow().prototype.clone()
    }

    /// The object's own clone hook
    pub fn clone_hook(&self) -> Option<CloneHook> {
        self.0.borrow().clone_hook.clone()
    }

    /// A copy of the object record itself (members are shared, not copied)
    pub fn to_object(&self) -> Object {
        self.0.borrow().clone()
    }

    /// An empty object of the same class, prototype and clone hook
    pub fn shell(&self) -> Object {
        Object::shell_of(&self.0.borrow())
    }

    // ═══════════════════════════════════════════════════════════════════
    // Own Members
    // ═══════════════════════════════════════════════════════════════════

    /// Own member by key, without consulting the prototype
    pub fn get_own_property(&self, key: &PropertyKey) -> Option<Property> {
        self.0.borrow().properties.get(key).cloned()
    }

    /// Keys of all own members, enumerable or not, in definition order
    pub fn own_keys(&self) -> Vec<PropertyKey> {
        self.0.borrow().properties.keys().cloned().collect()
    }

    /// All own members, enumerable or not, in definition order
    pub fn own_properties(&self) -> Vec<(PropertyKey, Property)> {
        self.0
            .borrow()
            .properties
            .iter()
            .map(|(k, p)| (k.clone(), p.clone()))
            .collect()
    }

    /// Keys of own enumerable members
    pub fn keys(&self) -> Vec<PropertyKey> {
        self.0
            .borrow()
            .properties
            .iter()
            .filter(|(_, p)| p.enumerable)
            .map(|(k, _)| k.clone())
            .collect()
    }

    /// Define or replace an own member, attributes included
    pub fn define_property(&self, key: impl Into<PropertyKey>, property: Property) {
        self.0.borrow_mut().properties.insert(key.into(), property);
    }

    /// Remove an own member. Returns whether it existed.
    pub fn delete(&self, key: &PropertyKey) -> bool {
        self.0.borrow_mut().properties.shift_remove(key).is_some()
    }

    // ═══════════════════════════════════════════════════════════════════
    // Lookup Through the Prototype Chain
    // ═══════════════════════════════════════════════════════════════════

    /// Find a member on this object or its prototypes
    pub fn find_property(&self, key: &PropertyKey) -> Option<Property> {
        let mut current = Some(self.clone());
        while let Some(object) = current {
            if let Some(property) = object.get_own_property(key) {
                return Some(property);
            }
            current = object.prototype();
        }
        None
    }

    /// Check if a member exists on this object or its prototypes
    pub fn has(&self, key: &PropertyKey) -> bool {
        self.find_property(key).is_some()
    }

    /// Read a member. Getters run with this object as receiver; missing
    /// members read as `Value::Unit`.
    pub fn get(&self, key: &PropertyKey) -> Result<Value> {
        match self.find_property(key).map(|p| p.slot) {
            Some(Slot::Data(value)) => Ok(value),
            Some(Slot::Accessor(Accessor { get: Some(get), .. })) => get(self),
            Some(Slot::Accessor(Accessor { get: None, .. })) | None => Ok(Value::Unit),
        }
    }

    /// Write a member.
    ///
    /// A setter found anywhere on the chain runs with this object as
    /// receiver. Otherwise the value lands in an own data member, unless
    /// the member found is read-only.
    ///
    /// # Errors
    ///
    /// - `ReadOnly` for non-writable data members and getter-only accessors
    /// - whatever a setter returns
    pub fn set(&self, key: &PropertyKey, value: Value) -> Result<()> {
        match self.find_property(key) {
            Some(Property {
                slot: Slot::Accessor(Accessor { set: Some(set), .. }),
                ..
            }) => set(self, value),
            Some(Property {
                slot: Slot::Accessor(_),
                ..
            })
            | Some(Property {
                writable: false, ..
            }) => Err(CowError::ReadOnly { key: key.clone() }),
            _ => {
                let mut object = self.0.borrow_mut();
                match object.properties.get_mut(key) {
                    Some(property) => property.slot = Slot::Data(value),
                    None => {
                        object.properties.insert(key.clone(), Property::data(value));
                    }
                }
                Ok(())
            }
        }
    }

    /// Invoke a method with this object as receiver.
    ///
    /// # Errors
    ///
    /// - `MissingMember` if nothing on the chain has the key
    /// - `NotCallable` if the member is not a function
    /// - whatever the method returns
    pub fn call_method(&self, key: &PropertyKey, args: &[Value]) -> Result<Value> {
        if !self.has(key) {
            return Err(CowError::MissingMember { key: key.clone() });
        }
        match self.get(key)? {
            Value::Function(func) => func.call(&Value::Object(self.clone()), args),
            _ => Err(CowError::NotCallable { key: key.clone() }),
        }
    }
}

impl std::fmt::Debug for ObjectRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", Value::Object(self.clone()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_creates_own_data_member() {
        let obj = Object::new("Point").into_ref();
        obj.set(&"x".into(), Value::Int(1)).unwrap();
        assert_eq!(obj.get(&"x".into()).unwrap(), Value::Int(1));
        assert_eq!(obj.own_keys(), vec![PropertyKey::from("x")]);
    }

    #[test]
    fn test_get_falls_through_to_prototype() {
        let proto = Object::new("Base").with_field("kind", "base").into_ref();
        let obj = Object::new("Derived").with_prototype(proto).into_ref();
        assert_eq!(obj.get(&"kind".into()).unwrap(), Value::from("base"));
        assert!(obj.get_own_property(&"kind".into()).is_none());
    }

    #[test]
    fn test_set_shadows_prototype_data() {
        let proto = Object::new("Base").with_field("kind", "base").into_ref();
        let obj = Object::new("Derived")
            .with_prototype(proto.clone())
            .into_ref();
        obj.set(&"kind".into(), Value::from("own")).unwrap();
        assert_eq!(obj.get(&"kind".into()).unwrap(), Value::from("own"));
        assert_eq!(proto.get(&"kind".into()).unwrap(), Value::from("base"));
    }

    #[test]
    fn test_constant_rejects_write() {
        let obj = Object::new("Config").with_constant("id", 7).into_ref();
        let err = obj.set(&"id".into(), Value::Int(8)).unwrap_err();
        assert!(matches!(err, CowError::ReadOnly { .. }));
    }

    #[test]
    fn test_getter_only_accessor_rejects_write() {
        let obj = Object::new("Clock")
            .with_getter("now", |_| Ok(Value::Int(0)))
            .into_ref();
        assert!(obj.set(&"now".into(), Value::Int(1)).is_err());
    }

    #[test]
    fn test_call_method_missing_and_not_callable() {
        let obj = Object::new("Thing").with_field("x", 1).into_ref();
        assert!(matches!(
            obj.call_method(&"nope".into(), &[]),
            Err(CowError::MissingMember { .. })
        ));
        assert!(matches!(
            obj.call_method(&"x".into(), &[]),
            Err(CowError::NotCallable { .. })
        ));
    }

    #[test]
    fn test_keys_skip_hidden_members() {
        let obj = Object::new("Counter")
            .with_field("number", 0)
            .with_method("noop", |_, _| Ok(Value::Unit))
            .into_ref();
        assert_eq!(obj.keys(), vec![PropertyKey::from("number")]);
        assert_eq!(obj.own_keys().len(), 2);
    }
}
