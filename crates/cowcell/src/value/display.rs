//! Debug implementation for Value

use std::fmt;

use super::*;

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write_value(f, self, &mut Vec::new())
    }
}

/// Write a value, printing `<cycle>` for a composite already on the path.
fn write_value(f: &mut fmt::Formatter<'_>, value: &Value, path: &mut Vec<usize>) -> fmt::Result {
    match value {
        Value::Unit => write!(f, "()"),
        Value::Bool(b) => write!(f, "{}", b),
        Value::Int(n) => write!(f, "{}", n),
        Value::Float(n) => write!(f, "{:?}", n),
        Value::String(s) => write!(f, "{:?}", s.as_ref()),
        Value::Function(func) => write!(f, "{:?}", func),
        Value::Opaque(handle) => write!(f, "{:?}", handle),

        Value::List(list) => {
            if path.contains(&list.id()) {
                return write!(f, "<cycle>");
            }
            path.push(list.id());
            write!(f, "[")?;
            for (i, item) in list.snapshot().iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write_value(f, item, path)?;
            }
            path.pop();
            write!(f, "]")
        }

        Value::Object(object) => {
            if path.contains(&object.id()) {
                return write!(f, "<cycle>");
            }
            path.push(object.id());
            write!(f, "{} {{", object.class_name())?;
            // Only enumerable data members; accessors are not evaluated
            let mut first = true;
            for (key, property) in object.own_properties() {
                if !property.enumerable {
                    continue;
                }
                write!(f, "{}", if first { " " } else { ", " })?;
                first = false;
                match &key {
                    PropertyKey::Name(name) => write!(f, "{}: ", name)?,
                    PropertyKey::Symbol(symbol) => write!(f, "[{}]: ", symbol)?,
                }
                match &property.slot {
                    Slot::Data(value) => write_value(f, value, path)?,
                    Slot::Accessor(_) => write!(f, "<accessor>")?,
                }
            }
            path.pop();
            write!(f, "{}}}", if first { "" } else { " " })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_debug_object() {
        let value = Object::new("Point")
            .with_field("x", 1)
            .with_field("y", 2)
            .into_value();
        assert_eq!(format!("{:?}", value), "Point { x: 1, y: 2 }");
    }

    #[test]
    fn test_debug_empty_object() {
        assert_eq!(format!("{:?}", Object::new("Empty").into_value()), "Empty {}");
    }

    #[test]
    fn test_debug_cycle() {
        let node = Object::new("Node").into_ref();
        node.set(&"next".into(), Value::Object(node.clone())).unwrap();
        assert_eq!(format!("{:?}", node), "Node { next: <cycle> }");
    }

    #[test]
    fn test_debug_list() {
        let value = Value::list(vec![Value::Int(1), Value::string("a")]);
        assert_eq!(format!("{:?}", value), "[1, \"a\"]");
    }
}
