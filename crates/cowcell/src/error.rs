//! Error types for copy-on-write operations

use thiserror::Error;

use crate::value::{PropertyKey, Value};

/// Main error type for cowcell operations.
///
/// Errors raised by clone hooks, accessors, methods and setters are
/// propagated to the caller of the triggering access exactly as they
/// were returned; the engine never wraps or retries them.
#[derive(Error, Debug)]
pub enum CowError {
    /// A user operation raised a value
    #[error("Uncaught value: {0:?}")]
    Thrown(Value),

    /// Type mismatch error
    #[error("Type error: expected {expected}, got {got}")]
    TypeError {
        /// Expected type
        expected: String,
        /// Actual type received
        got: String,
    },

    /// A member was invoked but does not hold a function
    #[error("Member {key} is not callable")]
    NotCallable {
        /// The member that was invoked
        key: PropertyKey,
    },

    /// A member lookup failed along the whole prototype chain
    #[error("Member {key} not found")]
    MissingMember {
        /// The member that was looked up
        key: PropertyKey,
    },

    /// Assignment to a non-writable data member or a getter-only accessor
    #[error("Cannot assign to read-only member {key}")]
    ReadOnly {
        /// The member that was assigned
        key: PropertyKey,
    },

    /// The structural copy met a value it cannot reproduce
    #[error("Cannot structurally clone value of type {type_name}")]
    Unclonable {
        /// Type of the offending value
        type_name: String,
    },

    /// A typed value was accessed while a conflicting borrow was live
    #[error("Value is already borrowed")]
    AlreadyBorrowed,

    /// Host failure raised from inside a hook, accessor or method
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl CowError {
    /// Raise an arbitrary value, the way a script would `throw` it.
    pub fn thrown(value: impl Into<Value>) -> Self {
        CowError::Thrown(value.into())
    }

    /// Build a type error from the expected type and the offending value.
    pub fn type_error(expected: impl Into<String>, got: &Value) -> Self {
        CowError::TypeError {
            expected: expected.into(),
            got: type_name(got).to_string(),
        }
    }
}

/// Result type alias for cowcell operations
pub type Result<T> = std::result::Result<T, CowError>;

/// Get a human-readable type name for a value.
pub fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Unit => "()",
        Value::Bool(_) => "bool",
        Value::Int(_) => "int",
        Value::Float(_) => "float",
        Value::String(_) => "string",
        Value::List(_) => "list",
        Value::Object(_) => "object",
        Value::Function(_) => "function",
        Value::Opaque(_) => "opaque",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_error_message() {
        let err = CowError::type_error("object", &Value::Int(3));
        assert_eq!(err.to_string(), "Type error: expected object, got int");
    }

    #[test]
    fn test_other_is_transparent() {
        let err: CowError = anyhow::anyhow!("disk on fire").into();
        assert_eq!(err.to_string(), "disk on fire");
    }
}
