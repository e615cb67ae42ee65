//! Member keys: names and symbols

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, OnceLock};

use dashmap::DashMap;

static NEXT_SYMBOL_ID: AtomicU64 = AtomicU64::new(1);

static REGISTRY: OnceLock<DashMap<String, Symbol>> = OnceLock::new();

/// A unique, non-string member key.
///
/// Two symbols are equal only if they come from the same `Symbol::new`
/// call, regardless of description. `Symbol::for_key` hands out one shared
/// symbol per registry key.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Symbol {
    id: u64,
    description: Arc<str>,
}

impl Symbol {
    /// Create a fresh symbol, distinct from every other symbol.
    pub fn new(description: impl AsRef<str>) -> Self {
        Self {
            id: NEXT_SYMBOL_ID.fetch_add(1, Ordering::Relaxed),
            description: Arc::from(description.as_ref()),
        }
    }

    /// Get the symbol registered under `key`, creating it on first use.
    pub fn for_key(key: &str) -> Self {
        let registry = REGISTRY.get_or_init(DashMap::new);
        registry
            .entry(key.to_string())
            .or_insert_with(|| Symbol::new(key))
            .clone()
    }

    /// The symbol's description (not part of its identity).
    pub fn description(&self) -> &str {
        &self.description
    }
}

impl fmt::Display for Symbol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Symbol({})", self.description)
    }
}

/// Key of an object member.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PropertyKey {
    /// A named member: `counter.number`
    Name(String),

    /// A symbol-keyed member
    Symbol(Symbol),
}

impl PropertyKey {
    /// The member name, if this is a named key.
    pub fn as_name(&self) -> Option<&str> {
        match self {
            PropertyKey::Name(name) => Some(name),
            PropertyKey::Symbol(_) => None,
        }
    }
}

impl fmt::Display for PropertyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PropertyKey::Name(name) => write!(f, "`{}`", name),
            PropertyKey::Symbol(symbol) => write!(f, "{}", symbol),
        }
    }
}

impl From<&str> for PropertyKey {
    fn from(name: &str) -> Self {
        PropertyKey::Name(name.to_string())
    }
}

impl From<String> for PropertyKey {
    fn from(name: String) -> Self {
        PropertyKey::Name(name)
    }
}

impl From<&String> for PropertyKey {
    fn from(name: &String) -> Self {
        PropertyKey::Name(name.clone())
    }
}

impl From<Symbol> for PropertyKey {
    fn from(symbol: Symbol) -> Self {
        PropertyKey::Symbol(symbol)
    }
}

impl From<&Symbol> for PropertyKey {
    fn from(symbol: &Symbol) -> Self {
        PropertyKey::Symbol(symbol.clone())
    }
}

impl From<&PropertyKey> for PropertyKey {
    fn from(key: &PropertyKey) -> Self {
        key.clone()
    }
}
