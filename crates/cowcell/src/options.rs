//! Wrapping policy configuration

use indexmap::IndexSet;
use serde::{Deserialize, Serialize};

use crate::depth::CloneDepth;

/// Member name that is never treated as mutating.
///
/// Reading the clone-producing member must not itself produce a clone.
pub const CLONE_MEMBER: &str = "clone";

/// Policy a reference cell starts out with.
///
/// Every field can still be changed on the live cell afterwards.
///
/// ```
/// use cowcell::{CloneDepth, WrapOptions};
///
/// let options = WrapOptions::new()
///     .with_depth(CloneDepth::bounded(1))
///     .with_non_mutating_key("double");
///
/// assert!(options.non_mutating_keys.contains("double"));
/// assert!(options.respect_custom);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct WrapOptions {
    /// Structural clone depth used on every triggered clone
    pub depth: CloneDepth,

    /// Members whose reads and calls never trigger a clone
    pub non_mutating_keys: IndexSet<String>,

    /// Whether a type-supplied clone hook is honored
    pub respect_custom: bool,
}

impl Default for WrapOptions {
    fn default() -> Self {
        Self {
            depth: CloneDepth::Unbounded,
            non_mutating_keys: IndexSet::new(),
            respect_custom: true,
        }
    }
}

impl WrapOptions {
    /// Create options with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the clone depth (builder pattern)
    pub fn with_depth(mut self, depth: impl Into<CloneDepth>) -> Self {
        self.depth = depth.into();
        self
    }

    /// Exempt a member from cloning (builder pattern)
    pub fn with_non_mutating_key(mut self, key: impl Into<String>) -> Self {
        self.non_mutating_keys.insert(key.into());
        self
    }

    /// Exempt several members from cloning (builder pattern)
    pub fn with_non_mutating_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let keys = keys.into_iter().map(Into::into);
        self.non_mutating_keys.extend(keys);
        self
    }

    /// Honor or ignore type-supplied clone hooks (builder pattern)
    pub fn with_respect_custom(mut self, respect_custom: bool) -> Self {
        self.respect_custom = respect_custom;
        self
    }
}
