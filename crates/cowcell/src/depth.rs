//! Clone depth: a non-negative bound or "unbounded"

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, Sub};

use serde::{Deserialize, Serialize};

/// How many levels below the root a structural clone copies.
///
/// `Bounded(0)` is a shallow copy: the root's own members are copied and
/// nested composites are shared. Arithmetic saturates at zero and leaves
/// `Unbounded` unchanged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "DepthRepr", into = "DepthRepr")]
pub enum CloneDepth {
    /// Copy this many levels below the root, share beyond
    Bounded(usize),

    /// Copy everything reachable
    #[default]
    Unbounded,
}

impl CloneDepth {
    /// Root-only copy
    pub const SHALLOW: CloneDepth = CloneDepth::Bounded(0);

    /// A bounded depth
    pub fn bounded(levels: usize) -> Self {
        CloneDepth::Bounded(levels)
    }

    /// A bounded depth from a signed count; negatives clamp to zero.
    pub fn from_signed(levels: i64) -> Self {
        CloneDepth::Bounded(levels.max(0) as usize)
    }

    /// Check for the unbounded marker
    pub fn is_unbounded(&self) -> bool {
        matches!(self, CloneDepth::Unbounded)
    }

    /// Check whether no further levels may be copied
    pub fn is_exhausted(&self) -> bool {
        matches!(self, CloneDepth::Bounded(0))
    }

    /// Remaining levels, `None` when unbounded
    pub fn remaining(&self) -> Option<usize> {
        match self {
            CloneDepth::Bounded(levels) => Some(*levels),
            CloneDepth::Unbounded => None,
        }
    }

    /// One level less, never below zero
    pub fn decrement(self) -> Self {
        self - 1
    }

    /// One level more
    pub fn increment(self) -> Self {
        self + 1
    }
}

impl Add<usize> for CloneDepth {
    type Output = CloneDepth;

    fn add(self, rhs: usize) -> Self::Output {
        match self {
            CloneDepth::Bounded(levels) => CloneDepth::Bounded(levels.saturating_add(rhs)),
            CloneDepth::Unbounded => CloneDepth::Unbounded,
        }
    }
}

impl Sub<usize> for CloneDepth {
    type Output = CloneDepth;

    fn sub(self, rhs: usize) -> Self::Output {
        match self {
            CloneDepth::Bounded(levels) => CloneDepth::Bounded(levels.saturating_sub(rhs)),
            CloneDepth::Unbounded => CloneDepth::Unbounded,
        }
    }
}

impl Ord for CloneDepth {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (CloneDepth::Bounded(a), CloneDepth::Bounded(b)) => a.cmp(b),
            (CloneDepth::Bounded(_), CloneDepth::Unbounded) => Ordering::Less,
            (CloneDepth::Unbounded, CloneDepth::Bounded(_)) => Ordering::Greater,
            (CloneDepth::Unbounded, CloneDepth::Unbounded) => Ordering::Equal,
        }
    }
}

impl PartialOrd for CloneDepth {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl From<usize> for CloneDepth {
    fn from(levels: usize) -> Self {
        CloneDepth::Bounded(levels)
    }
}

impl From<Option<usize>> for CloneDepth {
    fn from(levels: Option<usize>) -> Self {
        levels.map_or(CloneDepth::Unbounded, CloneDepth::Bounded)
    }
}

impl fmt::Display for CloneDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CloneDepth::Bounded(levels) => write!(f, "{}", levels),
            CloneDepth::Unbounded => write!(f, "unbounded"),
        }
    }
}

/// Serialized form: an integer or the string `"unbounded"`.
#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum DepthRepr {
    Levels(i64),
    Marker(String),
}

impl TryFrom<DepthRepr> for CloneDepth {
    type Error = String;

    fn try_from(repr: DepthRepr) -> Result<Self, Self::Error> {
        match repr {
            DepthRepr::Levels(levels) => Ok(CloneDepth::from_signed(levels)),
            DepthRepr::Marker(marker) if marker.eq_ignore_ascii_case("unbounded") => {
                Ok(CloneDepth::Unbounded)
            }
            DepthRepr::Marker(other) => Err(format!(
                "invalid clone depth {:?}: expected an integer or \"unbounded\"",
                other
            )),
        }
    }
}

impl From<CloneDepth> for DepthRepr {
    fn from(depth: CloneDepth) -> Self {
        match depth {
            CloneDepth::Bounded(levels) => {
                DepthRepr::Levels(i64::try_from(levels).unwrap_or(i64::MAX))
            }
            CloneDepth::Unbounded => DepthRepr::Marker("unbounded".to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decrement_saturates_at_zero() {
        assert_eq!(CloneDepth::SHALLOW.decrement(), CloneDepth::SHALLOW);
        assert_eq!(CloneDepth::bounded(2) - 5, CloneDepth::SHALLOW);
    }

    #[test]
    fn test_unbounded_absorbs_arithmetic() {
        assert_eq!(CloneDepth::Unbounded.decrement(), CloneDepth::Unbounded);
        assert_eq!(CloneDepth::Unbounded + 3, CloneDepth::Unbounded);
    }

    #[test]
    fn test_negative_clamps() {
        assert_eq!(CloneDepth::from_signed(-4), CloneDepth::SHALLOW);
    }

    #[test]
    fn test_ordering() {
        assert!(CloneDepth::bounded(1) < CloneDepth::bounded(2));
        assert!(CloneDepth::bounded(usize::MAX) < CloneDepth::Unbounded);
    }

    #[test]
    fn test_default_is_unbounded() {
        assert!(CloneDepth::default().is_unbounded());
    }
}
