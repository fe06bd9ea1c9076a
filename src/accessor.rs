//! Interval-comparison policies
//!
//! An [`Accessor`] decides what "contains" and "intersects" mean for a
//! [`KeyRange`]: the range itself is just an ordered pair of keys, and the
//! policy supplies the openness of each boundary. The policy set is a small
//! closed family of stateless strategy structs rather than an open trait
//! object hierarchy; each index binds one policy at construction time.

use crate::range::KeyRange;

/// Pluggable interval semantics over an externally ordered key type.
///
/// Implementations are pure: no state, no failure modes, safe to share
/// across threads. Malformed ranges (`start > end`) never reach these
/// methods; backends reject them at insert time.
///
/// The boundary-only variants (`contains_bounds`, `intersects_bounds`) let
/// backends test raw keys pulled out of node storage before materializing a
/// full `KeyRange`.
pub trait Accessor<K: Ord>: Clone {
    /// Lower boundary of a range.
    fn start<'a>(&self, range: &'a KeyRange<K>) -> &'a K {
        &range.start
    }

    /// Upper boundary of a range.
    fn end<'a>(&self, range: &'a KeyRange<K>) -> &'a K {
        &range.end
    }

    /// Whether the interval delimited by `start` and `end` contains `key`.
    fn contains_bounds(&self, start: &K, end: &K, key: &K) -> bool;

    /// Whether `range` contains `key`.
    fn contains(&self, range: &KeyRange<K>, key: &K) -> bool {
        self.contains_bounds(&range.start, &range.end, key)
    }

    /// Whether `range` intersects the interval delimited by `start` and `end`.
    fn intersects_bounds(&self, range: &KeyRange<K>, start: &K, end: &K) -> bool;

    /// Whether two ranges intersect.
    fn intersects(&self, left: &KeyRange<K>, right: &KeyRange<K>) -> bool {
        self.intersects_bounds(left, &right.start, &right.end)
    }
}

/// Start-open, end-closed policy: a range is `(start, end]`.
///
/// Containment is `start < key <= end`. Two ranges intersect only on a
/// genuine overlap; a shared endpoint is not enough, since one side holds it
/// exclusively.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EndInclusive;

impl<K: Ord> Accessor<K> for EndInclusive {
    fn contains_bounds(&self, start: &K, end: &K, key: &K) -> bool {
        start < key && key <= end
    }

    fn intersects_bounds(&self, range: &KeyRange<K>, start: &K, end: &K) -> bool {
        range.start < *end && *start < range.end
    }
}

/// Closed-closed policy: a range is `[start, end]`.
///
/// Containment is `start <= key <= end`, and ranges that merely touch at a
/// shared endpoint count as intersecting. The adjacency rule is deliberate
/// (ring-topology callers rely on it) and covered by its own tests; do not
/// "fix" it to match `EndInclusive`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AllInclusive;

impl<K: Ord> Accessor<K> for AllInclusive {
    fn contains_bounds(&self, start: &K, end: &K, key: &K) -> bool {
        start <= key && key <= end
    }

    fn intersects_bounds(&self, range: &KeyRange<K>, start: &K, end: &K) -> bool {
        range.start <= *end && *start <= range.end
    }
}
