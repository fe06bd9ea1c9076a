//! Core data types shared across index backends
//!
//! This module contains the fundamental data structures used throughout the
//! crate: the key range, the stored entry, and the backend contract every
//! index implementation satisfies.

use std::fmt;

use crate::Error;

/// An ordered pair of keys delimiting a range.
///
/// A `KeyRange` carries no inclusivity of its own: whether the boundaries are
/// open or closed is decided by the [`Accessor`](crate::Accessor) policy the
/// index was built with. The same range behaves differently under
/// [`EndInclusive`](crate::EndInclusive) and
/// [`AllInclusive`](crate::AllInclusive).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct KeyRange<K> {
    /// Lower boundary of the range
    pub start: K,
    /// Upper boundary of the range
    pub end: K,
}

impl<K> KeyRange<K> {
    /// Create a range from its two boundaries.
    ///
    /// No ordering check happens here; backends validate on
    /// [`RangeIndex::add`] and reject ranges whose start compares greater
    /// than their end.
    pub fn new(start: K, end: K) -> Self {
        Self { start, end }
    }
}

impl<K: Clone> KeyRange<K> {
    /// Create the degenerate single-point range `(k, k)`.
    ///
    /// Legal everywhere a range is: `AllInclusive` reads it as the closed
    /// singleton `[k, k]`, `EndInclusive` as the empty interval `(k, k]`.
    pub fn point(key: K) -> Self {
        Self {
            start: key.clone(),
            end: key,
        }
    }
}

impl<K: Ord + fmt::Debug> KeyRange<K> {
    /// Reject ranges whose start compares greater than their end.
    ///
    /// Equal boundaries pass: a point range is legal. The range is never
    /// silently reordered.
    pub fn validate(&self) -> Result<(), Error> {
        if self.start > self.end {
            return Err(Error::InvalidRange {
                start: format!("{:?}", self.start),
                end: format!("{:?}", self.end),
            });
        }
        Ok(())
    }
}

impl<K: fmt::Debug> fmt::Display for KeyRange<K> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({:?}, {:?})", self.start, self.end)
    }
}

/// A stored `(range, value)` pair.
///
/// Entries are never deduplicated by range alone; identity is the whole
/// pair, and multiple entries may share one range with different values.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serialization", derive(serde::Serialize, serde::Deserialize))]
pub struct Entry<K, V> {
    /// The indexed range
    pub range: KeyRange<K>,
    /// The value stored under that range
    pub value: V,
}

impl<K, V> Entry<K, V> {
    /// Create a new entry.
    pub fn new(range: KeyRange<K>, value: V) -> Self {
        Self { range, value }
    }
}

/// Contract satisfied by every index backend.
///
/// The external key ordering is the caller's `Ord` impl on `K`; the interval
/// inclusivity policy is the [`Accessor`](crate::Accessor) the backend was
/// constructed with, fixed for its whole lifetime so entries written under
/// one policy can never be queried under another.
///
/// The intended discipline is write-then-freeze: bulk inserts, one `done()`
/// call, then read-only use. Query methods take `&self`, so a finalized
/// index is safe to share across threads; interleaving further writes with
/// reads is the caller's synchronization problem, not this crate's.
pub trait RangeIndex<K: Ord, V> {
    /// Insert one `(range, value)` entry.
    ///
    /// Returns [`Error::InvalidRange`] when `range.start > range.end`, and
    /// [`Error::Finalized`] on bulk-built backends after [`done`](Self::done).
    fn add(&mut self, range: KeyRange<K>, value: V) -> Result<(), Error>;

    /// Every entry whose range contains `token` under the active policy.
    ///
    /// Result order is unspecified; callers must not depend on it. An empty
    /// or non-matching index yields an empty list, never an error.
    fn search_token(&self, token: &K) -> Vec<Entry<K, V>>;

    /// Every entry whose range intersects `probe` under the active policy.
    ///
    /// Result order is unspecified, as for [`search_token`](Self::search_token).
    fn search(&self, probe: &KeyRange<K>) -> Vec<Entry<K, V>>;

    /// Finalize the structure for read-only use.
    ///
    /// Bulk-built backends perform their build here and reject later
    /// inserts; mutable backends treat this as a no-op.
    fn done(&mut self) {}

    /// Number of stored entries.
    fn len(&self) -> usize;

    /// Whether the index holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
