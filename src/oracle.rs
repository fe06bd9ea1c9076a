//! Brute-force reference oracle
//!
//! A flat list scanned in full for every query. Intentionally O(n) per
//! probe with no pruning and no augmentation: it is correct by construction
//! and exists only as ground truth for the differential harness, never as a
//! production query path.

use std::fmt;

use crate::accessor::Accessor;
use crate::range::{Entry, KeyRange, RangeIndex};
use crate::Error;

/// Linear-scan implementation of [`RangeIndex`].
pub struct ScanOracle<K, V, A> {
    entries: Vec<Entry<K, V>>,
    accessor: A,
}

impl<K, V, A> ScanOracle<K, V, A>
where
    K: Ord + Clone + fmt::Debug,
    V: Clone,
    A: Accessor<K>,
{
    /// Create an empty oracle bound to `accessor`.
    pub fn new(accessor: A) -> Self {
        Self {
            entries: Vec::new(),
            accessor,
        }
    }
}

impl<K, V, A> RangeIndex<K, V> for ScanOracle<K, V, A>
where
    K: Ord + Clone + fmt::Debug,
    V: Clone,
    A: Accessor<K>,
{
    fn add(&mut self, range: KeyRange<K>, value: V) -> Result<(), Error> {
        range.validate()?;
        self.entries.push(Entry::new(range, value));
        Ok(())
    }

    fn search_token(&self, token: &K) -> Vec<Entry<K, V>> {
        self.entries
            .iter()
            .filter(|e| self.accessor.contains(&e.range, token))
            .cloned()
            .collect()
    }

    fn search(&self, probe: &KeyRange<K>) -> Vec<Entry<K, V>> {
        self.entries
            .iter()
            .filter(|e| self.accessor.intersects(&e.range, probe))
            .cloned()
            .collect()
    }

    fn len(&self) -> usize {
        self.entries.len()
    }
}
