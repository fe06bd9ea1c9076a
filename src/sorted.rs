//! Immutable sorted range list backend
//!
//! Entries accumulate in a range-keyed map until `done()`, which freezes
//! them into a start-sorted array paired with a running max-end prefix.
//! Queries binary-search the window of candidate starts, then walk it
//! backwards, stopping as soon as the prefix proves nothing earlier can
//! reach the probe; the accessor confirms each survivor. Cheap when ranges
//! rarely overlap, since the candidate window stays narrow.

use std::fmt;
use std::hash::Hash;

use ahash::AHashMap;

use crate::accessor::Accessor;
use crate::range::{Entry, KeyRange, RangeIndex};
use crate::Error;

/// Bulk-built, binary-searchable range list.
///
/// Inserts are only legal before [`done`](RangeIndex::done); afterwards
/// `add` returns [`Error::Finalized`]. Queries issued before `done` see no
/// entries; the structure does not exist until it is built.
pub struct SortedRangeList<K, V, A> {
    accessor: A,
    /// Staging area: values grouped by identical range until the build.
    pending: AHashMap<KeyRange<K>, Vec<V>>,
    /// Distinct ranges sorted by (start, end) after the build.
    ranges: Vec<KeyRange<K>>,
    /// Values parallel to `ranges`.
    values: Vec<Vec<V>>,
    /// max_end_prefix[i] = max end over ranges[0..=i]
    max_end_prefix: Vec<K>,
    built: bool,
    len: usize,
}

impl<K, V, A> SortedRangeList<K, V, A>
where
    K: Ord + Clone + Hash + fmt::Debug,
    V: Clone,
    A: Accessor<K>,
{
    /// Create an empty, unbuilt list bound to `accessor`.
    pub fn new(accessor: A) -> Self {
        Self {
            accessor,
            pending: AHashMap::new(),
            ranges: Vec::new(),
            values: Vec::new(),
            max_end_prefix: Vec::new(),
            built: false,
            len: 0,
        }
    }

    /// Whether `done()` has been called.
    pub fn is_built(&self) -> bool {
        self.built
    }

    /// Candidate window walk shared by both query shapes.
    ///
    /// `low`/`high` bound the probe as a closed interval; candidates are
    /// every range with `start <= high`, walked backwards until the max-end
    /// prefix drops below `low`.
    fn collect(&self, low: &K, high: &K, matches: impl Fn(&A, &KeyRange<K>) -> bool) -> Vec<Entry<K, V>> {
        let mut results = Vec::new();
        let upper = self.ranges.partition_point(|r| r.start <= *high);
        for i in (0..upper).rev() {
            if self.max_end_prefix[i] < *low {
                break;
            }
            let range = &self.ranges[i];
            if matches(&self.accessor, range) {
                for value in &self.values[i] {
                    results.push(Entry::new(range.clone(), value.clone()));
                }
            }
        }
        results
    }
}

impl<K, V, A> RangeIndex<K, V> for SortedRangeList<K, V, A>
where
    K: Ord + Clone + Hash + fmt::Debug,
    V: Clone,
    A: Accessor<K>,
{
    fn add(&mut self, range: KeyRange<K>, value: V) -> Result<(), Error> {
        if self.built {
            return Err(Error::Finalized);
        }
        range.validate()?;
        self.pending.entry(range).or_default().push(value);
        self.len += 1;
        Ok(())
    }

    fn search_token(&self, token: &K) -> Vec<Entry<K, V>> {
        self.collect(token, token, |accessor, range| {
            accessor.contains_bounds(&range.start, &range.end, token)
        })
    }

    fn search(&self, probe: &KeyRange<K>) -> Vec<Entry<K, V>> {
        self.collect(&probe.start, &probe.end, |accessor, range| {
            accessor.intersects_bounds(range, &probe.start, &probe.end)
        })
    }

    fn done(&mut self) {
        if self.built {
            return;
        }
        let mut grouped: Vec<(KeyRange<K>, Vec<V>)> = self.pending.drain().collect();
        grouped.sort_by(|a, b| a.0.start.cmp(&b.0.start).then_with(|| a.0.end.cmp(&b.0.end)));

        self.ranges = Vec::with_capacity(grouped.len());
        self.values = Vec::with_capacity(grouped.len());
        self.max_end_prefix = Vec::with_capacity(grouped.len());
        for (range, values) in grouped {
            let end = range.end.clone();
            let max = match self.max_end_prefix.last() {
                Some(prev) if *prev > end => prev.clone(),
                _ => end,
            };
            self.max_end_prefix.push(max);
            self.ranges.push(range);
            self.values.push(values);
        }
        self.built = true;
    }

    fn len(&self) -> usize {
        self.len
    }
}
