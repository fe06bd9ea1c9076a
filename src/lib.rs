//! RangeTree: range/interval index with pluggable inclusivity policies
//!
//! This crate stores `(key-range, value)` pairs and answers two query
//! shapes ("all ranges containing point P", "all ranges intersecting range
//! Q") under a configurable notion of interval inclusivity. It is
//! the kind of structure distributed storage systems use to map token
//! ranges to owners and to find overlapping ranges during routing or
//! repair, kept generic over the ordered key type and the interval policy.
//!
//! Three interchangeable backends implement the [`RangeIndex`] contract:
//! the balanced augmented [`IntervalTree`] (the production path), the
//! bulk-built [`SortedRangeList`], and the persistent [`RangeBTree`]. A
//! linear-scan [`ScanOracle`] plus the [`workload`] generator and the
//! [`harness`] differential driver validate that all of them agree.
//!
//! ```
//! use rangetree::{EndInclusive, IntervalTree, KeyRange, RangeIndex};
//!
//! let mut index = IntervalTree::new(EndInclusive);
//! index.add(KeyRange::new(0, 10), "a").unwrap();
//! index.add(KeyRange::new(5, 15), "b").unwrap();
//! index.done();
//!
//! let hits = index.search_token(&7);
//! assert_eq!(hits.len(), 2);
//! ```

#![warn(missing_docs)]

/// Interval-comparison policies
pub mod accessor;
/// Core range/entry types and the backend contract
pub mod range;

/// Primary backend: balanced augmented interval tree
pub mod tree;

/// Bulk-built sorted range list backend
pub mod sorted;

/// Persistent copy-on-write range B-tree backend
pub mod btree;

/// Brute-force reference oracle for differential testing
pub mod oracle;

/// Synthetic workload generation
pub mod workload;

/// Differential test driver
pub mod harness;

// Re-exports
pub use accessor::{Accessor, AllInclusive, EndInclusive};
pub use btree::RangeBTree;
pub use error::Error;
pub use oracle::ScanOracle;
pub use range::{Entry, KeyRange, RangeIndex};
pub use sorted::SortedRangeList;
pub use tree::IntervalTree;

/// Error types for index operations
pub mod error {
    /// Error types that can occur when mutating an index.
    ///
    /// Queries never fail: an empty or non-matching index yields an empty
    /// result list.
    #[derive(Debug, thiserror::Error)]
    pub enum Error {
        /// The range's start compares greater than its end
        #[error("invalid range: start {start} is greater than end {end}")]
        InvalidRange {
            /// Debug rendering of the offending start key
            start: String,
            /// Debug rendering of the offending end key
            end: String,
        },
        /// Insert attempted on a bulk-built index after `done()`
        #[error("index already finalized; no further inserts are accepted")]
        Finalized,
    }
}
