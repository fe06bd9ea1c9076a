//! Property tests: for arbitrary insert sequences and probes, every backend
//! returns exactly the oracle's result set.

use quickcheck::quickcheck;
use rangetree::{
    AllInclusive, EndInclusive, IntervalTree, KeyRange, RangeBTree, RangeIndex, ScanOracle,
    SortedRangeList,
};

/// Normalize raw quickcheck pairs into well-formed ranges.
fn ranges(ops: &[(i16, i16, u8)]) -> Vec<(KeyRange<i64>, u8)> {
    ops.iter()
        .map(|&(a, b, value)| {
            let (start, end) = if a <= b { (a, b) } else { (b, a) };
            (KeyRange::new(start as i64, end as i64), value)
        })
        .collect()
}

fn sorted(mut hits: Vec<rangetree::Entry<i64, u8>>) -> Vec<(i64, i64, u8)> {
    let mut flat: Vec<(i64, i64, u8)> = hits
        .drain(..)
        .map(|e| (e.range.start, e.range.end, e.value))
        .collect();
    flat.sort_unstable();
    flat
}

fn agree<I: RangeIndex<i64, u8>>(mut index: I, ops: &[(i16, i16, u8)], probe_a: i16, probe_b: i16) -> bool {
    let mut oracle = ScanOracle::new(EndInclusive);
    for (range, value) in ranges(ops) {
        index.add(range.clone(), value).unwrap();
        oracle.add(range, value).unwrap();
    }
    index.done();
    oracle.done();

    let token = probe_a as i64;
    let (lo, hi) = if probe_a <= probe_b {
        (probe_a as i64, probe_b as i64)
    } else {
        (probe_b as i64, probe_a as i64)
    };
    let probe = KeyRange::new(lo, hi);

    sorted(index.search_token(&token)) == sorted(oracle.search_token(&token))
        && sorted(index.search(&probe)) == sorted(oracle.search(&probe))
}

quickcheck! {
    fn interval_tree_equals_oracle(ops: Vec<(i16, i16, u8)>, a: i16, b: i16) -> bool {
        agree(IntervalTree::new(EndInclusive), &ops, a, b)
    }

    fn sorted_list_equals_oracle(ops: Vec<(i16, i16, u8)>, a: i16, b: i16) -> bool {
        agree(SortedRangeList::new(EndInclusive), &ops, a, b)
    }

    fn range_btree_equals_oracle(ops: Vec<(i16, i16, u8)>, a: i16, b: i16) -> bool {
        agree(RangeBTree::new(EndInclusive), &ops, a, b)
    }

    fn all_inclusive_tree_equals_oracle(ops: Vec<(i16, i16, u8)>, a: i16, b: i16) -> bool {
        let mut index = IntervalTree::new(AllInclusive);
        let mut oracle = ScanOracle::new(AllInclusive);
        for (range, value) in ranges(&ops) {
            index.add(range.clone(), value).unwrap();
            oracle.add(range, value).unwrap();
        }
        let token = a as i64;
        let (lo, hi) = if a <= b { (a as i64, b as i64) } else { (b as i64, a as i64) };
        let probe = KeyRange::new(lo, hi);
        sorted(index.search_token(&token)) == sorted(oracle.search_token(&token))
            && sorted(index.search(&probe)) == sorted(oracle.search(&probe))
    }

    fn point_probe_consistent_with_singleton_range(ops: Vec<(i16, i16, u8)>, a: i16) -> bool {
        // Under AllInclusive, searching token k and searching [k, k] are the
        // same question; EndInclusive differs only at its open boundaries.
        let mut index = IntervalTree::new(AllInclusive);
        for (range, value) in ranges(&ops) {
            index.add(range, value).unwrap();
        }
        let token = a as i64;
        sorted(index.search_token(&token)) == sorted(index.search(&KeyRange::point(token)))
    }
}
