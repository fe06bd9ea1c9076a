//! Persistent range B-tree backend
//!
//! A copy-on-write B-tree keyed by the total order `(start, end,
//! insertion-sequence)`. Every insert rebuilds only the root-to-leaf path it
//! touches; untouched subtrees are shared through `Arc`, so a clone of the
//! whole index is a cheap snapshot that keeps answering queries while the
//! original moves on. Each node carries the largest range end in its
//! subtree, and the traversal compares the bare probe keys against stored
//! range boundaries to skip children whose key window cannot reach the
//! probe.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::accessor::Accessor;
use crate::range::{Entry, KeyRange, RangeIndex};
use crate::Error;

/// Max items per node before a split.
const MAX_ITEMS: usize = 8;

#[derive(Clone)]
struct Item<K, V> {
    range: KeyRange<K>,
    value: V,
    /// Insertion sequence; makes the total order strict so duplicate ranges
    /// (and duplicate values) occupy distinct slots.
    seq: u64,
}

struct BNode<K, V> {
    items: Vec<Item<K, V>>,
    /// Empty for leaves; otherwise `items.len() + 1` children.
    children: Vec<Arc<BNode<K, V>>>,
    /// Largest range end anywhere in this subtree.
    max_end: K,
}

fn cmp_items<K: Ord, V>(a: &Item<K, V>, b: &Item<K, V>) -> Ordering {
    a.range
        .start
        .cmp(&b.range.start)
        .then_with(|| a.range.end.cmp(&b.range.end))
        .then_with(|| a.seq.cmp(&b.seq))
}

fn make_node<K: Ord + Clone, V>(items: Vec<Item<K, V>>, children: Vec<Arc<BNode<K, V>>>) -> Arc<BNode<K, V>> {
    debug_assert!(!items.is_empty());
    debug_assert!(children.is_empty() || children.len() == items.len() + 1);
    let mut max_end = items[0].range.end.clone();
    for item in &items[1..] {
        if item.range.end > max_end {
            max_end = item.range.end.clone();
        }
    }
    for child in &children {
        if child.max_end > max_end {
            max_end = child.max_end.clone();
        }
    }
    Arc::new(BNode {
        items,
        children,
        max_end,
    })
}

enum Inserted<K, V> {
    Done(Arc<BNode<K, V>>),
    Split {
        left: Arc<BNode<K, V>>,
        median: Item<K, V>,
        right: Arc<BNode<K, V>>,
    },
}

fn split<K: Ord + Clone, V>(mut items: Vec<Item<K, V>>, mut children: Vec<Arc<BNode<K, V>>>) -> Inserted<K, V> {
    let mid = items.len() / 2;
    let right_items = items.split_off(mid + 1);
    let median = match items.pop() {
        Some(item) => item,
        None => unreachable!("split called on an overfull node"),
    };
    let right_children = if children.is_empty() {
        Vec::new()
    } else {
        children.split_off(mid + 1)
    };
    Inserted::Split {
        left: make_node(items, children),
        median,
        right: make_node(right_items, right_children),
    }
}

fn insert_into<K, V>(node: &BNode<K, V>, item: Item<K, V>) -> Inserted<K, V>
where
    K: Ord + Clone,
    V: Clone,
{
    let pos = node
        .items
        .partition_point(|existing| cmp_items(existing, &item) == Ordering::Less);

    if node.children.is_empty() {
        let mut items = node.items.clone();
        items.insert(pos, item);
        if items.len() > MAX_ITEMS {
            return split(items, Vec::new());
        }
        return Inserted::Done(make_node(items, Vec::new()));
    }

    let mut items = node.items.clone();
    let mut children = node.children.clone();
    match insert_into(&node.children[pos], item) {
        Inserted::Done(child) => {
            children[pos] = child;
        }
        Inserted::Split { left, median, right } => {
            items.insert(pos, median);
            children[pos] = left;
            children.insert(pos + 1, right);
        }
    }
    if items.len() > MAX_ITEMS {
        return split(items, children);
    }
    Inserted::Done(make_node(items, children))
}

/// Accumulation traversal: visits only subtrees whose key window can reach
/// the closed probe interval `[low, high]`, then lets `matches` decide.
///
/// Items are sorted by start, so once an item's start climbs past `high`
/// neither it, its following siblings, nor the children between them can
/// hold a match under any shipped policy.
fn accumulate<K, V, F>(node: &BNode<K, V>, low: &K, high: &K, matches: &F, results: &mut Vec<Entry<K, V>>)
where
    K: Ord + Clone,
    V: Clone,
    F: Fn(&KeyRange<K>) -> bool,
{
    if node.max_end < *low {
        return;
    }
    for (i, item) in node.items.iter().enumerate() {
        if let Some(child) = node.children.get(i) {
            accumulate(child, low, high, matches, results);
        }
        if item.range.start > *high {
            return;
        }
        if matches(&item.range) {
            results.push(Entry::new(item.range.clone(), item.value.clone()));
        }
    }
    if let Some(last) = node.children.last() {
        accumulate(last, low, high, matches, results);
    }
}

/// Persistent B-tree over `(range, value)` entries.
///
/// Cloning is O(1) in tree size and yields an independent snapshot sharing
/// all unchanged nodes; see [`snapshot`](RangeBTree::snapshot). Accepts
/// inserts until [`done`](RangeIndex::done), after which the value is
/// frozen and further `add` calls return [`Error::Finalized`].
#[derive(Clone)]
pub struct RangeBTree<K, V, A> {
    root: Option<Arc<BNode<K, V>>>,
    accessor: A,
    seq: u64,
    len: usize,
    frozen: bool,
}

impl<K, V, A> RangeBTree<K, V, A>
where
    K: Ord + Clone + fmt::Debug,
    V: Clone,
    A: Accessor<K>,
{
    /// Create an empty tree bound to `accessor`.
    pub fn new(accessor: A) -> Self {
        Self {
            root: None,
            accessor,
            seq: 0,
            len: 0,
            frozen: false,
        }
    }

    /// Cheap structural-sharing snapshot of the current state.
    ///
    /// The snapshot keeps answering queries against the state at the time
    /// it was taken, regardless of later inserts into `self`.
    pub fn snapshot(&self) -> Self {
        self.clone()
    }

    fn collect(&self, low: &K, high: &K, matches: impl Fn(&KeyRange<K>) -> bool) -> Vec<Entry<K, V>> {
        let mut results = Vec::new();
        if let Some(root) = &self.root {
            accumulate(root, low, high, &matches, &mut results);
        }
        results
    }
}

impl<K, V, A> RangeIndex<K, V> for RangeBTree<K, V, A>
where
    K: Ord + Clone + fmt::Debug,
    V: Clone,
    A: Accessor<K>,
{
    fn add(&mut self, range: KeyRange<K>, value: V) -> Result<(), Error> {
        if self.frozen {
            return Err(Error::Finalized);
        }
        range.validate()?;
        let item = Item {
            range,
            value,
            seq: self.seq,
        };
        self.seq += 1;
        self.len += 1;
        let root = match self.root.take() {
            None => make_node(vec![item], Vec::new()),
            Some(root) => match insert_into(&root, item) {
                Inserted::Done(node) => node,
                Inserted::Split { left, median, right } => {
                    make_node(vec![median], vec![left, right])
                }
            },
        };
        self.root = Some(root);
        Ok(())
    }

    fn search_token(&self, token: &K) -> Vec<Entry<K, V>> {
        self.collect(token, token, |range| {
            self.accessor.contains_bounds(&range.start, &range.end, token)
        })
    }

    fn search(&self, probe: &KeyRange<K>) -> Vec<Entry<K, V>> {
        self.collect(&probe.start, &probe.end, |range| {
            self.accessor.intersects_bounds(range, &probe.start, &probe.end)
        })
    }

    fn done(&mut self) {
        self.frozen = true;
    }

    fn len(&self) -> usize {
        self.len
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accessor::{AllInclusive, EndInclusive};

    fn values(mut entries: Vec<Entry<i64, i64>>) -> Vec<i64> {
        let mut v: Vec<i64> = entries.drain(..).map(|e| e.value).collect();
        v.sort_unstable();
        v
    }

    #[test]
    fn splits_keep_every_entry_reachable() {
        // Enough inserts to force several levels of splits.
        let mut tree = RangeBTree::new(EndInclusive);
        for i in 0..500i64 {
            tree.add(KeyRange::new(i, i + 20), i).unwrap();
        }
        assert_eq!(tree.len(), 500);

        let got = values(tree.search_token(&100));
        // (start, end] with width 20: starts 80..=99 contain 100.
        assert_eq!(got, (80..100).collect::<Vec<_>>());
    }

    #[test]
    fn range_probe_matches_intersecting_entries() {
        let mut tree = RangeBTree::new(EndInclusive);
        tree.add(KeyRange::new(0, 10), 1).unwrap();
        tree.add(KeyRange::new(5, 15), 2).unwrap();
        tree.add(KeyRange::new(20, 30), 3).unwrap();

        assert_eq!(values(tree.search(&KeyRange::new(8, 12))), vec![1, 2]);
        assert!(tree.search(&KeyRange::new(16, 19)).is_empty());
    }

    #[test]
    fn all_inclusive_adjacency_counts() {
        let mut tree = RangeBTree::new(AllInclusive);
        tree.add(KeyRange::new(0, 10), 1).unwrap();
        tree.add(KeyRange::new(10, 20), 2).unwrap();

        assert_eq!(values(tree.search(&KeyRange::new(20, 25))), vec![2]);
        assert_eq!(values(tree.search_token(&10)), vec![1, 2]);
    }

    #[test]
    fn snapshot_is_unaffected_by_later_inserts() {
        let mut tree = RangeBTree::new(EndInclusive);
        for i in 0..100i64 {
            tree.add(KeyRange::new(i * 2, i * 2 + 5), i).unwrap();
        }
        let before = tree.snapshot();
        for i in 100..200i64 {
            tree.add(KeyRange::new(i * 2, i * 2 + 5), i).unwrap();
        }

        assert_eq!(before.len(), 100);
        assert_eq!(tree.len(), 200);
        assert!(before.search_token(&300).is_empty());
        assert!(!tree.search_token(&300).is_empty());
    }

    #[test]
    fn frozen_tree_rejects_inserts_but_keeps_answering() {
        let mut tree = RangeBTree::new(EndInclusive);
        tree.add(KeyRange::new(0, 10), 1).unwrap();
        tree.done();

        assert!(matches!(
            tree.add(KeyRange::new(5, 15), 2),
            Err(Error::Finalized)
        ));
        assert_eq!(values(tree.search_token(&5)), vec![1]);
    }

    #[test]
    fn duplicate_entries_all_survive() {
        let mut tree = RangeBTree::new(EndInclusive);
        for _ in 0..10 {
            tree.add(KeyRange::new(0, 10), 7).unwrap();
        }
        assert_eq!(tree.search_token(&5).len(), 10);
    }

    #[test]
    fn rejects_reversed_range() {
        let mut tree: RangeBTree<i64, i64, _> = RangeBTree::new(EndInclusive);
        assert!(tree.add(KeyRange::new(9, 3), 0).is_err());
        assert!(tree.is_empty());
    }
}
