//! Primary index backend: balanced augmented interval tree
//!
//! Nodes live in a flat arena (`Vec<Node>`) and reference each other by
//! index, so rebalancing is plain index surgery with no owning pointers or
//! cycles. Each node carries the largest range end found anywhere in its
//! subtree; searches use that bound to prune whole subtrees before asking
//! the accessor about individual ranges.

use std::cmp::Ordering;
use std::fmt;

use smallvec::SmallVec;

use crate::accessor::Accessor;
use crate::range::{Entry, KeyRange, RangeIndex};
use crate::Error;

/// One arena slot.
struct Node<K, V> {
    range: KeyRange<K>,
    value: V,
    /// max(range.end, max_end(left), max_end(right))
    max_end: K,
    height: u32,
    left: Option<usize>,
    right: Option<usize>,
}

/// Mutable interval tree ordered by `(start, end)` with a max-end
/// augmentation, balanced as an AVL tree.
///
/// This is the production backend: `add` is incremental, `done` is a no-op,
/// and a finalized tree answers queries from `&self` so it can be shared
/// read-only. Duplicate ranges are legal and kept as separate nodes.
pub struct IntervalTree<K, V, A> {
    nodes: Vec<Node<K, V>>,
    root: Option<usize>,
    accessor: A,
}

impl<K, V, A> IntervalTree<K, V, A>
where
    K: Ord + Clone + fmt::Debug,
    V: Clone,
    A: Accessor<K>,
{
    /// Create an empty tree bound to `accessor` for its whole lifetime.
    pub fn new(accessor: A) -> Self {
        Self {
            nodes: Vec::new(),
            root: None,
            accessor,
        }
    }

    /// Smallest range start currently indexed, or `None` when empty.
    pub fn min_start(&self) -> Option<&K> {
        let mut cur = self.root?;
        while let Some(left) = self.nodes[cur].left {
            cur = left;
        }
        Some(&self.nodes[cur].range.start)
    }

    /// Largest range end currently indexed, or `None` when empty.
    pub fn max_end(&self) -> Option<&K> {
        self.root.map(|root| &self.nodes[root].max_end)
    }

    /// Iterate all stored entries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&KeyRange<K>, &V)> + '_ {
        self.nodes.iter().map(|n| (&n.range, &n.value))
    }

    fn height_of(&self, node: Option<usize>) -> u32 {
        node.map_or(0, |i| self.nodes[i].height)
    }

    fn balance_factor(&self, i: usize) -> i32 {
        self.height_of(self.nodes[i].left) as i32 - self.height_of(self.nodes[i].right) as i32
    }

    /// Re-derive height and the max-end augmentation from the children.
    fn update(&mut self, i: usize) {
        let left = self.nodes[i].left;
        let right = self.nodes[i].right;
        let mut max_end = self.nodes[i].range.end.clone();
        if let Some(l) = left {
            if self.nodes[l].max_end > max_end {
                max_end = self.nodes[l].max_end.clone();
            }
        }
        if let Some(r) = right {
            if self.nodes[r].max_end > max_end {
                max_end = self.nodes[r].max_end.clone();
            }
        }
        let height = 1 + self.height_of(left).max(self.height_of(right));
        let node = &mut self.nodes[i];
        node.max_end = max_end;
        node.height = height;
    }

    fn rotate_right(&mut self, i: usize) -> usize {
        let Some(l) = self.nodes[i].left else {
            return i;
        };
        self.nodes[i].left = self.nodes[l].right;
        self.nodes[l].right = Some(i);
        self.update(i);
        self.update(l);
        l
    }

    fn rotate_left(&mut self, i: usize) -> usize {
        let Some(r) = self.nodes[i].right else {
            return i;
        };
        self.nodes[i].right = self.nodes[r].left;
        self.nodes[r].left = Some(i);
        self.update(i);
        self.update(r);
        r
    }

    fn rebalance(&mut self, i: usize) -> usize {
        self.update(i);
        let factor = self.balance_factor(i);
        if factor > 1 {
            if let Some(l) = self.nodes[i].left {
                if self.balance_factor(l) < 0 {
                    let new_left = self.rotate_left(l);
                    self.nodes[i].left = Some(new_left);
                }
            }
            self.rotate_right(i)
        } else if factor < -1 {
            if let Some(r) = self.nodes[i].right {
                if self.balance_factor(r) > 0 {
                    let new_right = self.rotate_right(r);
                    self.nodes[i].right = Some(new_right);
                }
            }
            self.rotate_left(i)
        } else {
            i
        }
    }

    fn insert_at(&mut self, node: Option<usize>, new: usize) -> usize {
        let Some(i) = node else {
            return new;
        };
        // Ordered by (start, end); ties (duplicate ranges) go right.
        let goes_left = {
            let existing = &self.nodes[i].range;
            let incoming = &self.nodes[new].range;
            matches!(
                incoming
                    .start
                    .cmp(&existing.start)
                    .then_with(|| incoming.end.cmp(&existing.end)),
                Ordering::Less
            )
        };
        if goes_left {
            let child = self.insert_at(self.nodes[i].left, new);
            self.nodes[i].left = Some(child);
        } else {
            let child = self.insert_at(self.nodes[i].right, new);
            self.nodes[i].right = Some(child);
        }
        self.rebalance(i)
    }

    /// Pruned traversal shared by the point and range queries.
    ///
    /// `low`/`high` bound the probe as a closed interval, which is
    /// conservative for every shipped policy: a subtree whose max end sits
    /// below `low` cannot match, and a node whose start sits above `high`
    /// rules out its entire right subtree. The accessor has the final word
    /// on each candidate via `matches`.
    fn collect(&self, low: &K, high: &K, matches: impl Fn(&A, &KeyRange<K>) -> bool) -> Vec<Entry<K, V>> {
        let mut results = Vec::new();
        let mut stack: SmallVec<[usize; 32]> = SmallVec::new();
        if let Some(root) = self.root {
            if self.nodes[root].max_end >= *low {
                stack.push(root);
            }
        }
        while let Some(i) = stack.pop() {
            let node = &self.nodes[i];
            if matches(&self.accessor, &node.range) {
                results.push(Entry::new(node.range.clone(), node.value.clone()));
            }
            if let Some(l) = node.left {
                if self.nodes[l].max_end >= *low {
                    stack.push(l);
                }
            }
            if let Some(r) = node.right {
                if node.range.start <= *high && self.nodes[r].max_end >= *low {
                    stack.push(r);
                }
            }
        }
        results
    }
}

impl<K, V, A> RangeIndex<K, V> for IntervalTree<K, V, A>
where
    K: Ord + Clone + fmt::Debug,
    V: Clone,
    A: Accessor<K>,
{
    fn add(&mut self, range: KeyRange<K>, value: V) -> Result<(), Error> {
        range.validate()?;
        let max_end = range.end.clone();
        let new = self.nodes.len();
        self.nodes.push(Node {
            range,
            value,
            max_end,
            height: 1,
            left: None,
            right: None,
        });
        let root = self.insert_at(self.root, new);
        self.root = Some(root);
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

    fn len(&self) -> usize {
        self.nodes.len()
    }
}
