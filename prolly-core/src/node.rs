//! Tree node model.
//!
//! Both collections share one node shape: a leaf flag, per-child subtree
//! counts, child content ids, and — for key-ordered trees only — a key
//! column where `keys[i]` is the minimum key of the subtree under
//! `children[i]`. Rank-addressed trees simply run with an empty key column;
//! the [`TreeKey::KEYED`] marker tells the wire layer whether the column
//! exists at all.
//!
//! Node invariants (checked by [`Node::validate`] on every load):
//! - `|counts| == |children|`, and `== |keys|` when keyed;
//! - leaf counts are all `1`;
//! - keys are strictly ascending.

use crate::content_id::ContentId;
use crate::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

// ============================================================================
// TreeKey
// ============================================================================

/// Key types an ordered tree can be built over.
///
/// Ordering comes from `Ord`; the wire form comes from serde. `KEYED` is
/// `false` only for [`Unkeyed`], the marker rank-addressed trees use.
pub trait TreeKey:
    Clone + Ord + Debug + Send + Sync + Serialize + DeserializeOwned + 'static
{
    /// Whether nodes carry a key column on the wire.
    const KEYED: bool;

    /// The key at position `i` of a node's key column.
    ///
    /// For unkeyed trees the column is empty and this returns the unit
    /// marker.
    fn column_key(keys: &[Self], i: usize) -> Self;
}

macro_rules! impl_tree_key {
    ($($t:ty),* $(,)?) => {
        $(
            impl TreeKey for $t {
                const KEYED: bool = true;

                fn column_key(keys: &[Self], i: usize) -> Self {
                    keys[i].clone()
                }
            }
        )*
    };
}

impl_tree_key!(String, u64, i64, Vec<u8>);

/// Unit key marker for rank-addressed (list) trees.
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    serde::Serialize,
    serde::Deserialize,
)]
pub struct Unkeyed;

impl TreeKey for Unkeyed {
    const KEYED: bool = false;

    fn column_key(_keys: &[Self], _i: usize) -> Self {
        Unkeyed
    }
}

// ============================================================================
// Node
// ============================================================================

/// An immutable tree node.
///
/// `counts[i]` is the element count of the subtree under `children[i]` —
/// `1` per child in a leaf, the sum of the child node's counts in a branch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node<K> {
    /// Whether children are element values (leaf) or child nodes (branch).
    pub leaf: bool,
    /// Subtree element count per child.
    pub counts: Vec<u32>,
    /// Minimum key of each child's subtree; empty for unkeyed trees.
    pub keys: Vec<K>,
    /// Content ids of the children.
    pub children: Vec<ContentId>,
}

impl<K: TreeKey> Node<K> {
    /// The canonical empty collection root: a leaf with no children.
    pub fn empty_leaf() -> Self {
        Self {
            leaf: true,
            counts: Vec::new(),
            keys: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Number of direct children.
    pub fn len(&self) -> usize {
        self.children.len()
    }

    /// True when the node has no children (the empty collection root).
    pub fn is_empty(&self) -> bool {
        self.children.is_empty()
    }

    /// Total element count of the subtree rooted here.
    pub fn total(&self) -> u64 {
        self.counts.iter().map(|&c| c as u64).sum()
    }

    /// Check the node-shape invariants, naming the first violation.
    pub fn validate(&self) -> Result<()> {
        if self.counts.len() != self.children.len() {
            return Err(Error::invalid_node(format!(
                "counts/children length mismatch: {} vs {}",
                self.counts.len(),
                self.children.len()
            )));
        }
        if K::KEYED {
            if self.keys.len() != self.children.len() {
                return Err(Error::invalid_node(format!(
                    "keys/children length mismatch: {} vs {}",
                    self.keys.len(),
                    self.children.len()
                )));
            }
            for pair in self.keys.windows(2) {
                if pair[0] >= pair[1] {
                    return Err(Error::invalid_node("keys not strictly ascending"));
                }
            }
        } else if !self.keys.is_empty() {
            return Err(Error::invalid_node("unexpected key column"));
        }
        if self.leaf {
            if let Some(i) = self.counts.iter().position(|&c| c != 1) {
                return Err(Error::invalid_node(format!(
                    "leaf count at {} is {}, expected 1",
                    i, self.counts[i]
                )));
            }
        } else if let Some(i) = self.counts.iter().position(|&c| c == 0) {
            return Err(Error::invalid_node(format!("branch count at {i} is 0")));
        }
        Ok(())
    }

    /// Locate the child covering `rank`.
    ///
    /// Returns `(i, residual)` where `i` is the first child whose cumulative
    /// count exceeds `rank` and `residual` is the rank remaining inside that
    /// child. A `rank` at or past the subtree total lands on the last child
    /// with `residual >= counts[last]` — the append position.
    ///
    /// Callers must not pass an empty node.
    pub fn seek(&self, rank: u64) -> (usize, u64) {
        debug_assert!(!self.is_empty(), "seek on an empty node");
        let mut remaining = rank;
        for (i, &c) in self.counts.iter().enumerate() {
            let c = c as u64;
            if remaining < c {
                return (i, remaining);
            }
            remaining -= c;
        }
        let last = self.counts.len() - 1;
        (last, remaining + self.counts[last] as u64)
    }
}

/// Largest index `i` such that `keys[i] <= key`, or `None` when every key
/// is greater.
///
/// Binary search; `keys` must be sorted ascending.
pub fn find_pred<K: Ord>(keys: &[K], key: &K) -> Option<usize> {
    keys.partition_point(|k| k <= key).checked_sub(1)
}

// ============================================================================
// Entry
// ============================================================================

/// A key/value pair yielded by map reads and scans.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry<K> {
    /// The entry's key.
    pub key: K,
    /// The opaque value handle.
    pub value: ContentId,
}

impl<K> Entry<K> {
    /// Create an entry.
    pub fn new(key: K, value: ContentId) -> Self {
        Self { key, value }
    }
}
