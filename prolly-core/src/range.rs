//! Range scans.
//!
//! A scan is a stateful cursor over a bounded slice of a collection,
//! yielding elements in ascending rank order, each at most once, reading
//! each node at most once (`O(k + log n)` I/O for `k` yielded items). The
//! caller cancels by dropping the cursor; no background work is owned by
//! it.
//!
//! Bounds come in two flavors:
//! - **rank bounds** `lo` (inclusive) and `hi` (exclusive), valid for both
//!   collections;
//! - **key bounds** for keyed trees: a start key (`le` at-or-after /
//!   `lt` strictly-after) and an end key (`gt` stop-before-equal /
//!   `ge` stop-after-equal).
//!
//! When a start key is present it takes precedence over `lo`. The start
//! position comes from a predecessor descent, so the cursor begins with a
//! boundary pass that skips leading entries failing the start predicate
//! (at most one, plus any entry equal to an `lt` bound), spending scan
//! budget per skip.

use crate::codec::Codec;
use crate::content_id::ContentId;
use crate::error::Result;
use crate::forest::Forest;
use crate::hasher::Hasher;
use crate::node::{find_pred, Entry, Node, TreeKey};
use crate::storage::BlockStore;

// ============================================================================
// Options
// ============================================================================

/// Bounds for a range scan.
///
/// All fields optional; the zero-value scans everything. Builder methods
/// chain:
///
/// ```ignore
/// let opts = ScanOptions::new().le("b".to_string()).gt("x".to_string()).limit(10);
/// ```
#[derive(Debug, Clone)]
pub struct ScanOptions<K> {
    /// Start rank, inclusive (default 0). Ignored when a start key is set.
    pub lo: Option<u64>,
    /// End rank, exclusive (default unbounded).
    pub hi: Option<u64>,
    /// Start key: yield entries strictly after this key.
    pub lt: Option<K>,
    /// Start key: yield entries at or after this key.
    pub le: Option<K>,
    /// End key: stop before an entry equal to or greater than this key.
    pub gt: Option<K>,
    /// End key: stop before an entry greater than this key.
    pub ge: Option<K>,
    /// Maximum number of entries yielded.
    pub limit: Option<u64>,
}

impl<K> Default for ScanOptions<K> {
    fn default() -> Self {
        Self {
            lo: None,
            hi: None,
            lt: None,
            le: None,
            gt: None,
            ge: None,
            limit: None,
        }
    }
}

impl<K> ScanOptions<K> {
    /// An unbounded scan.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the inclusive start rank.
    pub fn lo(mut self, rank: u64) -> Self {
        self.lo = Some(rank);
        self
    }

    /// Set the exclusive end rank.
    pub fn hi(mut self, rank: u64) -> Self {
        self.hi = Some(rank);
        self
    }

    /// Start strictly after `key`.
    pub fn lt(mut self, key: K) -> Self {
        self.lt = Some(key);
        self
    }

    /// Start at or after `key`.
    pub fn le(mut self, key: K) -> Self {
        self.le = Some(key);
        self
    }

    /// Stop before any entry at or above `key`.
    pub fn gt(mut self, key: K) -> Self {
        self.gt = Some(key);
        self
    }

    /// Stop after entries equal to `key`.
    pub fn ge(mut self, key: K) -> Self {
        self.ge = Some(key);
        self
    }

    /// Yield at most `n` entries.
    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }
}

// ============================================================================
// Cursor
// ============================================================================

/// One level of the descent: a loaded node and the next child to visit.
#[derive(Debug)]
struct Frame<K> {
    node: Node<K>,
    index: usize,
}

/// Start-key predicate retained for the boundary pass.
enum StartKey<K> {
    /// `le`: entries below the key are skipped.
    At(K),
    /// `lt`: entries at or below the key are skipped.
    After(K),
}

/// End-key predicate tested per yielded entry.
enum EndKey<K> {
    Open,
    /// `gt`: stop when an entry's key reaches the bound.
    Before(K),
    /// `ge`: stop once an entry's key passes the bound.
    Through(K),
}

/// A lazy range-scan cursor. Pull with [`Scan::next`]; drop to cancel.
pub struct Scan<'a, S, C, H, K: TreeKey> {
    forest: &'a Forest<S, C, H>,
    frames: Vec<Frame<K>>,
    /// Entries left in the budget (rank window clipped by limit).
    count: u64,
    end: EndKey<K>,
}

impl<'a, S: BlockStore, C: Codec, H: Hasher, K: TreeKey> Scan<'a, S, C, H, K> {
    /// Open a cursor over `root` with `options`, descending to the start
    /// position.
    pub async fn new(
        forest: &'a Forest<S, C, H>,
        root: &ContentId,
        options: ScanOptions<K>,
    ) -> Result<Self> {
        let ScanOptions {
            lo,
            hi,
            lt,
            le,
            gt,
            ge,
            limit,
        } = options;

        let root_node: Node<K> = forest.load(root).await?;
        let total = root_node.total();
        let mut count = hi.unwrap_or(u64::MAX).min(total);

        let start = if K::KEYED {
            match (le, lt) {
                (Some(k), _) => Some(StartKey::At(k)),
                (None, Some(k)) => Some(StartKey::After(k)),
                (None, None) => None,
            }
        } else {
            None
        };
        let end = if K::KEYED {
            match (gt, ge) {
                (Some(k), _) => EndKey::Before(k),
                (None, Some(k)) => EndKey::Through(k),
                (None, None) => EndKey::Open,
            }
        } else {
            EndKey::Open
        };

        let mut frames = Vec::new();
        match &start {
            Some(start_key) => {
                let key = match start_key {
                    StartKey::At(k) | StartKey::After(k) => k,
                };
                if count > 0 && !root_node.is_empty() {
                    let mut node = root_node;
                    loop {
                        let idx = find_pred(&node.keys, key).unwrap_or(0);
                        let skipped: u64 = node.counts[..idx].iter().map(|&c| c as u64).sum();
                        count = count.saturating_sub(skipped);
                        if node.leaf {
                            frames.push(Frame { node, index: idx });
                            break;
                        }
                        let child = node.children[idx].clone();
                        frames.push(Frame { node, index: idx });
                        node = forest.load(&child).await?;
                    }
                }
            }
            None => {
                let lo = lo.unwrap_or(0);
                count = count.saturating_sub(lo);
                if count > 0 {
                    // count > 0 implies lo < total, so the descent lands on
                    // a real element.
                    let mut node = root_node;
                    let mut remaining = lo;
                    loop {
                        let (i, residual) = node.seek(remaining);
                        if node.leaf {
                            frames.push(Frame { node, index: i });
                            break;
                        }
                        remaining = residual;
                        let child = node.children[i].clone();
                        frames.push(Frame { node, index: i });
                        node = forest.load(&child).await?;
                    }
                }
            }
        }

        if let Some(limit) = limit {
            count = count.min(limit);
        }

        let mut scan = Self {
            forest,
            frames,
            count,
            end,
        };

        // Boundary pass: the predecessor descent can land one entry early,
        // and an `lt` start sits exactly on its bound. Skip forward while
        // the start predicate fails.
        if let Some(start_key) = start {
            while scan.count > 0 {
                let Some(frame) = scan.frames.last_mut() else {
                    break;
                };
                if frame.index >= frame.node.keys.len() {
                    break;
                }
                let here = &frame.node.keys[frame.index];
                let skip = match &start_key {
                    StartKey::At(k) => here < k,
                    StartKey::After(k) => here <= k,
                };
                if !skip {
                    break;
                }
                frame.index += 1;
                scan.count -= 1;
            }
        }

        Ok(scan)
    }

    /// Yield the next entry, or `None` when the scan is exhausted.
    pub async fn next(&mut self) -> Result<Option<Entry<K>>> {
        while self.count > 0 {
            let has_current = match self.frames.last() {
                None => {
                    self.count = 0;
                    return Ok(None);
                }
                Some(frame) => frame.index < frame.node.children.len(),
            };
            if !has_current {
                self.step_to_next_leaf().await?;
                continue;
            }

            let frame = self.frames.last_mut().expect("frame present");
            if !matches!(self.end, EndKey::Open) {
                let key = &frame.node.keys[frame.index];
                let stop = match &self.end {
                    EndKey::Before(bound) => key >= bound,
                    EndKey::Through(bound) => key > bound,
                    EndKey::Open => false,
                };
                if stop {
                    self.count = 0;
                    return Ok(None);
                }
            }

            let i = frame.index;
            frame.index += 1;
            self.count -= 1;
            return Ok(Some(Entry::new(
                K::column_key(&frame.node.keys, i),
                frame.node.children[i].clone(),
            )));
        }
        Ok(None)
    }

    /// Drain the cursor into a vector.
    pub async fn collect(mut self) -> Result<Vec<Entry<K>>> {
        let mut out = Vec::new();
        while let Some(entry) = self.next().await? {
            out.push(entry);
        }
        Ok(out)
    }

    /// Pop the exhausted leaf, advance the nearest ancestor with a next
    /// child, and descend to the leftmost leaf under it.
    async fn step_to_next_leaf(&mut self) -> Result<()> {
        self.frames.pop();
        loop {
            let Some(frame) = self.frames.last_mut() else {
                self.count = 0;
                return Ok(());
            };
            frame.index += 1;
            if frame.index < frame.node.children.len() {
                break;
            }
            self.frames.pop();
        }

        let mut child = {
            let frame = self.frames.last().expect("frame present");
            frame.node.children[frame.index].clone()
        };
        loop {
            let node: Node<K> = self.forest.load(&child).await?;
            let leaf = node.leaf;
            if !leaf {
                child = node.children[0].clone();
            }
            self.frames.push(Frame { node, index: 0 });
            if leaf {
                return Ok(());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::node::Unkeyed;
    use crate::storage::MemoryStore;
    use sha2::Digest;

    fn value_id(n: u64) -> ContentId {
        let digest = sha2::Sha256::digest(n.to_le_bytes());
        ContentId::from_parts(0x55, 0x12, &digest).unwrap()
    }

    /// Keys "k00".."k09" across three leaves under one branch.
    async fn build_map(forest: &Forest<MemoryStore>) -> ContentId {
        let mut leaf_ids = Vec::new();
        let mut counts = Vec::new();
        let mut mins = Vec::new();
        for chunk in [(0u64..4), (4..7), (7..10)] {
            let keys: Vec<String> = chunk.clone().map(|i| format!("k{i:02}")).collect();
            let node = Node::<String> {
                leaf: true,
                counts: vec![1; keys.len()],
                keys: keys.clone(),
                children: chunk.map(value_id).collect(),
            };
            counts.push(node.len() as u32);
            mins.push(keys[0].clone());
            leaf_ids.push(forest.save(&node).await.unwrap());
        }
        let root = Node::<String> {
            leaf: false,
            counts,
            keys: mins,
            children: leaf_ids,
        };
        forest.save(&root).await.unwrap()
    }

    /// Ten unkeyed values across three leaves.
    async fn build_list(forest: &Forest<MemoryStore>) -> ContentId {
        let mut leaf_ids = Vec::new();
        let mut counts = Vec::new();
        for chunk in [(0u64..4), (4..7), (7..10)] {
            let n = (chunk.end - chunk.start) as usize;
            let node = Node::<Unkeyed> {
                leaf: true,
                counts: vec![1; n],
                keys: vec![],
                children: chunk.map(value_id).collect(),
            };
            counts.push(node.len() as u32);
            leaf_ids.push(forest.save(&node).await.unwrap());
        }
        let root = Node::<Unkeyed> {
            leaf: false,
            counts,
            keys: vec![],
            children: leaf_ids,
        };
        forest.save(&root).await.unwrap()
    }

    async fn scan_keys(
        forest: &Forest<MemoryStore>,
        root: &ContentId,
        options: ScanOptions<String>,
    ) -> Vec<String> {
        Scan::new(forest, root, options)
            .await
            .unwrap()
            .collect()
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.key)
            .collect()
    }

    fn keys(range: std::ops::Range<u64>) -> Vec<String> {
        range.map(|i| format!("k{i:02}")).collect()
    }

    #[tokio::test]
    async fn full_scan_in_order() {
        let forest = Forest::new(MemoryStore::new());
        let root = build_map(&forest).await;
        assert_eq!(
            scan_keys(&forest, &root, ScanOptions::new()).await,
            keys(0..10)
        );
    }

    #[tokio::test]
    async fn rank_window_and_limit() {
        let forest = Forest::new(MemoryStore::new());
        let root = build_map(&forest).await;
        assert_eq!(
            scan_keys(&forest, &root, ScanOptions::new().lo(3).hi(8)).await,
            keys(3..8)
        );
        assert_eq!(
            scan_keys(&forest, &root, ScanOptions::new().lo(3).limit(2)).await,
            keys(3..5)
        );
        assert_eq!(
            scan_keys(&forest, &root, ScanOptions::new().lo(20)).await,
            Vec::<String>::new()
        );
        assert_eq!(
            scan_keys(&forest, &root, ScanOptions::new().hi(0)).await,
            Vec::<String>::new()
        );
    }

    #[tokio::test]
    async fn start_key_bounds() {
        let forest = Forest::new(MemoryStore::new());
        let root = build_map(&forest).await;
        // Inclusive start on an existing key.
        assert_eq!(
            scan_keys(&forest, &root, ScanOptions::new().le("k04".to_string())).await,
            keys(4..10)
        );
        // Exclusive start on an existing key.
        assert_eq!(
            scan_keys(&forest, &root, ScanOptions::new().lt("k04".to_string())).await,
            keys(5..10)
        );
        // Start keys between entries behave identically for both flavors.
        assert_eq!(
            scan_keys(&forest, &root, ScanOptions::new().le("k045".to_string())).await,
            keys(5..10)
        );
        assert_eq!(
            scan_keys(&forest, &root, ScanOptions::new().lt("k045".to_string())).await,
            keys(5..10)
        );
        // Below-all and above-all starts.
        assert_eq!(
            scan_keys(&forest, &root, ScanOptions::new().le("a".to_string())).await,
            keys(0..10)
        );
        assert_eq!(
            scan_keys(&forest, &root, ScanOptions::new().le("z".to_string())).await,
            Vec::<String>::new()
        );
    }

    #[tokio::test]
    async fn end_key_bounds() {
        let forest = Forest::new(MemoryStore::new());
        let root = build_map(&forest).await;
        // Strict end excludes the bound itself.
        assert_eq!(
            scan_keys(&forest, &root, ScanOptions::new().gt("k06".to_string())).await,
            keys(0..6)
        );
        // Non-strict end includes it.
        assert_eq!(
            scan_keys(&forest, &root, ScanOptions::new().ge("k06".to_string())).await,
            keys(0..7)
        );
    }

    #[tokio::test]
    async fn half_open_key_window() {
        let forest = Forest::new(MemoryStore::new());
        let root = build_map(&forest).await;
        let got = scan_keys(
            &forest,
            &root,
            ScanOptions::new()
                .le("k02".to_string())
                .gt("k08".to_string()),
        )
        .await;
        assert_eq!(got, keys(2..8));
    }

    #[tokio::test]
    async fn list_scan_yields_values() {
        let forest = Forest::new(MemoryStore::new());
        let root = build_list(&forest).await;
        let entries = Scan::<_, _, _, Unkeyed>::new(&forest, &root, ScanOptions::new().lo(2).hi(9))
            .await
            .unwrap()
            .collect()
            .await
            .unwrap();
        let got: Vec<ContentId> = entries.into_iter().map(|e| e.value).collect();
        let expect: Vec<ContentId> = (2..9).map(value_id).collect();
        assert_eq!(got, expect);
    }

    #[tokio::test]
    async fn empty_root_scans_empty() {
        let forest = Forest::new(MemoryStore::new());
        let root = forest.save(&Node::<String>::empty_leaf()).await.unwrap();
        assert_eq!(
            scan_keys(&forest, &root, ScanOptions::new()).await,
            Vec::<String>::new()
        );
    }
}
