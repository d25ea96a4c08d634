//! Rank-addressed persistent list.

use crate::builder;
use crate::level::{extend_level, Level};
use crate::rebuild::rebuild;
use prolly_core::codec::{Codec, DagJson};
use prolly_core::hasher::{Hasher, Sha2_256};
use prolly_core::node::{Node, Unkeyed};
use prolly_core::range::{Scan, ScanOptions};
use prolly_core::storage::BlockStore;
use prolly_core::{ContentId, Error, Forest, Result};

/// An ordered sequence addressed by position, persisted as a canonical
/// content-addressed tree.
///
/// Every mutating operation returns a new root id; old roots stay valid.
/// Two lists holding the same elements in the same order share a root id
/// no matter which edits produced them.
#[derive(Debug, Clone)]
pub struct IndexedList<S, C = DagJson, H = Sha2_256> {
    forest: Forest<S, C, H>,
}

impl<S: BlockStore, C: Codec, H: Hasher> IndexedList<S, C, H> {
    /// Create a list handle over `forest`.
    pub fn new(forest: Forest<S, C, H>) -> Self {
        Self { forest }
    }

    /// Borrow the underlying forest.
    pub fn forest(&self) -> &Forest<S, C, H> {
        &self.forest
    }

    /// Build a new list from `items` and return its root.
    pub async fn create(&self, items: &[ContentId]) -> Result<ContentId> {
        builder::build::<Unkeyed, _, _, _>(&self.forest, Vec::new(), items.to_vec()).await
    }

    /// Element count.
    pub async fn size(&self, root: &ContentId) -> Result<u64> {
        self.forest.size::<Unkeyed>(root).await
    }

    /// The element at `index`; fails with [`Error::OutOfBounds`] past the
    /// end.
    pub async fn at(&self, root: &ContentId, index: u64) -> Result<ContentId> {
        match self.forest.rank::<Unkeyed>(root, index).await? {
            Some((_, value)) => Ok(value),
            None => {
                let size = self.forest.size::<Unkeyed>(root).await?;
                Err(Error::out_of_bounds(index, size))
            }
        }
    }

    /// Open a lazy cursor over `[lo, hi)`, optionally limited.
    ///
    /// Key-based options have no meaning for lists and are ignored.
    pub async fn scan(
        &self,
        root: &ContentId,
        options: ScanOptions<Unkeyed>,
    ) -> Result<ListScan<'_, S, C, H>> {
        Ok(ListScan {
            inner: Scan::new(&self.forest, root, options).await?,
        })
    }

    /// Remove `delete_count` elements at `start` and insert `items` there,
    /// returning the new root.
    ///
    /// `start` may equal the size (append); `delete_count` past the end is
    /// clamped. `start` beyond the size fails with
    /// [`Error::OutOfBounds`].
    pub async fn splice(
        &self,
        root: &ContentId,
        start: u64,
        delete_count: u64,
        items: &[ContentId],
    ) -> Result<ContentId> {
        let root_node: Node<Unkeyed> = self.forest.load(root).await?;
        let size = root_node.total();
        if start > size {
            return Err(Error::out_of_bounds(start, size));
        }
        if root_node.is_empty() {
            // Splicing into the empty list is plain construction.
            return self.create(items).await;
        }
        tracing::debug!(start, delete_count, insert = items.len(), "list splice");

        // Descend to the edit point, staging a window along the path.
        let mut path: Vec<Level<Unkeyed>> = Vec::new();
        let mut node = root_node;
        let mut ptr = start;
        loop {
            let (i, residual) = node.seek(ptr);
            if node.leaf {
                // Landing exactly past the last element means insert after
                // it; everywhere else the position is the element itself.
                let at = if residual == node.counts[i] as u64 {
                    i + 1
                } else {
                    i
                };
                path.push(Level::from_node(node, at, at));
                break;
            }
            let child = node.children[i].clone();
            path.push(Level::from_node(node, i, i + 1));
            node = self.forest.load(&child).await?;
            ptr = residual;
        }

        let mut levels = Vec::with_capacity(path.len() + 1);
        levels.push(Level::payload(Vec::new(), items.to_vec()));
        levels.extend(path.into_iter().rev());

        // Widen the leaf window to cover the deletion range, absorbing
        // right-hand siblings; exhaustion clamps the range to the tree.
        let target = (levels[1].start as u64).saturating_add(delete_count);
        while (levels[1].len() as u64) < target {
            if !extend_level(&self.forest, &mut levels, 1).await? {
                break;
            }
        }
        levels[1].end = target.min(levels[1].len() as u64) as usize;

        rebuild(&self.forest, levels).await
    }
}

/// Lazy cursor over a list scan, yielding element ids in rank order.
pub struct ListScan<'a, S, C, H> {
    inner: Scan<'a, S, C, H, Unkeyed>,
}

impl<S: BlockStore, C: Codec, H: Hasher> ListScan<'_, S, C, H> {
    /// Yield the next element id, or `None` when exhausted.
    pub async fn next(&mut self) -> Result<Option<ContentId>> {
        Ok(self.inner.next().await?.map(|entry| entry.value))
    }

    /// Drain the cursor into a vector.
    pub async fn collect(mut self) -> Result<Vec<ContentId>> {
        let mut out = Vec::new();
        while let Some(id) = self.next().await? {
            out.push(id);
        }
        Ok(out)
    }
}
