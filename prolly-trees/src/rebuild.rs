//! Bottom-up rebuild of a staged mutation.
//!
//! Levels are processed bottom-first. Each round splices the lower level's
//! replacement run into the parent's `[start, end)` window, re-segments
//! the parent's working copy with the chunker, and emits one node per
//! chunk; the emitted run becomes the replacement spliced one level up.
//! When segmentation reports a pending tail, right-hand siblings are
//! absorbed first — this is what keeps the output canonical across the
//! edit seam. Above the staged root, empty parents are synthesized until
//! the rebuilt run is at most one node wide, and a final collapse strips
//! any chain of single-child branches so the result matches what building
//! the same content from scratch would produce.
//!
//! Sibling nodes of a level are serialized as a group: all chunk contents
//! are fixed before any write is issued, and the level above is only
//! touched once every emitted id is known.

use crate::level::{extend_level, Level};
use futures::future::try_join_all;
use prolly_core::chunker::{self, Boundary};
use prolly_core::codec::Codec;
use prolly_core::hasher::Hasher;
use prolly_core::node::{Node, TreeKey};
use prolly_core::storage::BlockStore;
use prolly_core::{ContentId, Error, Forest, Result};

/// Rebuild every staged level and return the new root id.
pub(crate) async fn rebuild<K, S, C, H>(
    forest: &Forest<S, C, H>,
    mut levels: Vec<Level<K>>,
) -> Result<ContentId>
where
    K: TreeKey,
    S: BlockStore,
    C: Codec,
    H: Hasher,
{
    debug_assert!(levels.len() >= 2, "payload and at least one node level");
    let mut i = 0;
    loop {
        if i + 1 == levels.len() {
            levels.push(Level::synthetic_root());
        }

        // Replace the parent's window with the lower level's run.
        {
            let (lower, upper) = levels.split_at_mut(i + 1);
            let child = &lower[i];
            let parent = &mut upper[0];
            parent
                .counts
                .splice(parent.start..parent.end, child.counts.iter().copied());
            if K::KEYED {
                parent
                    .keys
                    .splice(parent.start..parent.end, child.keys.iter().cloned());
            }
            parent
                .children
                .splice(parent.start..parent.end, child.children.iter().cloned());
        }

        let p = i + 1;

        // Re-segment, absorbing siblings while the tail is undecided.
        let mut chunks: Vec<(usize, usize)> = Vec::new();
        let mut pos = 0;
        while pos < levels[p].len() {
            match chunker::find_boundary(&levels[p].children, pos) {
                Boundary::Cut(hi) => {
                    chunks.push((pos, hi));
                    pos = hi;
                }
                Boundary::Pending => {
                    if !extend_level(forest, &mut levels, p).await? {
                        chunks.push((pos, levels[p].len()));
                        pos = levels[p].len();
                    }
                }
            }
        }

        // Emit the level: contents fixed first, then written as a group.
        let leaf = levels[p].leaf;
        let mut nodes = Vec::with_capacity(chunks.len());
        for &(lo, hi) in &chunks {
            let level = &levels[p];
            nodes.push(Node {
                leaf,
                counts: level.counts[lo..hi].to_vec(),
                keys: if K::KEYED {
                    level.keys[lo..hi].to_vec()
                } else {
                    Vec::new()
                },
                children: level.children[lo..hi].to_vec(),
            });
        }
        let ids = try_join_all(nodes.iter().map(|n| forest.save(n))).await?;

        let mut counts = Vec::with_capacity(nodes.len());
        for node in &nodes {
            let total = node.total();
            counts.push(
                u32::try_from(total)
                    .map_err(|_| Error::invalid_node(format!("subtree count {total} exceeds u32")))?,
            );
        }
        let keys: Vec<K> = if K::KEYED {
            nodes.iter().map(|n| n.keys[0].clone()).collect()
        } else {
            Vec::new()
        };

        tracing::debug!(level = p, nodes = ids.len(), "rebuilt level");

        let levels_len = levels.len();
        let level = &mut levels[p];
        level.counts = counts;
        level.keys = keys;
        level.children = ids;

        if p == levels_len - 1 && level.len() <= 1 {
            break;
        }
        i += 1;
    }

    collapse(forest, levels.pop().expect("top level present")).await
}

/// Resolve the rebuilt top level to the canonical root.
///
/// An empty top is the empty collection; otherwise follow the head child
/// down past single-child branches.
async fn collapse<K, S, C, H>(forest: &Forest<S, C, H>, top: Level<K>) -> Result<ContentId>
where
    K: TreeKey,
    S: BlockStore,
    C: Codec,
    H: Hasher,
{
    if top.children.is_empty() {
        return forest.save(&Node::<K>::empty_leaf()).await;
    }
    let mut id = top.children[0].clone();
    loop {
        let node: Node<K> = forest.load(&id).await?;
        if node.leaf || node.len() != 1 {
            return Ok(id);
        }
        id = node.children[0].clone();
    }
}
