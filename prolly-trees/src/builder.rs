//! Canonical bottom-up tree construction.

use futures::future::try_join_all;
use prolly_core::chunker;
use prolly_core::codec::Codec;
use prolly_core::hasher::Hasher;
use prolly_core::node::{Node, TreeKey};
use prolly_core::storage::BlockStore;
use prolly_core::{ContentId, Error, Forest, Result};

/// Build a canonical tree from ordered leaf entries and return its root.
///
/// `keys` is empty for unkeyed trees and parallel to `children` otherwise
/// (sorted, strictly ascending — the collection fronts enforce this).
/// Each round segments the current run with the chunker, writes every
/// chunk node in the run as a group, and rolls the emitted ids up into the
/// next round until a single node remains. Empty input produces the
/// canonical empty leaf; a single entry collapses in one round.
pub(crate) async fn build<K, S, C, H>(
    forest: &Forest<S, C, H>,
    mut keys: Vec<K>,
    mut children: Vec<ContentId>,
) -> Result<ContentId>
where
    K: TreeKey,
    S: BlockStore,
    C: Codec,
    H: Hasher,
{
    if children.is_empty() {
        return forest.save(&Node::<K>::empty_leaf()).await;
    }

    let mut counts: Vec<u32> = vec![1; children.len()];
    let mut leaf = true;
    let mut depth = 0u32;
    loop {
        let mut chunks: Vec<(usize, usize)> = Vec::new();
        let mut pos = 0;
        while pos < children.len() {
            let hi = chunker::next_boundary(&children, pos);
            chunks.push((pos, hi));
            pos = hi;
        }

        let mut nodes = Vec::with_capacity(chunks.len());
        for &(lo, hi) in &chunks {
            nodes.push(Node {
                leaf,
                counts: counts[lo..hi].to_vec(),
                keys: if K::KEYED {
                    keys[lo..hi].to_vec()
                } else {
                    Vec::new()
                },
                children: children[lo..hi].to_vec(),
            });
        }
        let ids = try_join_all(nodes.iter().map(|n| forest.save(n))).await?;
        tracing::debug!(depth, nodes = ids.len(), "built level");

        counts = Vec::with_capacity(nodes.len());
        for node in &nodes {
            let total = node.total();
            counts.push(
                u32::try_from(total)
                    .map_err(|_| Error::invalid_node(format!("subtree count {total} exceeds u32")))?,
            );
        }
        keys = if K::KEYED {
            nodes.iter().map(|n| n.keys[0].clone()).collect()
        } else {
            Vec::new()
        };
        children = ids;
        leaf = false;
        depth += 1;

        if children.len() == 1 {
            return Ok(children.pop().expect("single root"));
        }
    }
}
