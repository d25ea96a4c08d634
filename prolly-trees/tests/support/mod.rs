//! Shared helpers for the integration suites.

use prolly_core::{ContentId, Forest, MemoryStore, Node, TreeKey};
use sha2::Digest;

/// Multicodec for raw payload bytes; the values stored in collections are
/// opaque handles, so any codec works.
const RAW: u64 = 0x55;
const SHA2_256: u64 = 0x12;

/// Deterministic opaque value handle for test element `n`.
pub fn value_id(n: u64) -> ContentId {
    let digest = sha2::Sha256::digest(n.to_le_bytes());
    ContentId::from_parts(RAW, SHA2_256, &digest).unwrap()
}

/// A run of deterministic value handles.
pub fn value_ids(range: std::ops::Range<u64>) -> Vec<ContentId> {
    range.map(value_id).collect()
}

/// Walk the whole tree under `root`, asserting the structural invariants:
/// every parent count equals its child's subtree total, every recorded key
/// is the minimum of its subtree, and leaf counts are all 1 (checked by
/// node validation on load). Returns the number of elements seen at the
/// leaves, which must equal the advertised size.
pub async fn check_tree<K: TreeKey>(forest: &Forest<MemoryStore>, root: &ContentId) -> u64 {
    let mut stack: Vec<(ContentId, Option<u32>, Option<K>)> = vec![(root.clone(), None, None)];
    let mut elements = 0u64;
    while let Some((id, want_count, want_min)) = stack.pop() {
        let node: Node<K> = forest.load(&id).await.unwrap();
        if let Some(want) = want_count {
            assert_eq!(node.total(), want as u64, "stale subtree count at {id}");
        }
        if K::KEYED {
            if let Some(want) = &want_min {
                assert_eq!(
                    node.keys.first(),
                    Some(want),
                    "parent key is not the subtree minimum at {id}"
                );
            }
        }
        if node.leaf {
            elements += node.len() as u64;
        } else {
            assert!(!node.is_empty(), "empty branch node at {id}");
            for i in 0..node.len() {
                stack.push((
                    node.children[i].clone(),
                    Some(node.counts[i]),
                    node.keys.get(i).cloned(),
                ));
            }
        }
    }
    elements
}
