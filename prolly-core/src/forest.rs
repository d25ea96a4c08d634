//! The interpretation context for tree roots.
//!
//! A root CID means nothing on its own; it is read through a block store,
//! a codec, and a hasher. [`Forest`] bundles the three and provides node
//! persistence plus the point read path (size, rank access, key lookup).
//! Collection values stay plain CIDs — a forest can interpret any number
//! of roots, and old roots remain valid forever.
//!
//! Async appears only at the I/O seam: every `load`/`save` suspends at the
//! store, and traversal between loads is synchronous.

use crate::codec::{Codec, DagJson};
use crate::content_id::ContentId;
use crate::error::Result;
use crate::hasher::{Hasher, Sha2_256};
use crate::node::{find_pred, Node, TreeKey};
use crate::serde::json::{node_from_value, node_to_value};
use crate::storage::{Block, BlockStore};

/// Store + codec + hasher: everything needed to read and write nodes.
#[derive(Debug, Clone)]
pub struct Forest<S, C = DagJson, H = Sha2_256> {
    store: S,
    codec: C,
    hasher: H,
}

impl<S: BlockStore> Forest<S> {
    /// Create a forest over `store` with the default DAG-JSON codec and
    /// SHA2-256 hasher.
    pub fn new(store: S) -> Self {
        Self {
            store,
            codec: DagJson,
            hasher: Sha2_256,
        }
    }
}

impl<S: BlockStore, C: Codec, H: Hasher> Forest<S, C, H> {
    /// Create a forest with explicit codec and hasher.
    pub fn with_parts(store: S, codec: C, hasher: H) -> Self {
        Self {
            store,
            codec,
            hasher,
        }
    }

    /// Borrow the underlying block store.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Encode `node`, derive its CID, and persist the block.
    ///
    /// The returned id is a pure function of the node's content — saving an
    /// equal node from any other history yields the same id.
    pub async fn save<K: TreeKey>(&self, node: &Node<K>) -> Result<ContentId> {
        let value = node_to_value(node)?;
        let bytes = self.codec.encode(&value)?;
        let digest = self.hasher.digest(&bytes);
        let id = ContentId::from_parts(self.codec.code(), self.hasher.code(), &digest)?;
        self.store.put(&Block::new(id.clone(), bytes)).await?;
        tracing::trace!(id = %id.digest_hex(), children = node.len(), leaf = node.leaf, "saved node");
        Ok(id)
    }

    /// Fetch and parse the node behind `id`, validating its shape.
    pub async fn load<K: TreeKey>(&self, id: &ContentId) -> Result<Node<K>> {
        let block = self.store.get(id).await?;
        let value = self.codec.decode(&block.data)?;
        node_from_value(&value)
    }

    /// Element count of the collection rooted at `root`.
    pub async fn size<K: TreeKey>(&self, root: &ContentId) -> Result<u64> {
        Ok(self.load::<K>(root).await?.total())
    }

    /// The element at `rank`, as `(key, value)`, or `None` past the end.
    ///
    /// Unkeyed trees get the unit key back; keyed trees get the element's
    /// real key.
    pub async fn rank<K: TreeKey>(
        &self,
        root: &ContentId,
        rank: u64,
    ) -> Result<Option<(K, ContentId)>> {
        let mut node: Node<K> = self.load(root).await?;
        if rank >= node.total() {
            return Ok(None);
        }
        let mut remaining = rank;
        loop {
            let (i, residual) = node.seek(remaining);
            if node.leaf {
                return Ok(Some((
                    K::column_key(&node.keys, i),
                    node.children[i].clone(),
                )));
            }
            remaining = residual;
            let child = node.children[i].clone();
            node = self.load(&child).await?;
        }
    }

    /// The value stored under `key`, or `None` when absent.
    pub async fn lookup<K: TreeKey>(&self, root: &ContentId, key: &K) -> Result<Option<ContentId>> {
        let mut node: Node<K> = self.load(root).await?;
        loop {
            let Some(i) = find_pred(&node.keys, key) else {
                return Ok(None);
            };
            if node.leaf {
                return Ok((node.keys[i] == *key).then(|| node.children[i].clone()));
            }
            let child = node.children[i].clone();
            node = self.load(&child).await?;
        }
    }
}
