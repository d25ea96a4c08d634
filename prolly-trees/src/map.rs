//! Key-ordered persistent map.

use crate::builder;
use crate::level::Level;
use crate::rebuild::rebuild;
use prolly_core::codec::{Codec, DagJson};
use prolly_core::hasher::{Hasher, Sha2_256};
use prolly_core::node::{find_pred, Entry, Node, TreeKey};
use prolly_core::range::{Scan, ScanOptions};
use prolly_core::storage::BlockStore;
use prolly_core::{ContentId, Forest, Result};
use std::marker::PhantomData;

/// A key-ordered map from comparable keys to opaque value handles,
/// persisted as a canonical content-addressed tree.
///
/// Like the list, every mutation returns a new root and equal contents
/// mean equal roots — a map reached by any sequence of upserts and
/// removals has the same id as one built from its entries in one shot.
#[derive(Debug, Clone)]
pub struct OrderedMap<K, S, C = DagJson, H = Sha2_256> {
    forest: Forest<S, C, H>,
    _key: PhantomData<fn() -> K>,
}

impl<K: TreeKey, S: BlockStore, C: Codec, H: Hasher> OrderedMap<K, S, C, H> {
    /// Create a map handle over `forest`.
    pub fn new(forest: Forest<S, C, H>) -> Self {
        Self {
            forest,
            _key: PhantomData,
        }
    }

    /// Borrow the underlying forest.
    pub fn forest(&self) -> &Forest<S, C, H> {
        &self.forest
    }

    /// Build a new map from `entries` and return its root.
    ///
    /// Entries are sorted by key first; duplicate keys resolve last-wins,
    /// matching the effect of replaying them through [`Self::upsert`].
    pub async fn create(&self, entries: &[(K, ContentId)]) -> Result<ContentId> {
        let mut entries = entries.to_vec();
        entries.sort_by(|a, b| a.0.cmp(&b.0));
        let mut keys: Vec<K> = Vec::with_capacity(entries.len());
        let mut values: Vec<ContentId> = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            if keys.last() == Some(&key) {
                *values.last_mut().expect("value present") = value;
            } else {
                keys.push(key);
                values.push(value);
            }
        }
        builder::build(&self.forest, keys, values).await
    }

    /// Entry count.
    pub async fn size(&self, root: &ContentId) -> Result<u64> {
        self.forest.size::<K>(root).await
    }

    /// The entry at rank `index`, or `None` past the end.
    pub async fn at(&self, root: &ContentId, index: u64) -> Result<Option<Entry<K>>> {
        Ok(self
            .forest
            .rank::<K>(root, index)
            .await?
            .map(|(key, value)| Entry::new(key, value)))
    }

    /// The value under `key`, or `None` when absent.
    pub async fn eq(&self, root: &ContentId, key: &K) -> Result<Option<ContentId>> {
        self.forest.lookup(root, key).await
    }

    /// Open a lazy cursor honoring rank bounds, key bounds, and limit.
    pub async fn scan(
        &self,
        root: &ContentId,
        options: ScanOptions<K>,
    ) -> Result<Scan<'_, S, C, H, K>> {
        Scan::new(&self.forest, root, options).await
    }

    /// Insert or replace the entry for `key`, returning the new root.
    pub async fn upsert(&self, root: &ContentId, key: K, value: ContentId) -> Result<ContentId> {
        let mut node: Node<K> = self.forest.load(root).await?;
        tracing::debug!(key = ?key, "map upsert");
        let mut path: Vec<Level<K>> = Vec::new();
        loop {
            if node.leaf {
                let (start, end) = match find_pred(&node.keys, &key) {
                    Some(i) if node.keys[i] == key => (i, i + 1),
                    Some(i) => (i + 1, i + 1),
                    None => (0, 0),
                };
                path.push(Level::from_node(node, start, end));
                break;
            }
            let i = find_pred(&node.keys, &key).unwrap_or(0);
            let child = node.children[i].clone();
            path.push(Level::from_node(node, i, i + 1));
            node = self.forest.load(&child).await?;
        }

        let mut levels = Vec::with_capacity(path.len() + 1);
        levels.push(Level::payload(vec![key], vec![value]));
        levels.extend(path.into_iter().rev());
        rebuild(&self.forest, levels).await
    }

    /// Remove the entry for `key`, returning the new root.
    ///
    /// Removing an absent key is a no-op that returns the original root.
    pub async fn remove(&self, root: &ContentId, key: &K) -> Result<ContentId> {
        let mut node: Node<K> = self.forest.load(root).await?;
        let mut path: Vec<Level<K>> = Vec::new();
        loop {
            if node.leaf {
                let window = match find_pred(&node.keys, key) {
                    Some(i) if node.keys[i] == *key => (i, i + 1),
                    _ => return Ok(root.clone()),
                };
                path.push(Level::from_node(node, window.0, window.1));
                break;
            }
            let i = find_pred(&node.keys, key).unwrap_or(0);
            let child = node.children[i].clone();
            path.push(Level::from_node(node, i, i + 1));
            node = self.forest.load(&child).await?;
        }
        tracing::debug!(key = ?key, "map remove");

        let mut levels = Vec::with_capacity(path.len() + 1);
        levels.push(Level::payload(Vec::new(), Vec::new()));
        levels.extend(path.into_iter().rev());
        rebuild(&self.forest, levels).await
    }
}
