//! Block store traits and the in-memory reference implementation.
//!
//! This module defines the storage seam the host must implement to hold
//! node blocks. The trait is runtime-agnostic and uses `async_trait` for
//! async support.
//!
//! Blocks are immutable `(id, bytes)` pairs whose id is derived from the
//! bytes, so `put` is idempotent by construction: writing the same block
//! twice is a no-op from the reader's point of view. This library performs
//! no internal locking; the store must be safe for concurrent `put`/`get`
//! from the caller's perspective.
//!
//! ## Example
//!
//! ```ignore
//! use prolly_core::{Block, BlockStore};
//!
//! struct MyStore { /* ... */ }
//!
//! #[async_trait]
//! impl BlockStore for MyStore {
//!     async fn put(&self, block: &Block) -> Result<()> { /* ... */ }
//!     async fn get(&self, id: &ContentId) -> Result<Block> { /* ... */ }
//!     async fn has(&self, id: &ContentId) -> Result<bool> { /* ... */ }
//! }
//! ```

use crate::content_id::ContentId;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, RwLock};

// ============================================================================
// Block
// ============================================================================

/// An immutable pair of content id and bytes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    /// Content id derived from `data` under some (hasher, codec) pair.
    pub id: ContentId,
    /// The encoded payload.
    pub data: Vec<u8>,
}

impl Block {
    /// Create a new block.
    pub fn new(id: ContentId, data: Vec<u8>) -> Self {
        Self { id, data }
    }
}

// ============================================================================
// BlockStore trait
// ============================================================================

/// Content-addressed block storage.
#[async_trait]
pub trait BlockStore: Debug + Send + Sync {
    /// Store a block. Idempotent: re-putting an existing id succeeds.
    ///
    /// Durability contract: once `put` returns, a subsequent `get` of the
    /// same id must succeed.
    async fn put(&self, block: &Block) -> Result<()>;

    /// Retrieve a block by id.
    ///
    /// Fails with [`Error::NotFound`] when the store holds no such block.
    async fn get(&self, id: &ContentId) -> Result<Block>;

    /// Check whether a block exists without fetching its bytes.
    async fn has(&self, id: &ContentId) -> Result<bool>;
}

// ============================================================================
// MemoryStore
// ============================================================================

/// A simple in-memory block store for testing
///
/// This implementation stores data in a HashMap with interior mutability
/// (via `Arc<RwLock<...>>`) to support both reading and writing through
/// `&self`. Cloning shares the underlying map.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    data: Arc<RwLock<HashMap<ContentId, Vec<u8>>>>,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryStore {
    /// Create a new empty memory store
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Number of blocks currently held.
    pub fn len(&self) -> usize {
        self.data.read().expect("RwLock poisoned").len()
    }

    /// True when the store holds no blocks.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl BlockStore for MemoryStore {
    async fn put(&self, block: &Block) -> Result<()> {
        self.data
            .write()
            .expect("RwLock poisoned")
            .insert(block.id.clone(), block.data.clone());
        Ok(())
    }

    async fn get(&self, id: &ContentId) -> Result<Block> {
        self.data
            .read()
            .expect("RwLock poisoned")
            .get(id)
            .cloned()
            .map(|data| Block::new(id.clone(), data))
            .ok_or_else(|| Error::not_found(id.to_string()))
    }

    async fn has(&self, id: &ContentId) -> Result<bool> {
        Ok(self.data.read().expect("RwLock poisoned").contains_key(id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sha2::Digest;

    fn make_block(payload: &[u8]) -> Block {
        let digest = sha2::Sha256::digest(payload);
        let id = ContentId::from_parts(0x0129, 0x12, &digest).unwrap();
        Block::new(id, payload.to_vec())
    }

    #[tokio::test]
    async fn put_then_get() {
        let store = MemoryStore::new();
        let block = make_block(b"some bytes");
        store.put(&block).await.unwrap();
        let got = store.get(&block.id).await.unwrap();
        assert_eq!(got, block);
        assert!(store.has(&block.id).await.unwrap());
    }

    #[tokio::test]
    async fn get_missing_is_not_found() {
        let store = MemoryStore::new();
        let block = make_block(b"never stored");
        assert!(!store.has(&block.id).await.unwrap());
        match store.get(&block.id).await {
            Err(Error::NotFound(_)) => {}
            other => panic!("expected NotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn put_is_idempotent() {
        let store = MemoryStore::new();
        let block = make_block(b"dup");
        store.put(&block).await.unwrap();
        store.put(&block).await.unwrap();
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn clones_share_contents() {
        let store = MemoryStore::new();
        let other = store.clone();
        let block = make_block(b"shared");
        store.put(&block).await.unwrap();
        assert!(other.has(&block.id).await.unwrap());
    }
}
