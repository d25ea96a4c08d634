//! # Prolly Core
//!
//! Runtime-agnostic core for canonical, functionally persistent,
//! content-addressed tree collections.
//!
//! This crate provides:
//! - Content identity: `ContentId` (CIDv1), `Hasher`, `Codec`
//! - The `BlockStore` seam and an in-memory reference store
//! - The shared node model (`Node`, `TreeKey`) and wire format
//! - Content-defined chunking of child runs
//! - The read path: `Forest` (size, rank access, key lookup) and the
//!   range-scan cursor
//!
//! Tree construction and mutation live in the `prolly-trees` crate.
//!
//! ## Design Principles
//!
//! 1. **Runtime-agnostic**: No tokio, no forced executor; async only at
//!    the block-store seam
//! 2. **Canonical by construction**: node identity is a pure function of
//!    content, and node boundaries are a pure function of child ids
//! 3. **Roots are values**: every operation takes a root CID and never
//!    invalidates old roots
//!
//! ## Example
//!
//! ```ignore
//! use prolly_core::{Forest, MemoryStore, ScanOptions, Scan};
//!
//! let forest = Forest::new(MemoryStore::new());
//! let size = forest.size::<String>(&root).await?;
//! let hit = forest.lookup(&root, &"some-key".to_string()).await?;
//! ```

pub mod chunker;
pub mod codec;
pub mod content_id;
pub mod error;
pub mod forest;
pub mod hasher;
pub mod node;
pub mod range;
pub mod serde;
pub mod storage;

// Re-export main types
pub use chunker::{find_boundary, next_boundary, Boundary, MAX_CHILDREN, MIN_CHILDREN};
pub use codec::{Codec, DagJson, DAG_JSON_CODE};
pub use content_id::ContentId;
pub use error::{Error, Result};
pub use forest::Forest;
pub use hasher::{Hasher, Sha2_256, SHA2_256_CODE};
pub use node::{find_pred, Entry, Node, TreeKey, Unkeyed};
pub use range::{Scan, ScanOptions};
pub use storage::{Block, BlockStore, MemoryStore};

/// Prelude module for convenient imports of the trait seams and common
/// types.
///
/// # Example
///
/// ```ignore
/// use prolly_core::prelude::*;
/// ```
pub mod prelude {
    pub use crate::codec::{Codec, DagJson};
    pub use crate::content_id::ContentId;
    pub use crate::error::{Error, Result};
    pub use crate::forest::Forest;
    pub use crate::hasher::{Hasher, Sha2_256};
    pub use crate::node::{Entry, Node, TreeKey, Unkeyed};
    pub use crate::range::{Scan, ScanOptions};
    pub use crate::storage::{Block, BlockStore, MemoryStore};
}
