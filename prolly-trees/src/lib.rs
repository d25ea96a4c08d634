//! # Prolly Trees
//!
//! Canonical, functionally persistent, content-addressed collections over
//! an opaque block store:
//!
//! - [`IndexedList`] — an ordered sequence addressed by position, with
//!   random access, range scans, and splice-based bulk edit.
//! - [`OrderedMap`] — a key-ordered map with point lookup by key or rank,
//!   range scans, and point insert/delete.
//!
//! Both persist as DAGs of immutable nodes keyed by content hash. Node
//! boundaries come from content-defined chunking, so two collections with
//! equal logical contents have byte-identical nodes and the same root id,
//! regardless of the operation history that produced them:
//!
//! ```ignore
//! let a = list.create(&items).await?;
//! let b = list.splice(&empty, 0, 0, &items).await?;
//! assert_eq!(a, b);
//! ```
//!
//! Mutations never touch existing blocks — a new root is returned and
//! every old root keeps working — so a failed or cancelled operation
//! leaves no visible state change behind.
//!
//! The storage, codec, and hashing seams live in `prolly-core` and are
//! re-exported here for convenience.

mod builder;
mod level;
mod list;
mod map;
mod rebuild;

pub use list::{IndexedList, ListScan};
pub use map::OrderedMap;

// Re-export the core surface so most callers need a single dependency.
pub use prolly_core::{
    Block, BlockStore, Codec, ContentId, DagJson, Entry, Error, Forest, Hasher, MemoryStore, Node,
    Result, Scan, ScanOptions, Sha2_256, TreeKey, Unkeyed,
};
