//! Error types for prolly-core

use thiserror::Error;

/// Result type alias using our Error
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type
#[derive(Error, Debug)]
pub enum Error {
    /// Rank addressed past the end of a collection
    #[error("index {index} out of bounds for size {size}")]
    OutOfBounds {
        /// The offending rank
        index: u64,
        /// Element count of the collection at the time of the access
        size: u64,
    },

    /// A stored block decoded into something that is not a well-formed node
    #[error("invalid node: {0}")]
    InvalidNode(String),

    /// Block store has no block for the requested content id
    #[error("not found: {0}")]
    NotFound(String),

    /// Malformed content identifier (string or binary form)
    #[error("invalid content id: {0}")]
    InvalidId(String),

    /// Codec failure (encode or decode)
    #[error("codec error: {0}")]
    Codec(String),

    /// Hasher failure
    #[error("hasher error: {0}")]
    Hasher(String),

    /// Storage-related errors
    #[error("storage error: {0}")]
    Storage(String),

    /// JSON parsing error (serde_json)
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// Create an out-of-bounds error
    pub fn out_of_bounds(index: u64, size: u64) -> Self {
        Error::OutOfBounds { index, size }
    }

    /// Create an invalid node error
    pub fn invalid_node(msg: impl Into<String>) -> Self {
        Error::InvalidNode(msg.into())
    }

    /// Create a not found error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }

    /// Create an invalid content id error
    pub fn invalid_id(msg: impl Into<String>) -> Self {
        Error::InvalidId(msg.into())
    }

    /// Create a codec error
    pub fn codec(msg: impl Into<String>) -> Self {
        Error::Codec(msg.into())
    }

    /// Create a hasher error
    pub fn hasher(msg: impl Into<String>) -> Self {
        Error::Hasher(msg.into())
    }

    /// Create a storage error
    pub fn storage(msg: impl Into<String>) -> Self {
        Error::Storage(msg.into())
    }
}
