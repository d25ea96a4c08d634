//! Hasher trait and the SHA2-256 reference implementation.
//!
//! The hasher decides how block bytes become multihash digests. The trait is
//! deliberately tiny: a multicodec name, the multihash code that goes into
//! the CID, and the digest function itself. Everything else (CID assembly,
//! storage layout) lives elsewhere.

use sha2::Digest;
use std::fmt::Debug;

/// SHA2-256 multihash code (standard).
pub const SHA2_256_CODE: u64 = 0x12;

/// Maps bytes to a digest for content addressing.
///
/// Implementations must be deterministic; the same bytes must always hash to
/// the same digest, or content addressing falls apart.
pub trait Hasher: Debug + Send + Sync {
    /// Multihash name (e.g., `"sha2-256"`).
    fn name(&self) -> &'static str;

    /// Multihash code stored in CIDs produced with this hasher.
    fn code(&self) -> u64;

    /// Hash `bytes` to a digest.
    fn digest(&self, bytes: &[u8]) -> Vec<u8>;
}

/// SHA2-256, the default hasher.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sha2_256;

impl Hasher for Sha2_256 {
    fn name(&self) -> &'static str {
        "sha2-256"
    }

    fn code(&self) -> u64 {
        SHA2_256_CODE
    }

    fn digest(&self, bytes: &[u8]) -> Vec<u8> {
        sha2::Sha256::digest(bytes).to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sha2_256_digest_is_32_bytes() {
        let h = Sha2_256;
        assert_eq!(h.digest(b"x").len(), 32);
        assert_eq!(h.code(), 0x12);
    }

    #[test]
    fn deterministic() {
        let h = Sha2_256;
        assert_eq!(h.digest(b"abc"), h.digest(b"abc"));
        assert_ne!(h.digest(b"abc"), h.digest(b"abd"));
    }
}
