//! Content identifier (CIDv1) for storage-agnostic node identity.
//!
//! `ContentId` wraps a CIDv1 from the multiformats ecosystem. The multicodec
//! value records which codec produced the block's bytes; the multihash
//! records which hasher derived its digest. Two nodes with equal bytes under
//! the same (codec, hasher) pair always share a `ContentId` — the property
//! every canonicalization guarantee in this workspace rests on.
//!
//! ## String form
//!
//! The canonical string representation is **base32-lower** (multibase),
//! producing the familiar `bafy...` prefixes. This is what appears in node
//! payloads, logs, and APIs.
//!
//! ## Binary form
//!
//! The compact binary form is the standard CID binary encoding
//! (varint version + varint codec + multihash bytes).

use crate::error::{Error, Result};
use cid::Cid;
use multihash::Multihash;
use std::fmt;
use std::str::FromStr;

/// Content identifier wrapping CIDv1 (multiformats).
///
/// The canonical identity for every immutable tree node, and the opaque
/// value handle callers store inside collections.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct ContentId(Cid);

impl ContentId {
    /// Build a `ContentId` from a multicodec value, a multihash code, and a
    /// raw digest.
    ///
    /// Fails with [`Error::Hasher`] when the digest does not fit the
    /// multihash size bound (digests up to 64 bytes are accepted).
    pub fn from_parts(codec: u64, hash_code: u64, digest: &[u8]) -> Result<Self> {
        let mh = Multihash::<64>::wrap(hash_code, digest)
            .map_err(|e| Error::hasher(format!("digest does not fit multihash: {e}")))?;
        Ok(Self(Cid::new_v1(codec, mh)))
    }

    /// Wrap an existing `Cid` as a `ContentId`.
    pub fn from_cid(cid: Cid) -> Self {
        Self(cid)
    }

    /// Borrow the inner `Cid`.
    pub fn as_cid(&self) -> &Cid {
        &self.0
    }

    /// The multicodec value stored in this CID.
    pub fn codec(&self) -> u64 {
        self.0.codec()
    }

    /// The multihash code stored in this CID.
    pub fn hash_code(&self) -> u64 {
        self.0.hash().code()
    }

    /// Serialize to the standard CID binary form.
    pub fn to_bytes(&self) -> Vec<u8> {
        self.0.to_bytes()
    }

    /// Parse from CID binary bytes.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let cid = Cid::try_from(bytes).map_err(|e| Error::invalid_id(format!("{e}")))?;
        Ok(Self(cid))
    }

    /// The last four bytes of the canonical binary form, little-endian.
    ///
    /// This is the pre-randomized token the chunker folds into its rolling
    /// fingerprint — the tail of the digest, so it is uniformly distributed
    /// for any real hash function.
    pub fn suffix_u32(&self) -> u32 {
        let bytes = self.0.to_bytes();
        debug_assert!(bytes.len() >= 4, "CID binary form shorter than 4 bytes");
        let n = bytes.len();
        u32::from_le_bytes([bytes[n - 4], bytes[n - 3], bytes[n - 2], bytes[n - 1]])
    }

    /// Re-hash `bytes` with `digest_fn` and check that the result matches
    /// this CID's multihash digest.
    ///
    /// Use this when accepting blocks from untrusted sources.
    pub fn verify_digest(&self, digest: &[u8]) -> bool {
        self.0.hash().digest() == digest
    }

    /// The hex-encoded multihash digest (without the code/length prefix).
    ///
    /// Useful in log lines where the full base32 form is noise.
    pub fn digest_hex(&self) -> String {
        hex::encode(self.0.hash().digest())
    }
}

// ============================================================================
// Display / FromStr / Debug
// ============================================================================

impl fmt::Display for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // CIDv1 Display uses base32-lower by default.
        write!(f, "{}", self.0)
    }
}

impl fmt::Debug for ContentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ContentId({})", self.0)
    }
}

impl FromStr for ContentId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let cid = Cid::try_from(s).map_err(|e| Error::invalid_id(format!("{e}")))?;
        Ok(Self(cid))
    }
}

// ============================================================================
// Ord / PartialOrd (canonical byte ordering)
// ============================================================================

impl PartialOrd for ContentId {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for ContentId {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.to_bytes().cmp(&other.to_bytes())
    }
}

// ============================================================================
// Serde (human-readable: string, binary: CID bytes)
// ============================================================================

impl serde::Serialize for ContentId {
    fn serialize<S: serde::Serializer>(
        &self,
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        if serializer.is_human_readable() {
            serializer.serialize_str(&self.to_string())
        } else {
            serializer.serialize_bytes(&self.to_bytes())
        }
    }
}

impl<'de> serde::Deserialize<'de> for ContentId {
    fn deserialize<D: serde::Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            let s = String::deserialize(deserializer)?;
            ContentId::from_str(&s).map_err(serde::de::Error::custom)
        } else {
            let bytes = <Vec<u8>>::deserialize(deserializer)?;
            ContentId::from_bytes(&bytes).map_err(serde::de::Error::custom)
        }
    }
}

// ============================================================================
// Tests
// ============================================================================
