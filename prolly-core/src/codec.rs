//! Codec trait and the DAG-JSON reference implementation.
//!
//! A codec turns the in-memory node value (a `serde_json::Value` tuple —
//! see [`crate::serde::json`]) into the block bytes that get hashed and
//! stored, and back. The codec's multicodec value is recorded in every CID
//! it produces, so blocks are self-describing.
//!
//! Determinism matters here the same way it does for the hasher: the byte
//! output for a given value must be stable across runs and platforms, or
//! logically equal collections stop sharing roots. DAG-JSON over array
//! payloads satisfies this — `serde_json` emits arrays in order with no
//! discretionary whitespace.

use crate::error::Result;
use serde_json::Value;
use std::fmt::Debug;

/// Multicodec value for DAG-JSON.
pub const DAG_JSON_CODE: u64 = 0x0129;

/// Encodes and decodes node payload values.
pub trait Codec: Debug + Send + Sync {
    /// Codec name (e.g., `"dag-json"`).
    fn name(&self) -> &'static str;

    /// Multicodec value stored in CIDs produced with this codec.
    fn code(&self) -> u64;

    /// Encode a payload value to block bytes.
    fn encode(&self, value: &Value) -> Result<Vec<u8>>;

    /// Decode block bytes back to a payload value.
    fn decode(&self, bytes: &[u8]) -> Result<Value>;
}

/// DAG-JSON, the default codec.
#[derive(Debug, Clone, Copy, Default)]
pub struct DagJson;

impl Codec for DagJson {
    fn name(&self) -> &'static str {
        "dag-json"
    }

    fn code(&self) -> u64 {
        DAG_JSON_CODE
    }

    fn encode(&self, value: &Value) -> Result<Vec<u8>> {
        Ok(serde_json::to_vec(value)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<Value> {
        Ok(serde_json::from_slice(bytes)?)
    }
}
