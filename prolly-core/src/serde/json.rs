//! JSON-value serialization and deserialization for tree nodes.
//!
//! On the wire a node is a positional tuple, not an object:
//!
//! - unkeyed (list) node: `[leaf, counts, children]`
//! - keyed (map) node:    `[leaf, counts, keys, children]`
//!
//! Children are canonical CID strings so the payload survives any codec
//! that can carry JSON-shaped values; counts are non-negative 32-bit
//! integers; keys are the key type's native serde representation. Parsing
//! is hand-rolled rather than derived so every malformed shape is rejected
//! with a message naming the offense.

use crate::content_id::ContentId;
use crate::error::{Error, Result};
use crate::node::{Node, TreeKey};
use serde_json::Value;
use std::str::FromStr;

/// Convert a node to its wire value.
pub fn node_to_value<K: TreeKey>(node: &Node<K>) -> Result<Value> {
    let counts = Value::Array(
        node.counts
            .iter()
            .map(|&c| Value::Number(c.into()))
            .collect(),
    );
    let children = Value::Array(
        node.children
            .iter()
            .map(|c| Value::String(c.to_string()))
            .collect(),
    );
    let mut tuple = vec![Value::Bool(node.leaf), counts];
    if K::KEYED {
        let keys = node
            .keys
            .iter()
            .map(|k| serde_json::to_value(k).map_err(Error::from))
            .collect::<Result<Vec<_>>>()?;
        tuple.push(Value::Array(keys));
    }
    tuple.push(children);
    Ok(Value::Array(tuple))
}

/// Parse a wire value back into a node, validating its shape.
pub fn node_from_value<K: TreeKey>(value: &Value) -> Result<Node<K>> {
    let arr = value
        .as_array()
        .ok_or_else(|| Error::invalid_node("payload is not an array"))?;
    let expected = if K::KEYED { 4 } else { 3 };
    if arr.len() != expected {
        return Err(Error::invalid_node(format!(
            "payload has {} elements, expected {}",
            arr.len(),
            expected
        )));
    }

    let leaf = arr[0]
        .as_bool()
        .ok_or_else(|| Error::invalid_node("leaf flag is not a boolean"))?;

    let counts = arr[1]
        .as_array()
        .ok_or_else(|| Error::invalid_node("counts is not an array"))?
        .iter()
        .map(parse_count)
        .collect::<Result<Vec<u32>>>()?;

    let keys = if K::KEYED {
        arr[2]
            .as_array()
            .ok_or_else(|| Error::invalid_node("keys is not an array"))?
            .iter()
            .map(|v| {
                serde_json::from_value::<K>(v.clone())
                    .map_err(|e| Error::invalid_node(format!("bad key: {e}")))
            })
            .collect::<Result<Vec<K>>>()?
    } else {
        Vec::new()
    };

    let children = arr[expected - 1]
        .as_array()
        .ok_or_else(|| Error::invalid_node("children is not an array"))?
        .iter()
        .map(parse_child)
        .collect::<Result<Vec<ContentId>>>()?;

    let node = Node {
        leaf,
        counts,
        keys,
        children,
    };
    node.validate()?;
    Ok(node)
}

fn parse_count(value: &Value) -> Result<u32> {
    let n = value
        .as_u64()
        .ok_or_else(|| Error::invalid_node("count is not a non-negative integer"))?;
    u32::try_from(n).map_err(|_| Error::invalid_node(format!("count {n} exceeds u32")))
}

fn parse_child(value: &Value) -> Result<ContentId> {
    let s = value
        .as_str()
        .ok_or_else(|| Error::invalid_node("child is not a CID string"))?;
    ContentId::from_str(s).map_err(|e| Error::invalid_node(format!("bad child CID: {e}")))
}
