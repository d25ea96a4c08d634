//! Wire-format conversion for node payloads.

pub mod json;
