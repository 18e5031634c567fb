//! Wire protocol for the store bridge.
//!
//! Inbound frames are JSON arrays of `[key, value]` pairs, where a value is
//! either a string or an array of arrays of strings/numbers:
//!
//! ```json
//! [["robot::q", [["0", "0"]]], ["robot::status", "running"]]
//! ```
//!
//! Outbound update frames are single objects: `{"key": ..., "value": ...}`.
//! The bridge does not acknowledge updates; accepted writes come back later
//! as ordinary push pairs.

use serde::Serialize;

use kvgrid_core::prelude::*;

/// One raw `(key, value)` pair from a push batch. The value is left as raw
/// JSON; shape classification happens per pair during reconciliation so that
/// one malformed value cannot poison the rest of its batch.
#[derive(Debug, Clone, PartialEq)]
pub struct RawPair {
    pub key: String,
    pub value: serde_json::Value,
}

/// Outbound update frame.
#[derive(Debug, Serialize)]
struct UpdateFrame<'a> {
    key: &'a str,
    value: &'a serde_json::Value,
}

/// Parse an inbound push frame into its `(key, value)` pairs.
///
/// # Errors
///
/// Returns [`Error::Protocol`] when the frame is not a JSON array of
/// two-element `[string, value]` pairs. Value shape is not validated here.
pub fn parse_push(text: &str) -> Result<Vec<RawPair>> {
    let frame: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| Error::protocol(format!("push frame is not JSON: {e}")))?;

    let pairs = frame
        .as_array()
        .ok_or_else(|| Error::protocol("push frame is not an array"))?;

    let mut batch = Vec::with_capacity(pairs.len());
    for (i, pair) in pairs.iter().enumerate() {
        let tuple = pair
            .as_array()
            .filter(|t| t.len() == 2)
            .ok_or_else(|| Error::protocol(format!("pair {i} is not a [key, value] tuple")))?;
        let key = tuple[0]
            .as_str()
            .ok_or_else(|| Error::protocol(format!("pair {i} key is not a string")))?;
        batch.push(RawPair {
            key: key.to_string(),
            value: tuple[1].clone(),
        });
    }
    Ok(batch)
}

/// Encode an outbound `(key, value)` update as a text frame.
pub fn encode_update(key: &str, value: &serde_json::Value) -> String {
    // Serialization of a string/array tree cannot fail.
    serde_json::to_string(&UpdateFrame { key, value }).unwrap_or_default()
}
