//! # Wire Frames
//!
//! A frame is a 2-byte little-endian version marker followed by a bincode
//! body. The marker exists because the boundary has changed shape before
//! without one; decoders reject mismatched versions instead of
//! misinterpreting bytes.
//!
//! Body shapes:
//!
//! - once-operations carry `Result<T, Fault>`;
//! - stream-operations carry [`StreamFrame<T>`], whose `Complete` variant is
//!   the explicit end-of-subscription marker.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use shared_types::Fault;

/// Current wire format version. Bumped on any incompatible body change.
pub const WIRE_VERSION: u16 = 1;

/// Width of the version marker prefixing every frame.
const VERSION_PREFIX_LEN: usize = 2;

/// Failures while encoding or decoding a frame.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WireError {
    /// The buffer is shorter than the version marker.
    #[error("frame is truncated: {len} bytes, need at least {VERSION_PREFIX_LEN}")]
    Truncated { len: usize },

    /// The frame was produced by an incompatible codec revision.
    #[error("wire version mismatch: frame has {found}, codec speaks {WIRE_VERSION}")]
    VersionMismatch { found: u16 },

    /// The body did not decode as the expected shape.
    #[error("malformed frame body: {0}")]
    MalformedBody(String),

    /// The value could not be serialized. Indicates a programming error in
    /// a wire type, not bad host input.
    #[error("failed to encode frame body: {0}")]
    Encode(String),
}

/// One element of a stream subscription's delivery sequence.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamFrame<T> {
    /// A refreshed snapshot or change notification.
    Item(T),
    /// The subscription's source failed; the stream may still continue.
    Failed(Fault),
    /// Terminal marker: the underlying source is exhausted.
    Complete,
}

/// Encode a once-operation outcome.
pub fn encode_once<T: Serialize>(outcome: &Result<T, Fault>) -> Result<Vec<u8>, WireError> {
    encode_body(outcome)
}

/// Decode a once-operation outcome. Used by hosts and tests; the core only
/// ever encodes.
pub fn decode_once<T: DeserializeOwned>(bytes: &[u8]) -> Result<Result<T, Fault>, WireError> {
    decode_body(bytes)
}

/// Encode one stream frame.
pub fn encode_stream<T: Serialize>(frame: &StreamFrame<T>) -> Result<Vec<u8>, WireError> {
    encode_body(frame)
}

/// Decode one stream frame.
pub fn decode_stream<T: DeserializeOwned>(bytes: &[u8]) -> Result<StreamFrame<T>, WireError> {
    decode_body(bytes)
}

fn encode_body<T: Serialize>(body: &T) -> Result<Vec<u8>, WireError> {
    let mut buf = Vec::with_capacity(64);
    buf.extend_from_slice(&WIRE_VERSION.to_le_bytes());

    bincode::serialize_into(&mut buf, body).map_err(|e| WireError::Encode(e.to_string()))?;

    Ok(buf)
}

fn decode_body<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, WireError> {
    let Some((prefix, body)) = split_version(bytes) else {
        return Err(WireError::Truncated { len: bytes.len() });
    };

    if prefix != WIRE_VERSION {
        return Err(WireError::VersionMismatch { found: prefix });
    }

    bincode::deserialize(body).map_err(|e| WireError::MalformedBody(e.to_string()))
}

fn split_version(bytes: &[u8]) -> Option<(u16, &[u8])> {
    if bytes.len() < VERSION_PREFIX_LEN {
        return None;
    }

    let prefix = u16::from_le_bytes([bytes[0], bytes[1]]);
    Some((prefix, &bytes[VERSION_PREFIX_LEN..]))
}
