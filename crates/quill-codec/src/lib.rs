//! # Payload Codec
//!
//! The single serialization authority of the dispatch boundary. Every
//! result, for every operation, passes through this crate before crossing
//! the callback; every host-supplied C primitive passes through it before
//! an operation is registered. There is exactly one wire representation —
//! a version-marked frame with a bincode body — never per-operation ad hoc
//! packing.
//!
//! ```text
//! host primitives ──decode──▶ typed arguments ──▶ [Dispatch Core]
//!                                                       │
//! host callback  ◀──(id, kind, bytes)── frame ◀──encode─┘
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod args;
pub mod wire;

pub use wire::{
    decode_once, decode_stream, encode_once, encode_stream, StreamFrame, WireError, WIRE_VERSION,
};
