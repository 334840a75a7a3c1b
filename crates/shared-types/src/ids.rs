//! # Operation Identifiers
//!
//! An operation is addressed by a 32-bit identifier plus its kind. Once
//! identifiers are chosen by the host; stream identifiers are minted by the
//! core. The two categories form independent namespaces, so the registry
//! keys entries by `(kind, id)`.

use serde::{Deserialize, Serialize};

/// Host-chosen correlation tag for a single-shot operation.
pub type OnceId = i32;

/// Core-assigned subscription tag for a stream operation.
pub type StreamId = i32;

/// Whether an operation delivers exactly one result or a stream of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OperationKind {
    /// Exactly one delivery (or zero if cancelled before completion).
    Once,
    /// Zero or more ordered deliveries until abort or source exhaustion.
    Stream,
}

impl OperationKind {
    /// `true` for the stream category. This is the `is_stream` flag the
    /// host callback receives alongside each delivery.
    #[must_use]
    pub const fn is_stream(self) -> bool {
        matches!(self, Self::Stream)
    }
}
