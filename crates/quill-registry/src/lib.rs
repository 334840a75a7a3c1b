//! # Operation Registry
//!
//! Tracks every in-flight operation of the dispatch core by `(kind, id)`,
//! owns the means to cancel it, and hands the host an opaque handle instead
//! of a raw pointer.
//!
//! ```text
//! register ──▶ { key, generation, cancel token } ──▶ RawHandle (packed u64)
//!                        │
//! abort(handle) ─────────┘  mark + abort + retire (idempotent)
//! ```
//!
//! ## Invariants
//!
//! - No two concurrently live operations share an identifier within the
//!   same category; once-ids become reusable the moment their entry is
//!   retired (single delivery fired, or cancelled first).
//! - Stream identifiers are minted from an atomic counter and never reused
//!   for the process lifetime; exhausting the counter is a programming
//!   fault and panics rather than corrupting the table.
//! - Cancellation is observable within one scheduling step: the token wakes
//!   pending `cancelled()` waiters immediately and the task is additionally
//!   aborted best-effort.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod cancel;
pub mod handle;
pub mod registry;

pub use cancel::CancelToken;
pub use handle::{RawHandle, INVALID_HANDLE};
pub use registry::{OperationKey, OperationRegistry, Registration, RetiredEntry};
