//! # Quill Core Test Suite
//!
//! Unified test crate covering the dispatch boundary end to end:
//!
//! ```text
//! tests/src/
//! ├── support.rs        # Host-side fixtures (callback sink, wired core)
//! └── integration/
//!     ├── dispatch_contract.rs  # once/stream delivery guarantees
//!     ├── domain_flows.rs       # account/folder/note/notification flows
//!     └── known_gaps.rs         # documented-but-unresolved behaviors
//! ```
//!
//! Run with `cargo test -p quill-tests`.

#![allow(dead_code)]

pub mod integration;
pub mod support;
