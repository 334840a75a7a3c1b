//! # Quill Dispatch
//!
//! The asynchronous dispatch bridge between the exported C boundary and
//! the domain collaborators. Entry functions register an operation, hand
//! the work to the core's runtime and return a handle immediately; results
//! flow back through the callback gateway as versioned payload frames.
//!
//! ```text
//! [quill-ffi export] ──typed args──▶ [ops::*] ──▶ DispatchCore
//!                                                   │ register + spawn
//!                                                   ▼
//!                                            domain ports (store)
//!                                                   │ result
//!                                                   ▼
//!                              codec frame ──▶ CallbackGateway ──▶ host
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod core;
pub mod gateway;
pub mod ops;
pub mod runtime;

pub use crate::core::DispatchCore;
pub use gateway::{CallbackGateway, Delivery, HostCallback};

use tokio::runtime::Handle;

use quill_store::AppStore;
use shared_types::Config;

/// The wired core: configuration, dispatcher and domain collaborators.
pub struct QuillCore {
    config: Config,
    pub dispatch: DispatchCore,
    pub store: AppStore,
}

impl QuillCore {
    /// Wire a core that runs its background work on `runtime`.
    #[must_use]
    pub fn new(runtime: Handle, config: Config) -> Self {
        Self {
            config,
            dispatch: DispatchCore::new(runtime),
            store: AppStore::new(),
        }
    }

    /// The configuration the host initialized the core with.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }
}
