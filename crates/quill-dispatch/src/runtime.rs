//! # Runtime Singleton
//!
//! The exported boundary has no context object to thread through C calls,
//! so the process owns exactly one core and one tokio runtime, installed
//! by `quill_init` before any operation is issued.

use std::sync::OnceLock;

use thiserror::Error;
use tracing::info;

use shared_types::{ArgumentError, Config};

use crate::QuillCore;

static RUNTIME: OnceLock<tokio::runtime::Runtime> = OnceLock::new();
static CORE: OnceLock<QuillCore> = OnceLock::new();

/// Failures during core initialization.
#[derive(Debug, Error)]
pub enum InitError {
    #[error("core is already initialized")]
    AlreadyInitialized,

    #[error("invalid configuration: {0}")]
    InvalidConfig(#[from] ArgumentError),

    #[error("failed to build async runtime: {0}")]
    Runtime(String),
}

/// Initialize the process-wide core. Must complete before any operation
/// or handler installation; calling it twice fails.
pub fn init(config: Config) -> Result<(), InitError> {
    config.validate()?;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .map_err(|e| InitError::Runtime(e.to_string()))?;
    let handle = runtime.handle().clone();

    RUNTIME
        .set(runtime)
        .map_err(|_| InitError::AlreadyInitialized)?;

    let core = QuillCore::new(handle, config);
    CORE.set(core).map_err(|_| InitError::AlreadyInitialized)?;

    info!("quill core initialized");
    Ok(())
}

/// The process-wide core, if initialized.
#[must_use]
pub fn core() -> Option<&'static QuillCore> {
    CORE.get()
}
