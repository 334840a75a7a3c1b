//! Tracing bootstrap for the embedded core.

use tracing_subscriber::EnvFilter;

/// Install the fmt subscriber once. `RUST_LOG` overrides the default
/// level; repeated initialization (host re-running `quill_init` after a
/// failure) is harmless.
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init();
}
