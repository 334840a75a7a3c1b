//! # Quill FFI
//!
//! The exported C boundary. Every entry function returns immediately:
//! once-operations take a caller-chosen `once_id` and hand back a `u64`
//! cancellation handle (`0` = rejected), stream-operations mint their own
//! identifier (low 32 bits of the returned handle) and deliver until
//! aborted or exhausted. All results arrive through the callback installed
//! with [`quill_init_handler`].
//!
//! No panic may unwind across this boundary; every export catches and
//! converts to the rejected-handle return.
//!
//! The matching C declarations live in `include/quill.h`.

#![allow(clippy::missing_safety_doc)]

pub mod account;
mod logging;
pub mod note;
pub mod notification;

pub use account::*;
pub use note::*;
pub use notification::*;

use std::ffi::{c_char, c_void};
use std::panic::{catch_unwind, AssertUnwindSafe};

use tracing::{error, warn};

use quill_codec::args;
use quill_dispatch::runtime;
use quill_dispatch::{HostCallback, QuillCore};
use quill_registry::{RawHandle, INVALID_HANDLE};
use shared_types::{Config, RegisterError};

/// Initialize logging, configuration and the core runtime.
///
/// `notify_url` and `ws_url` may be null. Returns `false` when the
/// configuration is rejected or the core is already initialized; this is
/// the one boundary failure that cannot be payload-delivered, because no
/// handler can exist yet.
///
/// # Safety
///
/// Non-null pointers must reference valid null-terminated strings for the
/// duration of the call.
#[no_mangle]
pub unsafe extern "C" fn quill_init(
    api_url: *const c_char,
    notify_url: *const c_char,
    ws_url: *const c_char,
    storage_dir: *const c_char,
) -> bool {
    let outcome = catch_unwind(|| {
        logging::init();

        // SAFETY: the caller upholds the string contract of this export.
        let config = unsafe {
            Config {
                api_url: args::required_str(api_url, "api_url")?,
                notify_url: args::optional_str(notify_url, "notify_url")?,
                ws_url: args::optional_str(ws_url, "ws_url")?,
                storage_dir: args::required_str(storage_dir, "storage_dir")?,
            }
        };

        runtime::init(config)
    });

    match outcome {
        Ok(Ok(())) => true,
        Ok(Err(e)) => {
            error!(%e, "core initialization failed");
            false
        }
        Err(_) => {
            error!("panic during core initialization");
            false
        }
    }
}

/// Install the result callback and start the delivery pump.
///
/// Non-blocking. Deliveries produced before installation are buffered and
/// drained in order once the pump starts. Re-installation is
/// last-writer-wins: deliveries drained after the swap use the new
/// context, including ones enqueued before it.
///
/// # Safety
///
/// `callback` must stay invocable and `ctx` valid for the process
/// lifetime; both may be used from core-owned threads.
#[no_mangle]
pub unsafe extern "C" fn quill_init_handler(ctx: *mut c_void, callback: HostCallback) {
    let outcome = catch_unwind(|| match runtime::core() {
        Some(core) => core.dispatch.install_handler(callback, ctx),
        None => error!("quill_init_handler called before quill_init"),
    });

    if outcome.is_err() {
        error!("panic during handler installation");
    }
}

/// Request cancellation of the operation `handle` refers to.
///
/// Fire-and-forget: returns immediately, never errors. Unknown, stale and
/// already-finished handles are no-ops. No delivery for the identifier is
/// attempted after the cancellation is observed; a result already in
/// flight may still arrive.
#[no_mangle]
pub extern "C" fn quill_abort(handle: u64) {
    let outcome = catch_unwind(|| match runtime::core() {
        Some(core) => core.dispatch.abort(handle),
        None => error!("quill_abort called before quill_init"),
    });

    if outcome.is_err() {
        error!("panic during abort");
    }
}

/// Run a once-operation body against the initialized core, converting
/// every non-payload failure into the rejected handle.
pub(crate) fn submit_once_op(
    op: &'static str,
    body: impl FnOnce(&'static QuillCore) -> Result<RawHandle, RegisterError>,
) -> RawHandle {
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let Some(core) = runtime::core() else {
            error!(op, "operation issued before quill_init");
            return INVALID_HANDLE;
        };

        match body(core) {
            Ok(handle) => handle,
            Err(e @ RegisterError::DuplicateIdentifier { .. }) => {
                warn!(op, %e, "operation rejected");
                INVALID_HANDLE
            }
        }
    }));

    outcome.unwrap_or_else(|_| {
        error!(op, "panic crossed operation boundary");
        INVALID_HANDLE
    })
}

/// Run a stream-operation body against the initialized core.
pub(crate) fn open_stream_op(
    op: &'static str,
    body: impl FnOnce(&'static QuillCore) -> RawHandle,
) -> RawHandle {
    let outcome = catch_unwind(AssertUnwindSafe(|| {
        let Some(core) = runtime::core() else {
            error!(op, "operation issued before quill_init");
            return INVALID_HANDLE;
        };

        body(core)
    }));

    outcome.unwrap_or_else(|_| {
        error!(op, "panic crossed operation boundary");
        INVALID_HANDLE
    })
}
