//! Change-notification listener exports.

use quill_dispatch::ops;
use quill_registry::RawHandle;

use crate::{open_stream_op, submit_once_op};

/// Subscribe to listener events.
#[no_mangle]
pub extern "C" fn quill_notification_listen() -> RawHandle {
    open_stream_op("notification.listen", ops::notifications::listen)
}

/// Start the change-notification listener.
#[no_mangle]
pub extern "C" fn quill_notification_start(once_id: i32) -> RawHandle {
    submit_once_op("notification.start", |core| {
        ops::notifications::start(core, once_id)
    })
}

/// Stop the change-notification listener.
#[no_mangle]
pub extern "C" fn quill_notification_stop(once_id: i32) -> RawHandle {
    submit_once_op("notification.stop", |core| {
        ops::notifications::stop(core, once_id)
    })
}
