//! Change-notification listener operations.

use tokio_stream::wrappers::errors::BroadcastStreamRecvError;
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt;
use tracing::debug;

use quill_registry::RawHandle;
use quill_store::ports::NotificationPort;
use shared_types::{Fault, OnceId, RegisterError};

use crate::QuillCore;

/// Subscribe to listener events (connectivity changes and remote-change
/// pokes). A subscriber that falls behind skips the missed events rather
/// than failing the stream.
pub fn listen(core: &QuillCore) -> RawHandle {
    let receiver = core.store.notifications.subscribe();

    let events = BroadcastStream::new(receiver).filter_map(|item| match item {
        Ok(event) => Some(Ok::<_, Fault>(event)),
        Err(BroadcastStreamRecvError::Lagged(missed)) => {
            debug!(missed, "notification subscriber lagged");
            None
        }
    });

    core.dispatch.open_stream(events)
}

pub fn start(core: &QuillCore, once_id: OnceId) -> Result<RawHandle, RegisterError> {
    let notifications = core.store.notifications.clone();
    core.dispatch
        .submit_once(once_id, async move { notifications.start().await.map_err(Fault::from) })
}

pub fn stop(core: &QuillCore, once_id: OnceId) -> Result<RawHandle, RegisterError> {
    let notifications = core.store.notifications.clone();
    core.dispatch
        .submit_once(once_id, async move { notifications.stop().await.map_err(Fault::from) })
}
