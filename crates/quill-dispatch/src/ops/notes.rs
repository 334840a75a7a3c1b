//! Folder, note and sync operations.

use tokio_stream::wrappers::WatchStream;
use tokio_stream::StreamExt;

use quill_registry::RawHandle;
use quill_store::ports::{AccountsPort, NotesPort};
use shared_types::{Fault, Folder, NoteSummary, OnceId, RegisterError};

use crate::QuillCore;

/// Subscribe to the folder list. Initial snapshot, then one per change.
pub fn folders(core: &QuillCore) -> RawHandle {
    let receiver = core.store.notes.watch_folders();
    core.dispatch
        .open_stream(WatchStream::new(receiver).map(Ok::<Vec<Folder>, Fault>))
}

/// Subscribe to the note summaries of one folder. A folder that does not
/// exist yet yields empty snapshots until it is created.
pub fn note_summaries(core: &QuillCore, folder_id: i32) -> RawHandle {
    let receiver = core.store.notes.watch_notes(folder_id);
    core.dispatch
        .open_stream(WatchStream::new(receiver).map(Ok::<Vec<NoteSummary>, Fault>))
}

pub fn folder(core: &QuillCore, once_id: OnceId, folder_id: i32) -> Result<RawHandle, RegisterError> {
    let notes = core.store.notes.clone();
    core.dispatch
        .submit_once(once_id, async move { notes.folder(folder_id).await.map_err(Fault::from) })
}

/// Create a folder under an account. The account must exist; the folder
/// record comes back as the payload.
pub fn create_folder(
    core: &QuillCore,
    once_id: OnceId,
    account_id: i32,
    name: String,
) -> Result<RawHandle, RegisterError> {
    let accounts = core.store.accounts.clone();
    let notes = core.store.notes.clone();
    core.dispatch.submit_once(once_id, async move {
        accounts.account(account_id).await?;
        notes
            .create_folder(account_id, name)
            .await
            .map_err(Fault::from)
    })
}

pub fn delete_folder(
    core: &QuillCore,
    once_id: OnceId,
    folder_id: i32,
) -> Result<RawHandle, RegisterError> {
    let notes = core.store.notes.clone();
    core.dispatch.submit_once(once_id, async move {
        notes.delete_folder(folder_id).await.map_err(Fault::from)
    })
}

pub fn note(core: &QuillCore, once_id: OnceId, note_id: i32) -> Result<RawHandle, RegisterError> {
    let notes = core.store.notes.clone();
    core.dispatch
        .submit_once(once_id, async move { notes.note(note_id).await.map_err(Fault::from) })
}

pub fn create_note(
    core: &QuillCore,
    once_id: OnceId,
    folder_id: i32,
    text: String,
) -> Result<RawHandle, RegisterError> {
    let notes = core.store.notes.clone();
    core.dispatch.submit_once(once_id, async move {
        notes.create_note(folder_id, text).await.map_err(Fault::from)
    })
}

pub fn update_note(
    core: &QuillCore,
    once_id: OnceId,
    note_id: i32,
    text: String,
) -> Result<RawHandle, RegisterError> {
    let notes = core.store.notes.clone();
    core.dispatch.submit_once(once_id, async move {
        notes.update_note(note_id, text).await.map_err(Fault::from)
    })
}

pub fn delete_note(
    core: &QuillCore,
    once_id: OnceId,
    note_id: i32,
) -> Result<RawHandle, RegisterError> {
    let notes = core.store.notes.clone();
    core.dispatch.submit_once(once_id, async move {
        notes.delete_note(note_id).await.map_err(Fault::from)
    })
}

/// Run a sync pass: push modifications, purge tombstones, refresh
/// subscriber snapshots.
pub fn sync(core: &QuillCore, once_id: OnceId) -> Result<RawHandle, RegisterError> {
    let notes = core.store.notes.clone();
    core.dispatch
        .submit_once(once_id, async move { notes.sync().await.map_err(Fault::from) })
}
