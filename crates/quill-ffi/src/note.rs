//! Folder, note and sync exports.

use std::ffi::c_char;

use quill_codec::args;
use quill_dispatch::ops;
use quill_registry::RawHandle;

use crate::{open_stream_op, submit_once_op};

/// Subscribe to the folder list.
#[no_mangle]
pub extern "C" fn quill_note_folders() -> RawHandle {
    open_stream_op("note.folders", ops::notes::folders)
}

/// Subscribe to the note summaries of one folder.
#[no_mangle]
pub extern "C" fn quill_note_note_summaries(folder_id: i32) -> RawHandle {
    open_stream_op("note.note_summaries", |core| {
        match args::positive_id(folder_id, "folder_id") {
            Ok(folder_id) => ops::notes::note_summaries(core, folder_id),
            Err(e) => core.dispatch.reject_stream(e.into()),
        }
    })
}

#[no_mangle]
pub extern "C" fn quill_note_folder(once_id: i32, folder_id: i32) -> RawHandle {
    submit_once_op("note.folder", |core| {
        match args::positive_id(folder_id, "folder_id") {
            Ok(folder_id) => ops::notes::folder(core, once_id, folder_id),
            Err(e) => core.dispatch.reject_once(once_id, e.into()),
        }
    })
}

/// # Safety
///
/// `name` must be a valid null-terminated string for the duration of the
/// call.
#[no_mangle]
pub unsafe extern "C" fn quill_note_create_folder(
    once_id: i32,
    account_id: i32,
    name: *const c_char,
) -> RawHandle {
    let name = args::required_str(name, "name");

    submit_once_op("note.create_folder", |core| {
        let decoded = args::positive_id(account_id, "account_id").and_then(|id| name.map(|n| (id, n)));
        match decoded {
            Ok((account_id, name)) => ops::notes::create_folder(core, once_id, account_id, name),
            Err(e) => core.dispatch.reject_once(once_id, e.into()),
        }
    })
}

#[no_mangle]
pub extern "C" fn quill_note_delete_folder(once_id: i32, folder_id: i32) -> RawHandle {
    submit_once_op("note.delete_folder", |core| {
        match args::positive_id(folder_id, "folder_id") {
            Ok(folder_id) => ops::notes::delete_folder(core, once_id, folder_id),
            Err(e) => core.dispatch.reject_once(once_id, e.into()),
        }
    })
}

#[no_mangle]
pub extern "C" fn quill_note_note(once_id: i32, note_id: i32) -> RawHandle {
    submit_once_op("note.note", |core| match args::positive_id(note_id, "note_id") {
        Ok(note_id) => ops::notes::note(core, once_id, note_id),
        Err(e) => core.dispatch.reject_once(once_id, e.into()),
    })
}

/// # Safety
///
/// `text` must be a valid null-terminated string for the duration of the
/// call.
#[no_mangle]
pub unsafe extern "C" fn quill_note_create_note(
    once_id: i32,
    folder_id: i32,
    text: *const c_char,
) -> RawHandle {
    let text = args::required_str(text, "text");

    submit_once_op("note.create_note", |core| {
        let decoded = args::positive_id(folder_id, "folder_id").and_then(|id| text.map(|t| (id, t)));
        match decoded {
            Ok((folder_id, text)) => ops::notes::create_note(core, once_id, folder_id, text),
            Err(e) => core.dispatch.reject_once(once_id, e.into()),
        }
    })
}

/// # Safety
///
/// `text` must be a valid null-terminated string for the duration of the
/// call.
#[no_mangle]
pub unsafe extern "C" fn quill_note_update_note(
    once_id: i32,
    note_id: i32,
    text: *const c_char,
) -> RawHandle {
    let text = args::required_str(text, "text");

    submit_once_op("note.update_note", |core| {
        let decoded = args::positive_id(note_id, "note_id").and_then(|id| text.map(|t| (id, t)));
        match decoded {
            Ok((note_id, text)) => ops::notes::update_note(core, once_id, note_id, text),
            Err(e) => core.dispatch.reject_once(once_id, e.into()),
        }
    })
}

#[no_mangle]
pub extern "C" fn quill_note_delete_note(once_id: i32, note_id: i32) -> RawHandle {
    submit_once_op("note.delete_note", |core| {
        match args::positive_id(note_id, "note_id") {
            Ok(note_id) => ops::notes::delete_note(core, once_id, note_id),
            Err(e) => core.dispatch.reject_once(once_id, e.into()),
        }
    })
}

#[no_mangle]
pub extern "C" fn quill_note_sync(once_id: i32) -> RawHandle {
    submit_once_op("note.sync", |core| ops::notes::sync(core, once_id))
}
