//! Account, device and verification operations.

use tokio_stream::wrappers::WatchStream;
use tokio_stream::StreamExt;

use quill_registry::RawHandle;
use quill_store::ports::{AccountsPort, NotesPort};
use shared_types::{Account, Fault, OnceId, RegisterError};

use crate::QuillCore;

/// Subscribe to the account list. Initial snapshot, then one per change.
pub fn accounts(core: &QuillCore) -> RawHandle {
    let receiver = core.store.accounts.watch_accounts();
    core.dispatch
        .open_stream(WatchStream::new(receiver).map(Ok::<Vec<Account>, Fault>))
}

pub fn account(core: &QuillCore, once_id: OnceId, account_id: i32) -> Result<RawHandle, RegisterError> {
    let accounts = core.store.accounts.clone();
    core.dispatch.submit_once(once_id, async move {
        accounts.account(account_id).await.map_err(Fault::from)
    })
}

pub fn remote_account(
    core: &QuillCore,
    once_id: OnceId,
    account_id: i32,
) -> Result<RawHandle, RegisterError> {
    let accounts = core.store.accounts.clone();
    core.dispatch.submit_once(once_id, async move {
        accounts.remote_account(account_id).await.map_err(Fault::from)
    })
}

pub fn devices(core: &QuillCore, once_id: OnceId, account_id: i32) -> Result<RawHandle, RegisterError> {
    let accounts = core.store.accounts.clone();
    core.dispatch.submit_once(once_id, async move {
        accounts.devices(account_id).await.map_err(Fault::from)
    })
}

pub fn add_device(
    core: &QuillCore,
    once_id: OnceId,
    account_id: i32,
    fingerprint: String,
) -> Result<RawHandle, RegisterError> {
    let accounts = core.store.accounts.clone();
    core.dispatch.submit_once(once_id, async move {
        accounts
            .add_device(account_id, fingerprint)
            .await
            .map_err(Fault::from)
    })
}

pub fn remove_device(
    core: &QuillCore,
    once_id: OnceId,
    device_id: i32,
) -> Result<RawHandle, RegisterError> {
    let accounts = core.store.accounts.clone();
    core.dispatch.submit_once(once_id, async move {
        accounts.remove_device(device_id).await.map_err(Fault::from)
    })
}

pub fn add_account(
    core: &QuillCore,
    once_id: OnceId,
    email: String,
) -> Result<RawHandle, RegisterError> {
    let accounts = core.store.accounts.clone();
    core.dispatch.submit_once(once_id, async move {
        accounts.add_account(email).await.map_err(Fault::from)
    })
}

/// Detach an account and purge its folders and notes from this device.
pub fn remove_account(
    core: &QuillCore,
    once_id: OnceId,
    account_id: i32,
) -> Result<RawHandle, RegisterError> {
    let accounts = core.store.accounts.clone();
    let notes = core.store.notes.clone();
    core.dispatch.submit_once(once_id, async move {
        accounts.remove_account(account_id).await?;
        notes.purge_account(account_id).await?;
        Ok(())
    })
}

pub fn public_key(core: &QuillCore, once_id: OnceId) -> Result<RawHandle, RegisterError> {
    let accounts = core.store.accounts.clone();
    core.dispatch
        .submit_once(once_id, async move { accounts.public_key().await.map_err(Fault::from) })
}

pub fn send_verification_code(
    core: &QuillCore,
    once_id: OnceId,
    email: String,
) -> Result<RawHandle, RegisterError> {
    let accounts = core.store.accounts.clone();
    core.dispatch.submit_once(once_id, async move {
        accounts
            .send_verification_code(email)
            .await
            .map_err(Fault::from)
    })
}

pub fn sign_up(
    core: &QuillCore,
    once_id: OnceId,
    email: String,
    code: String,
) -> Result<RawHandle, RegisterError> {
    let accounts = core.store.accounts.clone();
    core.dispatch.submit_once(once_id, async move {
        accounts.sign_up(email, code).await.map_err(Fault::from)
    })
}

pub fn request_verification(
    core: &QuillCore,
    once_id: OnceId,
    email: String,
) -> Result<RawHandle, RegisterError> {
    let accounts = core.store.accounts.clone();
    core.dispatch.submit_once(once_id, async move {
        accounts
            .request_verification(email)
            .await
            .map_err(Fault::from)
    })
}

/// Long-poll until the pending verification is approved. Cancellable like
/// any once-operation via the returned handle.
pub fn wait_verification(
    core: &QuillCore,
    once_id: OnceId,
    token: String,
) -> Result<RawHandle, RegisterError> {
    let accounts = core.store.accounts.clone();
    core.dispatch.submit_once(once_id, async move {
        accounts.wait_verification(token).await.map_err(Fault::from)
    })
}

pub fn send_close_code(
    core: &QuillCore,
    once_id: OnceId,
    account_id: i32,
) -> Result<RawHandle, RegisterError> {
    let accounts = core.store.accounts.clone();
    core.dispatch.submit_once(once_id, async move {
        accounts.send_close_code(account_id).await.map_err(Fault::from)
    })
}

/// Close the remote account and purge its content from this device.
pub fn close_account(
    core: &QuillCore,
    once_id: OnceId,
    account_id: i32,
    code: String,
) -> Result<RawHandle, RegisterError> {
    let accounts = core.store.accounts.clone();
    let notes = core.store.notes.clone();
    core.dispatch.submit_once(once_id, async move {
        accounts.close_account(account_id, code).await?;
        notes.purge_account(account_id).await?;
        Ok(())
    })
}
