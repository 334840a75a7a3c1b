//! Account, device and verification exports.

use std::ffi::c_char;

use quill_codec::args;
use quill_dispatch::ops;
use quill_registry::RawHandle;

use crate::{open_stream_op, submit_once_op};

/// Subscribe to the account list.
#[no_mangle]
pub extern "C" fn quill_account_accounts() -> RawHandle {
    open_stream_op("account.accounts", ops::accounts::accounts)
}

#[no_mangle]
pub extern "C" fn quill_account_account(once_id: i32, account_id: i32) -> RawHandle {
    submit_once_op("account.account", |core| {
        match args::positive_id(account_id, "account_id") {
            Ok(account_id) => ops::accounts::account(core, once_id, account_id),
            Err(e) => core.dispatch.reject_once(once_id, e.into()),
        }
    })
}

/// Remote-side view of an account.
#[no_mangle]
pub extern "C" fn quill_account_remote_account(once_id: i32, account_id: i32) -> RawHandle {
    submit_once_op("account.remote_account", |core| {
        match args::positive_id(account_id, "account_id") {
            Ok(account_id) => ops::accounts::remote_account(core, once_id, account_id),
            Err(e) => core.dispatch.reject_once(once_id, e.into()),
        }
    })
}

#[no_mangle]
pub extern "C" fn quill_account_devices(once_id: i32, account_id: i32) -> RawHandle {
    submit_once_op("account.devices", |core| {
        match args::positive_id(account_id, "account_id") {
            Ok(account_id) => ops::accounts::devices(core, once_id, account_id),
            Err(e) => core.dispatch.reject_once(once_id, e.into()),
        }
    })
}

/// # Safety
///
/// `fingerprint` must be a valid null-terminated string for the duration
/// of the call.
#[no_mangle]
pub unsafe extern "C" fn quill_account_add_device(
    once_id: i32,
    account_id: i32,
    fingerprint: *const c_char,
) -> RawHandle {
    let fingerprint = args::required_str(fingerprint, "fingerprint");

    submit_once_op("account.add_device", |core| {
        let decoded =
            args::positive_id(account_id, "account_id").and_then(|id| fingerprint.map(|f| (id, f)));
        match decoded {
            Ok((account_id, fingerprint)) => {
                ops::accounts::add_device(core, once_id, account_id, fingerprint)
            }
            Err(e) => core.dispatch.reject_once(once_id, e.into()),
        }
    })
}

#[no_mangle]
pub extern "C" fn quill_account_remove_device(once_id: i32, device_id: i32) -> RawHandle {
    submit_once_op("account.remove_device", |core| {
        match args::positive_id(device_id, "device_id") {
            Ok(device_id) => ops::accounts::remove_device(core, once_id, device_id),
            Err(e) => core.dispatch.reject_once(once_id, e.into()),
        }
    })
}

/// # Safety
///
/// `email` must be a valid null-terminated string for the duration of the
/// call.
#[no_mangle]
pub unsafe extern "C" fn quill_account_add_account(once_id: i32, email: *const c_char) -> RawHandle {
    let email = args::required_str(email, "email");

    submit_once_op("account.add_account", |core| match email {
        Ok(email) => ops::accounts::add_account(core, once_id, email),
        Err(e) => core.dispatch.reject_once(once_id, e.into()),
    })
}

#[no_mangle]
pub extern "C" fn quill_account_remove_account(once_id: i32, account_id: i32) -> RawHandle {
    submit_once_op("account.remove_account", |core| {
        match args::positive_id(account_id, "account_id") {
            Ok(account_id) => ops::accounts::remove_account(core, once_id, account_id),
            Err(e) => core.dispatch.reject_once(once_id, e.into()),
        }
    })
}

/// This device's identity public key.
#[no_mangle]
pub extern "C" fn quill_account_public_key(once_id: i32) -> RawHandle {
    submit_once_op("account.public_key", |core| {
        ops::accounts::public_key(core, once_id)
    })
}

/// # Safety
///
/// `email` must be a valid null-terminated string for the duration of the
/// call.
#[no_mangle]
pub unsafe extern "C" fn quill_account_send_verification_code(
    once_id: i32,
    email: *const c_char,
) -> RawHandle {
    let email = args::required_str(email, "email");

    submit_once_op("account.send_verification_code", |core| match email {
        Ok(email) => ops::accounts::send_verification_code(core, once_id, email),
        Err(e) => core.dispatch.reject_once(once_id, e.into()),
    })
}

/// # Safety
///
/// `email` and `code` must be valid null-terminated strings for the
/// duration of the call.
#[no_mangle]
pub unsafe extern "C" fn quill_account_sign_up(
    once_id: i32,
    email: *const c_char,
    code: *const c_char,
) -> RawHandle {
    let email = args::required_str(email, "email");
    let code = args::required_str(code, "code");

    submit_once_op("account.sign_up", |core| {
        let decoded = email.and_then(|email| code.map(|code| (email, code)));
        match decoded {
            Ok((email, code)) => ops::accounts::sign_up(core, once_id, email, code),
            Err(e) => core.dispatch.reject_once(once_id, e.into()),
        }
    })
}

/// # Safety
///
/// `email` must be a valid null-terminated string for the duration of the
/// call.
#[no_mangle]
pub unsafe extern "C" fn quill_account_request_verification(
    once_id: i32,
    email: *const c_char,
) -> RawHandle {
    let email = args::required_str(email, "email");

    submit_once_op("account.request_verification", |core| match email {
        Ok(email) => ops::accounts::request_verification(core, once_id, email),
        Err(e) => core.dispatch.reject_once(once_id, e.into()),
    })
}

/// Long-poll until the pending verification is approved.
///
/// # Safety
///
/// `token` must be a valid null-terminated string for the duration of the
/// call.
#[no_mangle]
pub unsafe extern "C" fn quill_account_wait_verification(
    once_id: i32,
    token: *const c_char,
) -> RawHandle {
    let token = args::required_str(token, "token");

    submit_once_op("account.wait_verification", |core| match token {
        Ok(token) => ops::accounts::wait_verification(core, once_id, token),
        Err(e) => core.dispatch.reject_once(once_id, e.into()),
    })
}

#[no_mangle]
pub extern "C" fn quill_account_send_close_code(once_id: i32, account_id: i32) -> RawHandle {
    submit_once_op("account.send_close_code", |core| {
        match args::positive_id(account_id, "account_id") {
            Ok(account_id) => ops::accounts::send_close_code(core, once_id, account_id),
            Err(e) => core.dispatch.reject_once(once_id, e.into()),
        }
    })
}

/// # Safety
///
/// `code` must be a valid null-terminated string for the duration of the
/// call.
#[no_mangle]
pub unsafe extern "C" fn quill_account_close_account(
    once_id: i32,
    account_id: i32,
    code: *const c_char,
) -> RawHandle {
    let code = args::required_str(code, "code");

    submit_once_op("account.close_account", |core| {
        let decoded = args::positive_id(account_id, "account_id").and_then(|id| code.map(|c| (id, c)));
        match decoded {
            Ok((account_id, code)) => ops::accounts::close_account(core, once_id, account_id, code),
            Err(e) => core.dispatch.reject_once(once_id, e.into()),
        }
    })
}
