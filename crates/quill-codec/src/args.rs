//! # Host Argument Decoding
//!
//! Converts the C primitives the host passes into owned Rust values. Host
//! strings are treated as read-only, null-terminated and borrowed only for
//! the duration of the call; everything is copied out before the export
//! returns. Malformed input fails with [`ArgumentError`] before any
//! operation is registered.

use std::ffi::{c_char, CStr};

use shared_types::ArgumentError;

/// Decode a required, non-empty C string argument.
///
/// # Safety
///
/// `ptr`, when non-null, must point to a valid null-terminated string that
/// outlives this call.
pub unsafe fn required_str(
    ptr: *const c_char,
    name: &'static str,
) -> Result<String, ArgumentError> {
    let value = copy_str(ptr, name)?;
    non_empty(value, name)
}

/// Decode an optional C string argument. Null decodes to `None`; a present
/// pointer must still be valid UTF-8 and non-empty.
///
/// # Safety
///
/// Same contract as [`required_str`] for non-null pointers.
pub unsafe fn optional_str(
    ptr: *const c_char,
    name: &'static str,
) -> Result<Option<String>, ArgumentError> {
    if ptr.is_null() {
        return Ok(None);
    }

    let value = copy_str(ptr, name)?;
    non_empty(value, name).map(Some)
}

/// Validate that an owned string is non-empty after trimming.
pub fn non_empty(value: String, name: &'static str) -> Result<String, ArgumentError> {
    if value.trim().is_empty() {
        return Err(ArgumentError::empty(name));
    }
    Ok(value)
}

/// Validate that a host-supplied record identifier is positive.
pub fn positive_id(value: i32, name: &'static str) -> Result<i32, ArgumentError> {
    if value <= 0 {
        return Err(ArgumentError::non_positive(name, value));
    }
    Ok(value)
}

unsafe fn copy_str(ptr: *const c_char, name: &'static str) -> Result<String, ArgumentError> {
    if ptr.is_null() {
        return Err(ArgumentError::null(name));
    }

    CStr::from_ptr(ptr)
        .to_str()
        .map(str::to_owned)
        .map_err(|_| ArgumentError::invalid_utf8(name))
}
