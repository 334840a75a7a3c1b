//! # Error Taxonomy
//!
//! Four failure families, all recoverable and all surfaced to the host as
//! structured payloads rather than process aborts:
//!
//! - [`ArgumentError`] — malformed or missing input, rejected before any
//!   work runs.
//! - [`RegisterError`] — the registry refused the operation identifier.
//! - [`DomainError`] — business-logic failures delivered like any result.
//! - [`Fault`] — the umbrella the wire actually carries, so every failure
//!   travels through one payload shape.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ids::OperationKind;

/// Host input that could not be decoded or validated.
///
/// Crosses the wire inside [`Fault`], so the argument name is owned.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum ArgumentError {
    /// A required pointer argument was null.
    #[error("argument `{name}` is null")]
    Null { name: String },

    /// A string argument was not valid UTF-8.
    #[error("argument `{name}` is not valid UTF-8")]
    InvalidUtf8 { name: String },

    /// A required string argument was empty or whitespace.
    #[error("argument `{name}` is empty")]
    Empty { name: String },

    /// A numeric identifier argument was zero or negative.
    #[error("argument `{name}` must be positive, got {value}")]
    NonPositive { name: String, value: i32 },
}

impl ArgumentError {
    pub fn null(name: &str) -> Self {
        Self::Null { name: name.to_string() }
    }

    pub fn invalid_utf8(name: &str) -> Self {
        Self::InvalidUtf8 { name: name.to_string() }
    }

    pub fn empty(name: &str) -> Self {
        Self::Empty { name: name.to_string() }
    }

    pub fn non_positive(name: &str, value: i32) -> Self {
        Self::NonPositive {
            name: name.to_string(),
            value,
        }
    }
}

/// The registry refused to accept an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum RegisterError {
    /// A live entry already exists for this identifier in this category.
    #[error("identifier {id} is already live for a {kind:?} operation")]
    DuplicateIdentifier { kind: OperationKind, id: i32 },
}

/// Business-logic failure produced by a domain collaborator.
///
/// Delivered to the host as a normal payload; never a crash, never a
/// distinct delivery channel.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum DomainError {
    #[error("account {0} not found")]
    AccountNotFound(i32),

    #[error("folder {0} not found")]
    FolderNotFound(i32),

    #[error("note {0} not found")]
    NoteNotFound(i32),

    #[error("device {0} not found")]
    DeviceNotFound(i32),

    #[error("an account already exists for email {0}")]
    EmailAlreadyUsed(String),

    #[error("no account exists for email {0}")]
    EmailNotFound(String),

    #[error("account {0} is local-only and has no remote counterpart")]
    AccountNotRemote(i32),

    #[error("verification code does not match")]
    InvalidCode,

    #[error("verification token is unknown or expired")]
    UnknownVerificationToken,
}

/// Umbrella failure type carried by result payloads.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum Fault {
    /// Input rejected during decoding or validation.
    #[error(transparent)]
    Argument(#[from] ArgumentError),

    /// Business-logic failure.
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Background work failed to reach its collaborator.
    #[error("transport failure: {0}")]
    Transport(String),
}
