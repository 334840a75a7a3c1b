//! # Quill Store
//!
//! The domain collaborators behind the dispatch core, split hexagonally:
//! [`ports`] defines what the dispatch layer may ask for, the adapters in
//! this crate answer from in-memory observable state. Persistence engines
//! and remote transport are out of scope; a deployment swaps the adapters,
//! not the ports.
//!
//! Observability model: list-shaped queries are watch-channel snapshots.
//! A subscriber receives the current snapshot immediately and one refreshed
//! snapshot per accepted mutation, which is exactly the delivery pattern
//! the stream operations promise the host.

#![cfg_attr(test, allow(clippy::unwrap_used))]

pub mod accounts;
pub mod notes;
pub mod notify;
pub mod observable;
pub mod ports;

use std::sync::Arc;

pub use accounts::AccountDirectory;
pub use notes::NoteStore;
pub use notify::NotificationHub;
pub use ports::{AccountsPort, NotesPort, NotificationPort};

/// The wired set of domain collaborators the core runs against.
#[derive(Clone)]
pub struct AppStore {
    pub accounts: Arc<AccountDirectory>,
    pub notes: Arc<NoteStore>,
    pub notifications: Arc<NotificationHub>,
}

impl AppStore {
    /// Wire up a fresh in-memory store with the default local account.
    #[must_use]
    pub fn new() -> Self {
        Self {
            accounts: Arc::new(AccountDirectory::new()),
            notes: Arc::new(NoteStore::new()),
            notifications: Arc::new(NotificationHub::new()),
        }
    }
}

impl Default for AppStore {
    fn default() -> Self {
        Self::new()
    }
}
