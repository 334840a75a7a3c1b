//! # Domain Entities
//!
//! Records the host can observe through result payloads. These are the
//! response shapes of the dispatch boundary; the collaborators producing
//! them live behind the store ports.

use serde::{Deserialize, Serialize};

/// Where an account's data lives.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountKind {
    /// Device-local only, never synchronized.
    Local,
    /// Backed by the remote Quill service.
    Remote,
}

/// A configured account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    pub id: i32,
    pub name: String,
    pub kind: AccountKind,
    /// Present for remote accounts; local accounts have no mailbox.
    pub email: Option<String>,
}

/// Remote-side view of an account, including the verification state the
/// remote service tracks for it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RemoteAccount {
    pub email: String,
    pub verified: bool,
}

/// A device enrolled under an account for end-to-end key exchange.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Device {
    pub id: i32,
    pub account_id: i32,
    /// Public-key fingerprint the device identifies itself with.
    pub fingerprint: String,
    pub pubkey: String,
}

/// Synchronization state of a folder or note record.
///
/// Deletions are tombstones until a sync pass purges them, so subscribers
/// never see a record silently vanish between snapshots.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordState {
    #[default]
    Clean,
    Modified,
    Deleted,
}

/// A folder grouping notes under one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Folder {
    pub id: i32,
    pub account_id: i32,
    pub name: String,
    pub state: RecordState,
}

/// A note with its full text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: i32,
    pub folder_id: i32,
    pub title: Option<String>,
    pub text: String,
    /// Monotonic revision bumped on every accepted modification.
    pub commit: i32,
    pub state: RecordState,
}

/// Listing view of a note, without the full text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteSummary {
    pub id: i32,
    pub folder_id: i32,
    pub title: Option<String>,
}

impl Note {
    /// The listing view of this note.
    #[must_use]
    pub fn summary(&self) -> NoteSummary {
        NoteSummary {
            id: self.id,
            folder_id: self.folder_id,
            title: self.title.clone(),
        }
    }
}

/// Events published on the notification stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum NotificationEvent {
    /// The listener established its connection.
    Connected,
    /// The listener lost (or was told to drop) its connection.
    Disconnected,
    /// The remote service signalled that account data changed.
    RemoteChanged { account_id: i32 },
}
