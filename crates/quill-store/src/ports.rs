//! # Domain Ports
//!
//! What the dispatch layer may ask of the domain, and nothing more. The
//! in-memory adapters in this crate implement these traits; a production
//! build backs them with persistence and remote transport instead.
//!
//! List-shaped queries return watch receivers: the subscriber observes the
//! current snapshot immediately, then one snapshot per accepted mutation.

use async_trait::async_trait;
use tokio::sync::{broadcast, watch};

use shared_types::{
    Account, Device, DomainError, Folder, Note, NoteSummary, NotificationEvent, RemoteAccount,
};

/// Account, device and verification workflows.
#[async_trait]
pub trait AccountsPort: Send + Sync {
    /// Observable snapshot of all configured accounts.
    fn watch_accounts(&self) -> watch::Receiver<Vec<Account>>;

    async fn account(&self, account_id: i32) -> Result<Account, DomainError>;

    /// Remote-side view of a remote account.
    async fn remote_account(&self, account_id: i32) -> Result<RemoteAccount, DomainError>;

    async fn devices(&self, account_id: i32) -> Result<Vec<Device>, DomainError>;

    async fn add_device(&self, account_id: i32, fingerprint: String)
        -> Result<Device, DomainError>;

    async fn remove_device(&self, device_id: i32) -> Result<(), DomainError>;

    /// Attach an existing remote account to this device.
    async fn add_account(&self, email: String) -> Result<Account, DomainError>;

    /// Detach an account from this device without closing it remotely.
    async fn remove_account(&self, account_id: i32) -> Result<(), DomainError>;

    /// This device's identity public key.
    async fn public_key(&self) -> Result<String, DomainError>;

    /// Mail a sign-up verification code for `email`.
    async fn send_verification_code(&self, email: String) -> Result<(), DomainError>;

    /// Create a remote account once the mailed code is echoed back.
    async fn sign_up(&self, email: String, code: String) -> Result<Account, DomainError>;

    /// Begin a device-verification long-poll; returns the pending token.
    async fn request_verification(&self, email: String) -> Result<String, DomainError>;

    /// Resolve when the pending token is approved.
    async fn wait_verification(&self, token: String) -> Result<(), DomainError>;

    /// Mail an account-close confirmation code.
    async fn send_close_code(&self, account_id: i32) -> Result<(), DomainError>;

    /// Close the remote account once the mailed code is echoed back.
    async fn close_account(&self, account_id: i32, code: String) -> Result<(), DomainError>;
}

/// Folder and note CRUD plus synchronization.
#[async_trait]
pub trait NotesPort: Send + Sync {
    /// Observable snapshot of all live (non-tombstoned) folders.
    fn watch_folders(&self) -> watch::Receiver<Vec<Folder>>;

    /// Observable snapshot of the live note summaries in one folder.
    fn watch_notes(&self, folder_id: i32) -> watch::Receiver<Vec<NoteSummary>>;

    async fn folder(&self, folder_id: i32) -> Result<Folder, DomainError>;

    async fn create_folder(&self, account_id: i32, name: String) -> Result<Folder, DomainError>;

    async fn delete_folder(&self, folder_id: i32) -> Result<(), DomainError>;

    async fn note(&self, note_id: i32) -> Result<Note, DomainError>;

    async fn create_note(&self, folder_id: i32, text: String) -> Result<Note, DomainError>;

    async fn update_note(&self, note_id: i32, text: String) -> Result<Note, DomainError>;

    async fn delete_note(&self, note_id: i32) -> Result<(), DomainError>;

    /// Reconcile tombstones and modified records with the remote side.
    async fn sync(&self) -> Result<(), DomainError>;

    /// Drop every folder and note belonging to an account. Used when the
    /// account itself is removed or closed.
    async fn purge_account(&self, account_id: i32) -> Result<(), DomainError>;
}

/// Change-notification listener controls.
#[async_trait]
pub trait NotificationPort: Send + Sync {
    /// Subscribe to listener events. Every subscriber sees every event
    /// published after subscription.
    fn subscribe(&self) -> broadcast::Receiver<NotificationEvent>;

    /// Start the listener; emits [`NotificationEvent::Connected`].
    async fn start(&self) -> Result<(), DomainError>;

    /// Stop the listener; emits [`NotificationEvent::Disconnected`].
    async fn stop(&self) -> Result<(), DomainError>;
}
