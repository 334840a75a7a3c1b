//! # Note Store
//!
//! In-memory adapter for [`NotesPort`]. Folders and notes live in one
//! table; deletions are tombstones (`RecordState::Deleted`) until a sync
//! pass purges them, and modifications are marked so sync knows what to
//! push. Every accepted mutation republishes the affected snapshots.

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::watch;
use tracing::debug;

use shared_types::{DomainError, Folder, Note, NoteSummary, RecordState};

use crate::observable::{ObservableCell, ObservableMap};
use crate::ports::NotesPort;

/// Longest title derived from a note's first line.
const TITLE_LIMIT: usize = 30;

/// In-memory folder and note state.
pub struct NoteStore {
    state: RwLock<VaultState>,
    folder_snapshot: ObservableCell<Vec<Folder>>,
    note_snapshots: ObservableMap<i32, Vec<NoteSummary>>,
}

struct VaultState {
    folders: Vec<Folder>,
    notes: Vec<Note>,
    next_folder_id: i32,
    next_note_id: i32,
}

impl NoteStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: RwLock::new(VaultState {
                folders: Vec::new(),
                notes: Vec::new(),
                next_folder_id: 1,
                next_note_id: 1,
            }),
            folder_snapshot: ObservableCell::new(Vec::new()),
            note_snapshots: ObservableMap::new(),
        }
    }

    fn publish_folders(&self, state: &VaultState) {
        let live = state
            .folders
            .iter()
            .filter(|f| f.state != RecordState::Deleted)
            .cloned()
            .collect();
        self.folder_snapshot.publish(live);
    }

    fn publish_notes(&self, state: &VaultState, folder_id: i32) {
        let live = state
            .notes
            .iter()
            .filter(|n| n.folder_id == folder_id && n.state != RecordState::Deleted)
            .map(Note::summary)
            .collect();
        self.note_snapshots.publish(folder_id, live);
    }
}

impl Default for NoteStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotesPort for NoteStore {
    fn watch_folders(&self) -> watch::Receiver<Vec<Folder>> {
        self.folder_snapshot.subscribe()
    }

    fn watch_notes(&self, folder_id: i32) -> watch::Receiver<Vec<NoteSummary>> {
        self.note_snapshots.subscribe(folder_id)
    }

    async fn folder(&self, folder_id: i32) -> Result<Folder, DomainError> {
        self.state
            .read()
            .folders
            .iter()
            .find(|f| f.id == folder_id && f.state != RecordState::Deleted)
            .cloned()
            .ok_or(DomainError::FolderNotFound(folder_id))
    }

    async fn create_folder(&self, account_id: i32, name: String) -> Result<Folder, DomainError> {
        let mut state = self.state.write();

        let id = state.next_folder_id;
        state.next_folder_id += 1;

        let folder = Folder {
            id,
            account_id,
            name,
            state: RecordState::Clean,
        };
        state.folders.push(folder.clone());
        self.publish_folders(&state);

        debug!(folder_id = id, account_id, "folder created");
        Ok(folder)
    }

    async fn delete_folder(&self, folder_id: i32) -> Result<(), DomainError> {
        let mut state = self.state.write();

        let folder = state
            .folders
            .iter_mut()
            .find(|f| f.id == folder_id && f.state != RecordState::Deleted)
            .ok_or(DomainError::FolderNotFound(folder_id))?;
        folder.state = RecordState::Deleted;

        for note in state.notes.iter_mut().filter(|n| n.folder_id == folder_id) {
            note.state = RecordState::Deleted;
        }

        self.publish_folders(&state);
        self.publish_notes(&state, folder_id);

        debug!(folder_id, "folder tombstoned");
        Ok(())
    }

    async fn note(&self, note_id: i32) -> Result<Note, DomainError> {
        self.state
            .read()
            .notes
            .iter()
            .find(|n| n.id == note_id && n.state != RecordState::Deleted)
            .cloned()
            .ok_or(DomainError::NoteNotFound(note_id))
    }

    async fn create_note(&self, folder_id: i32, text: String) -> Result<Note, DomainError> {
        let mut state = self.state.write();

        if !state
            .folders
            .iter()
            .any(|f| f.id == folder_id && f.state != RecordState::Deleted)
        {
            return Err(DomainError::FolderNotFound(folder_id));
        }

        let id = state.next_note_id;
        state.next_note_id += 1;

        let note = Note {
            id,
            folder_id,
            title: derive_title(&text),
            text,
            commit: 1,
            state: RecordState::Clean,
        };
        state.notes.push(note.clone());
        self.publish_notes(&state, folder_id);

        debug!(note_id = id, folder_id, "note created");
        Ok(note)
    }

    async fn update_note(&self, note_id: i32, text: String) -> Result<Note, DomainError> {
        let mut state = self.state.write();

        let note = state
            .notes
            .iter_mut()
            .find(|n| n.id == note_id && n.state != RecordState::Deleted)
            .ok_or(DomainError::NoteNotFound(note_id))?;

        note.title = derive_title(&text);
        note.text = text;
        note.commit += 1;
        note.state = RecordState::Modified;
        let updated = note.clone();

        self.publish_notes(&state, updated.folder_id);
        Ok(updated)
    }

    async fn delete_note(&self, note_id: i32) -> Result<(), DomainError> {
        let mut state = self.state.write();

        let note = state
            .notes
            .iter_mut()
            .find(|n| n.id == note_id && n.state != RecordState::Deleted)
            .ok_or(DomainError::NoteNotFound(note_id))?;
        note.state = RecordState::Deleted;
        let folder_id = note.folder_id;

        self.publish_notes(&state, folder_id);

        debug!(note_id, "note tombstoned");
        Ok(())
    }

    async fn sync(&self) -> Result<(), DomainError> {
        let mut state = self.state.write();

        let purged_folders: Vec<i32> = state
            .folders
            .iter()
            .filter(|f| f.state == RecordState::Deleted)
            .map(|f| f.id)
            .collect();
        let touched: Vec<i32> = state
            .notes
            .iter()
            .filter(|n| n.state != RecordState::Clean)
            .map(|n| n.folder_id)
            .collect();

        state.folders.retain(|f| f.state != RecordState::Deleted);
        state.notes.retain(|n| n.state != RecordState::Deleted);
        for note in &mut state.notes {
            note.state = RecordState::Clean;
        }

        self.publish_folders(&state);
        for folder_id in touched {
            self.publish_notes(&state, folder_id);
        }
        for folder_id in purged_folders {
            self.note_snapshots.remove(folder_id);
        }

        debug!("sync pass finished");
        Ok(())
    }

    async fn purge_account(&self, account_id: i32) -> Result<(), DomainError> {
        let mut state = self.state.write();

        let folder_ids: Vec<i32> = state
            .folders
            .iter()
            .filter(|f| f.account_id == account_id)
            .map(|f| f.id)
            .collect();

        state.folders.retain(|f| f.account_id != account_id);
        state.notes.retain(|n| !folder_ids.contains(&n.folder_id));

        self.publish_folders(&state);
        for folder_id in folder_ids {
            self.note_snapshots.remove(folder_id);
        }

        debug!(account_id, "account content purged");
        Ok(())
    }
}

/// Title = first line of the text, capped at [`TITLE_LIMIT`] characters.
/// Blank text yields no title.
fn derive_title(text: &str) -> Option<String> {
    let first_line = text.trim().lines().next().unwrap_or("").trim();
    if first_line.is_empty() {
        return None;
    }

    Some(first_line.chars().take(TITLE_LIMIT).collect())
}
