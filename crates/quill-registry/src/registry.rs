//! # Operation Table
//!
//! One table for every in-flight operation, safe under concurrent
//! register/cancel/retire from any execution context. The delivery path
//! retires entries with an atomic take, which is what makes once-semantics
//! structurally exactly-once: whichever caller takes the entry delivers,
//! everyone else finds nothing.

use std::collections::HashMap;
use std::sync::atomic::{AtomicI32, AtomicU32, Ordering};

use parking_lot::RwLock;
use tokio::task::AbortHandle;
use tracing::{debug, warn};

use shared_types::{OperationKind, RegisterError};

use crate::cancel::CancelToken;
use crate::handle::{self, RawHandle, MAX_GENERATION};

/// Registry key: identifiers are unique per category, not globally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OperationKey {
    pub kind: OperationKind,
    pub id: i32,
}

impl OperationKey {
    #[must_use]
    pub const fn once(id: i32) -> Self {
        Self {
            kind: OperationKind::Once,
            id,
        }
    }

    #[must_use]
    pub const fn stream(id: i32) -> Self {
        Self {
            kind: OperationKind::Stream,
            id,
        }
    }
}

/// A live entry's bookkeeping.
#[derive(Debug)]
struct Entry {
    generation: u32,
    token: CancelToken,
    abort: Option<AbortHandle>,
}

/// What an accepted registration hands back to the dispatch core.
#[derive(Debug, Clone)]
pub struct Registration {
    pub key: OperationKey,
    pub generation: u32,
    pub handle: RawHandle,
    pub token: CancelToken,
}

/// The retired remains of an entry, used by the delivery path to decide
/// whether the result may still be delivered.
#[derive(Debug)]
pub struct RetiredEntry {
    token: CancelToken,
}

impl RetiredEntry {
    /// Whether the operation was cancelled before it was retired.
    #[must_use]
    pub fn was_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

/// Concurrent table of in-flight operations.
#[derive(Debug)]
pub struct OperationRegistry {
    entries: RwLock<HashMap<OperationKey, Entry>>,
    next_stream_id: AtomicI32,
    next_generation: AtomicU32,
}

impl OperationRegistry {
    /// Create an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            // Stream ids and generations start at 1; zero is reserved so the
            // invalid handle can never match a live entry.
            next_stream_id: AtomicI32::new(1),
            next_generation: AtomicU32::new(1),
        }
    }

    /// Register a host-chosen once identifier.
    ///
    /// Fails with [`RegisterError::DuplicateIdentifier`] while an entry for
    /// the same once-id is still live.
    pub fn register_once(&self, once_id: i32) -> Result<Registration, RegisterError> {
        let key = OperationKey::once(once_id);
        let generation = self.mint_generation();
        let token = CancelToken::new();

        let mut entries = self.entries.write();
        if entries.contains_key(&key) {
            return Err(RegisterError::DuplicateIdentifier {
                kind: key.kind,
                id: key.id,
            });
        }

        entries.insert(
            key,
            Entry {
                generation,
                token: token.clone(),
                abort: None,
            },
        );
        drop(entries);

        debug!(once_id, generation, "registered once operation");

        Ok(Registration {
            key,
            generation,
            handle: handle::pack(key.kind, key.id, generation),
            token,
        })
    }

    /// Mint a fresh stream identifier and register it.
    ///
    /// The generator is an atomic counter, so duplication is structurally
    /// impossible; exhausting it is a programming fault.
    pub fn open_stream(&self) -> Registration {
        let id = self.next_stream_id.fetch_add(1, Ordering::Relaxed);
        assert!(id > 0, "stream identifier space exhausted");

        let key = OperationKey::stream(id);
        let generation = self.mint_generation();
        let token = CancelToken::new();

        let previous = self.entries.write().insert(
            key,
            Entry {
                generation,
                token: token.clone(),
                abort: None,
            },
        );
        assert!(previous.is_none(), "stream identifier {id} collided");

        debug!(stream_id = id, generation, "registered stream operation");

        Registration {
            key,
            generation,
            handle: handle::pack(key.kind, key.id, generation),
            token,
        }
    }

    /// Attach the abort handle of the task executing an operation.
    ///
    /// A no-op when the entry is already gone (cancelled or completed before
    /// the spawner got here); the task's own cancellation checks cover that
    /// window.
    pub fn attach_abort(&self, key: OperationKey, generation: u32, abort: AbortHandle) {
        let mut entries = self.entries.write();
        match entries.get_mut(&key) {
            Some(entry) if entry.generation == generation => entry.abort = Some(abort),
            _ => debug!(?key, generation, "abort handle arrived after retirement"),
        }
    }

    /// Cancel the operation a host handle refers to.
    ///
    /// Marks the token, aborts the task best-effort and retires the entry.
    /// Idempotent: unknown, stale and already-retired handles are no-ops.
    pub fn cancel(&self, raw: RawHandle) {
        let Some((kind, id, generation)) = handle::unpack(raw) else {
            debug!(handle = raw, "ignoring invalid abort handle");
            return;
        };

        let key = OperationKey { kind, id };
        let removed = {
            let mut entries = self.entries.write();
            match entries.get(&key).map(|entry| entry.generation) {
                Some(live) if live == generation => entries.remove(&key),
                Some(live) => {
                    debug!(?key, stale = generation, live, "ignoring stale abort handle");
                    None
                }
                None => None,
            }
        };

        if let Some(entry) = removed {
            entry.token.cancel();
            if let Some(abort) = entry.abort {
                abort.abort();
            }
            debug!(?key, generation, "operation cancelled");
        }
    }

    /// Atomically retire an entry if it still belongs to `generation`.
    ///
    /// Returns the retired remains exactly once; any further completion
    /// attempt for the identifier finds nothing and must be discarded by
    /// the caller.
    pub fn retire_if_current(&self, key: OperationKey, generation: u32) -> Option<RetiredEntry> {
        let mut entries = self.entries.write();

        let current = entries
            .get(&key)
            .is_some_and(|entry| entry.generation == generation);
        if !current {
            return None;
        }

        entries
            .remove(&key)
            .map(|entry| RetiredEntry { token: entry.token })
    }

    /// Retire an entry unconditionally. Unknown identifiers are a no-op,
    /// which guards against races between natural completion and late
    /// cancellation.
    pub fn retire(&self, key: OperationKey) {
        if self.entries.write().remove(&key).is_none() {
            debug!(?key, "retire on unknown identifier ignored");
        }
    }

    /// Whether cancellation was requested for a live entry. Retired entries
    /// report `false`; their task observed the outcome through
    /// [`Self::retire_if_current`] already.
    #[must_use]
    pub fn is_cancelled(&self, key: OperationKey) -> bool {
        self.entries
            .read()
            .get(&key)
            .map(|entry| entry.token.is_cancelled())
            .unwrap_or(false)
    }

    /// Whether an entry is currently live.
    #[must_use]
    pub fn is_live(&self, key: OperationKey) -> bool {
        self.entries.read().contains_key(&key)
    }

    /// Number of live entries.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.entries.read().len()
    }

    fn mint_generation(&self) -> u32 {
        let generation = self.next_generation.fetch_add(1, Ordering::Relaxed);
        if generation > MAX_GENERATION {
            // A 31-bit generation space outlives any realistic process; a
            // wrap means the counter itself is broken.
            warn!(generation, "generation counter past bound");
            panic!("operation generation space exhausted");
        }
        generation
    }
}
