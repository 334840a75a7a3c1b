//! # Cancellation Tokens
//!
//! A token is shared between a registry entry and the task executing the
//! operation. Cancelling sets a flag and wakes every pending waiter; the
//! flag alone is authoritative, the wake-up only bounds the latency.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::Notify;

/// Shared cancellation signal for one operation.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancelToken {
    /// Create a fresh, uncancelled token.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark the token cancelled and wake all waiters. Idempotent.
    pub fn cancel(&self) {
        self.inner.cancelled.store(true, Ordering::Release);
        self.inner.notify.notify_waiters();
    }

    /// Whether cancellation has been requested.
    #[must_use]
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::Acquire)
    }

    /// Resolve once the token is cancelled.
    ///
    /// The notified future is armed before the flag is checked, so a cancel
    /// landing between the check and the await cannot be missed.
    pub async fn cancelled(&self) {
        loop {
            let notified = self.inner.notify.notified();

            if self.is_cancelled() {
                return;
            }

            notified.await;
        }
    }
}
