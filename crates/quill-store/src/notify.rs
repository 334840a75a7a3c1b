//! # Notification Hub
//!
//! In-memory adapter for [`NotificationPort`]. Stands in for the WebSocket
//! listener a deployment runs against the remote service: `start`/`stop`
//! drive connectivity events, and remote-change pokes are published through
//! [`NotificationHub::publish_remote_change`] by whichever component learns
//! of them.

use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use tokio::sync::broadcast;
use tracing::debug;

use shared_types::{DomainError, NotificationEvent};

use crate::ports::NotificationPort;

/// Events buffered per subscriber before the slowest one starts lagging.
const EVENT_CAPACITY: usize = 64;

/// In-memory change-notification source.
pub struct NotificationHub {
    sender: broadcast::Sender<NotificationEvent>,
    connected: AtomicBool,
}

impl NotificationHub {
    /// Create a hub with no listener running.
    #[must_use]
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            sender,
            connected: AtomicBool::new(false),
        }
    }

    /// Whether the listener is currently connected.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        self.connected.load(Ordering::Acquire)
    }

    /// Publish a remote-change poke for an account. No-op without
    /// subscribers, like any missed broadcast.
    pub fn publish_remote_change(&self, account_id: i32) {
        self.emit(NotificationEvent::RemoteChanged { account_id });
    }

    fn emit(&self, event: NotificationEvent) {
        // send errs only when no subscriber exists; notifications are
        // fire-and-forget either way.
        let receivers = self.sender.send(event.clone()).unwrap_or(0);
        debug!(?event, receivers, "notification published");
    }
}

impl Default for NotificationHub {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationPort for NotificationHub {
    fn subscribe(&self) -> broadcast::Receiver<NotificationEvent> {
        self.sender.subscribe()
    }

    async fn start(&self) -> Result<(), DomainError> {
        if self.connected.swap(true, Ordering::AcqRel) {
            debug!("listener already connected");
            return Ok(());
        }

        self.emit(NotificationEvent::Connected);
        Ok(())
    }

    async fn stop(&self) -> Result<(), DomainError> {
        if !self.connected.swap(false, Ordering::AcqRel) {
            debug!("listener already stopped");
            return Ok(());
        }

        self.emit(NotificationEvent::Disconnected);
        Ok(())
    }
}
