//! # Dispatch Core
//!
//! Receives typed, validated requests and turns them into registry entries
//! plus background tasks. The core guarantees the delivery contract no
//! matter where the work runs:
//!
//! - **once**: exactly one delivery per identifier, or none if cancelled
//!   first. The delivery path retires the entry with an atomic take, so a
//!   duplicate completion finds nothing and is discarded defensively.
//! - **stream**: ordered deliveries until the source ends (terminal
//!   `Complete` frame) or the host aborts (entry retired immediately,
//!   in-flight deliveries best-effort).
//!
//! Submission never blocks: it registers, spawns and returns the handle.

use std::future::Future;

use serde::Serialize;
use tokio::runtime::Handle;
use tokio_stream::{Stream, StreamExt};
use tracing::{debug, error, warn};

use quill_codec::wire::{self, StreamFrame};
use quill_registry::{OperationRegistry, RawHandle, Registration};
use shared_types::{Fault, OnceId, OperationKind, RegisterError};

use crate::gateway::CallbackGateway;

use std::sync::Arc;

/// The dispatch multiplexer: registry bookkeeping plus delivery.
#[derive(Clone)]
pub struct DispatchCore {
    registry: Arc<OperationRegistry>,
    gateway: Arc<CallbackGateway>,
    runtime: Handle,
}

impl DispatchCore {
    /// Build a core that spawns its background work on `runtime`.
    #[must_use]
    pub fn new(runtime: Handle) -> Self {
        Self {
            registry: Arc::new(OperationRegistry::new()),
            gateway: Arc::new(CallbackGateway::new()),
            runtime,
        }
    }

    /// The registry, for introspection by tests and the FFI layer.
    #[must_use]
    pub fn registry(&self) -> &Arc<OperationRegistry> {
        &self.registry
    }

    /// The gateway, for handler installation.
    #[must_use]
    pub fn gateway(&self) -> &Arc<CallbackGateway> {
        &self.gateway
    }

    /// Install the host callback and start the delivery pump on the first
    /// installation. Non-blocking.
    pub fn install_handler(
        &self,
        callback: crate::gateway::HostCallback,
        context: *mut std::ffi::c_void,
    ) {
        self.gateway.install(callback, context);

        if let Some(receiver) = self.gateway.claim_backlog() {
            let gateway = self.gateway.clone();
            self.runtime.spawn(async move { gateway.pump(receiver).await });
            debug!("delivery pump started");
        }
    }

    /// Cancel whatever operation `handle` refers to. Fire-and-forget.
    pub fn abort(&self, handle: RawHandle) {
        self.registry.cancel(handle);
    }

    /// Submit a once-operation under a host-chosen identifier.
    ///
    /// Returns the cancellation handle immediately; the outcome — success
    /// or structured failure alike — is delivered later through the
    /// gateway.
    pub fn submit_once<T, F>(&self, once_id: OnceId, work: F) -> Result<RawHandle, RegisterError>
    where
        T: Serialize + Send + 'static,
        F: Future<Output = Result<T, Fault>> + Send + 'static,
    {
        let reg = self.registry.register_once(once_id)?;
        let handle = reg.handle;

        let registry = self.registry.clone();
        let gateway = self.gateway.clone();
        let Registration {
            key,
            generation,
            token,
            ..
        } = reg;

        let task = self.runtime.spawn(async move {
            let outcome = tokio::select! {
                _ = token.cancelled() => {
                    // cancel() already retired the entry; nothing to do.
                    debug!(once_id, "once operation cancelled before completion");
                    return;
                }
                outcome = work => outcome,
            };

            match registry.retire_if_current(key, generation) {
                Some(retired) if !retired.was_cancelled() => match wire::encode_once(&outcome) {
                    Ok(bytes) => gateway.deliver(once_id, OperationKind::Once, bytes),
                    Err(e) => error!(once_id, %e, "dropping undeliverable once result"),
                },
                Some(_) => debug!(once_id, "suppressing delivery of cancelled once result"),
                None => warn!(once_id, "discarding duplicate completion"),
            }
        });

        self.registry.attach_abort(key, generation, task.abort_handle());
        Ok(handle)
    }

    /// Deliver an immediate failure through the once path.
    ///
    /// Used for argument-validation failures so they reach the host on the
    /// same channel as every other outcome.
    pub fn reject_once(&self, once_id: OnceId, fault: Fault) -> Result<RawHandle, RegisterError> {
        // The error arm of the wire shape carries no success payload, so
        // `()` stands in for whatever the operation would have returned.
        self.submit_once::<(), _>(once_id, async move { Err(fault) })
    }

    /// Open a stream-operation over `source`.
    ///
    /// The core mints the subscription identifier (low 32 bits of the
    /// returned handle). Each `Ok` item becomes an `Item` frame, each
    /// `Err` a `Failed` frame; source exhaustion delivers the terminal
    /// `Complete` frame and retires the entry.
    pub fn open_stream<T, S>(&self, source: S) -> RawHandle
    where
        T: Serialize + Send + 'static,
        S: Stream<Item = Result<T, Fault>> + Send + 'static,
    {
        let reg = self.registry.open_stream();
        let handle = reg.handle;

        let registry = self.registry.clone();
        let gateway = self.gateway.clone();
        let Registration {
            key,
            generation,
            token,
            ..
        } = reg;
        let stream_id = key.id;

        let task = self.runtime.spawn(async move {
            tokio::pin!(source);

            loop {
                let next = tokio::select! {
                    _ = token.cancelled() => {
                        debug!(stream_id, "stream cancelled");
                        return;
                    }
                    next = source.next() => next,
                };

                let Some(item) = next else {
                    break;
                };

                // A cancel that raced the item above wins: no delivery.
                if token.is_cancelled() {
                    return;
                }

                let frame = match item {
                    Ok(value) => StreamFrame::Item(value),
                    Err(fault) => StreamFrame::Failed(fault),
                };
                match wire::encode_stream(&frame) {
                    Ok(bytes) => gateway.deliver(stream_id, OperationKind::Stream, bytes),
                    Err(e) => error!(stream_id, %e, "dropping undeliverable stream frame"),
                }
            }

            // Source exhausted: terminal marker, delivered at most once.
            match registry.retire_if_current(key, generation) {
                Some(retired) if !retired.was_cancelled() => {
                    match wire::encode_stream(&StreamFrame::<T>::Complete) {
                        Ok(bytes) => gateway.deliver(stream_id, OperationKind::Stream, bytes),
                        Err(e) => error!(stream_id, %e, "dropping undeliverable terminal frame"),
                    }
                }
                _ => debug!(stream_id, "stream ended after cancellation"),
            }
        });

        self.registry.attach_abort(key, generation, task.abort_handle());
        handle
    }

    /// Open a stream that delivers a single failure and completes. The
    /// stream-side analogue of [`Self::reject_once`].
    pub fn reject_stream(&self, fault: Fault) -> RawHandle {
        self.open_stream::<(), _>(tokio_stream::once(Err(fault)))
    }
}
