//! # Callback Gateway
//!
//! The single channel by which results reach the host: one registered
//! function pointer plus its opaque context. Internally a task/channel
//! pair — [`CallbackGateway::deliver`] enqueues, one pump task drains and
//! invokes the callback — so deliveries for one identifier can never
//! overlap or reorder, while different identifiers interleave freely.
//!
//! Deliveries enqueued before the handler is installed are buffered in the
//! channel and drained once the pump starts.
//!
//! ## Re-installation
//!
//! The registration slot is process-wide and last-writer-wins: the pump
//! reads the current registration for every delivery it drains, so a
//! delivery enqueued under an old registration but drained after a
//! re-install reaches the NEW context. Re-installing while operations are
//! in flight is legal but the host owns the consequences.

use std::ffi::c_void;

use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc;
use tracing::{debug, error, warn};

use shared_types::OperationKind;

/// Signature of the host's result callback.
///
/// Invoked once per delivery with the operation identifier, the stream
/// flag, the payload bytes (valid only for the duration of the call) and
/// the context pointer passed at installation.
pub type HostCallback =
    unsafe extern "C" fn(id: i32, is_stream: bool, bytes: *const u8, len: u64, ctx: *mut c_void);

/// One result crossing the boundary.
#[derive(Debug)]
pub struct Delivery {
    pub id: i32,
    pub kind: OperationKind,
    pub bytes: Vec<u8>,
}

#[derive(Clone, Copy)]
struct Registration {
    callback: HostCallback,
    context: *mut c_void,
}

// The host promises the context pointer is valid for the process lifetime
// and that the callback tolerates invocation from a core-owned thread.
// That promise is the installation contract, not something the gateway
// can check.
unsafe impl Send for Registration {}
unsafe impl Sync for Registration {}

/// Process-wide delivery conduit. Performs no payload interpretation.
pub struct CallbackGateway {
    registration: RwLock<Option<Registration>>,
    queue: mpsc::UnboundedSender<Delivery>,
    /// Parked until the pump claims it on first installation.
    backlog: Mutex<Option<mpsc::UnboundedReceiver<Delivery>>>,
}

impl CallbackGateway {
    /// Create a gateway with an empty registration slot.
    #[must_use]
    pub fn new() -> Self {
        let (queue, receiver) = mpsc::unbounded_channel();
        Self {
            registration: RwLock::new(None),
            queue,
            backlog: Mutex::new(Some(receiver)),
        }
    }

    /// Install (or replace) the host callback. Last writer wins.
    pub fn install(&self, callback: HostCallback, context: *mut c_void) {
        let mut slot = self.registration.write();
        if slot.is_some() {
            warn!("replacing live callback registration; in-flight deliveries use the new context");
        }
        *slot = Some(Registration { callback, context });
    }

    /// Whether a callback is currently registered.
    #[must_use]
    pub fn is_installed(&self) -> bool {
        self.registration.read().is_some()
    }

    /// Enqueue a result for the pump. Never blocks; ordering within one
    /// identifier follows enqueue order.
    pub fn deliver(&self, id: i32, kind: OperationKind, bytes: Vec<u8>) {
        debug!(id, ?kind, len = bytes.len(), "delivery enqueued");

        if self.queue.send(Delivery { id, kind, bytes }).is_err() {
            // Only possible once the pump has shut down with the runtime.
            warn!(id, "delivery dropped: pump is gone");
        }
    }

    /// Claim the receiving end for the pump task. Yields `Some` exactly
    /// once per process.
    pub fn claim_backlog(&self) -> Option<mpsc::UnboundedReceiver<Delivery>> {
        self.backlog.lock().take()
    }

    /// Drain deliveries forever, invoking the currently installed callback
    /// for each. Runs on a core-owned task.
    pub async fn pump(&self, mut receiver: mpsc::UnboundedReceiver<Delivery>) {
        while let Some(delivery) = receiver.recv().await {
            // Copy the registration out before invoking so a host that
            // re-installs from inside its callback cannot deadlock us.
            let registration = *self.registration.read();

            let Some(registration) = registration else {
                error!(id = delivery.id, "delivery dropped: no callback installed");
                continue;
            };

            unsafe {
                (registration.callback)(
                    delivery.id,
                    delivery.kind.is_stream(),
                    delivery.bytes.as_ptr(),
                    delivery.bytes.len() as u64,
                    registration.context,
                );
            }
        }
    }
}

impl Default for CallbackGateway {
    fn default() -> Self {
        Self::new()
    }
}
