//! Host-side fixtures: a recording callback sink and a fully wired core.

use std::ffi::c_void;
use std::sync::Mutex;
use std::time::Duration;

use tokio::runtime::Handle;

use quill_dispatch::QuillCore;
use shared_types::Config;

/// One recorded delivery, as the host callback observed it.
#[derive(Debug, Clone)]
pub struct Seen {
    pub id: i32,
    pub is_stream: bool,
    pub bytes: Vec<u8>,
}

/// Collects every delivery crossing the gateway.
#[derive(Default)]
pub struct Sink {
    seen: Mutex<Vec<Seen>>,
}

impl Sink {
    /// Every delivery recorded so far, in arrival order.
    pub fn all(&self) -> Vec<Seen> {
        self.seen.lock().unwrap().clone()
    }

    /// Deliveries tagged with one identifier, in arrival order.
    pub fn for_id(&self, id: i32) -> Vec<Seen> {
        self.all().into_iter().filter(|d| d.id == id).collect()
    }

    /// Wait until `count` deliveries are tagged `id`, then return them.
    pub async fn wait_for(&self, id: i32, count: usize) -> Vec<Seen> {
        tokio::time::timeout(Duration::from_secs(5), async {
            loop {
                let seen = self.for_id(id);
                if seen.len() >= count {
                    return seen;
                }
                tokio::task::yield_now().await;
            }
        })
        .await
        .unwrap_or_else(|_| panic!("timed out waiting for {count} deliveries tagged {id}"))
    }

    /// Assert that no further delivery for `id` arrives within the grace
    /// period.
    pub async fn assert_quiet(&self, id: i32, already_seen: usize) {
        tokio::time::sleep(Duration::from_millis(150)).await;
        assert_eq!(
            self.for_id(id).len(),
            already_seen,
            "identifier {id} received deliveries past its grace period"
        );
    }
}

unsafe extern "C" fn record(id: i32, is_stream: bool, bytes: *const u8, len: u64, ctx: *mut c_void) {
    let sink = &*(ctx as *const Sink);
    let bytes = std::slice::from_raw_parts(bytes, len as usize).to_vec();
    sink.seen.lock().unwrap().push(Seen {
        id,
        is_stream,
        bytes,
    });
}

/// A core wired to a leaked sink, running on the current test runtime.
pub fn wired_core() -> (QuillCore, &'static Sink) {
    let core = QuillCore::new(Handle::current(), test_config());
    let sink: &'static Sink = Box::leak(Box::new(Sink::default()));
    core.dispatch
        .install_handler(record, std::ptr::from_ref(sink).cast_mut().cast());
    (core, sink)
}

/// A standalone sink, for tests that swap handlers mid-flight.
pub fn fresh_sink() -> &'static Sink {
    Box::leak(Box::new(Sink::default()))
}

/// Install the recording callback for a sink produced by [`unwired_core`].
pub fn install(core: &QuillCore, sink: &'static Sink) {
    core.dispatch
        .install_handler(record, std::ptr::from_ref(sink).cast_mut().cast());
}

/// The identifier deliveries for `handle` are tagged with.
pub fn delivery_id(handle: u64) -> i32 {
    (handle & 0xFFFF_FFFF) as u32 as i32
}

fn test_config() -> Config {
    Config {
        api_url: "https://api.quill.test".to_string(),
        notify_url: None,
        ws_url: Some("wss://ws.quill.test".to_string()),
        storage_dir: "/tmp/quill-tests".to_string(),
    }
}
