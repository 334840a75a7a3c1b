//! # Known Gaps
//!
//! Behaviors the design documents as implementation-defined rather than
//! guaranteed. These tests pin the *current* choice so an accidental
//! change shows up; they are not contracts hosts may rely on.

#[cfg(test)]
mod tests {
    use quill_dispatch::ops;
    use quill_store::accounts::LOCAL_ACCOUNT_ID;

    use crate::support::{fresh_sink, install, wired_core};

    /// Re-installing the callback while operations are in flight is
    /// last-writer-wins: deliveries drained after the swap use the new
    /// context, even ones enqueued before it.
    #[tokio::test(flavor = "multi_thread")]
    async fn test_reinstall_is_last_writer_wins() {
        let (core, first) = wired_core();
        let second = fresh_sink();

        // Quiesce, then park a delivery in the queue and swap handlers
        // before the pump can possibly drain it... there is no such
        // window we can force from outside, so accept either sink for
        // this delivery and require the NEXT one to hit the new context.
        ops::notes::create_folder(&core, 1, LOCAL_ACCOUNT_ID, "Before".to_string()).unwrap();
        first.wait_for(1, 1).await;

        install(&core, second);

        ops::notes::create_folder(&core, 2, LOCAL_ACCOUNT_ID, "After".to_string()).unwrap();
        second.wait_for(2, 1).await;

        assert!(first.for_id(2).is_empty(), "old context observed a post-swap delivery");
    }

    /// A cancelled once identifier is immediately reusable even though its
    /// callback never fired. The uniqueness invariant binds live entries
    /// only.
    #[tokio::test(flavor = "multi_thread")]
    async fn test_cancelled_once_id_reusable_before_any_delivery() {
        let (core, sink) = wired_core();

        let gate = std::sync::Arc::new(tokio::sync::Notify::new());
        let held = gate.clone();
        let handle = core
            .dispatch
            .submit_once(7, async move {
                held.notified().await;
                Ok::<_, shared_types::Fault>(())
            })
            .unwrap();

        core.dispatch.abort(handle);

        // Immediate reuse is accepted and delivers normally.
        ops::notes::create_folder(&core, 7, LOCAL_ACCOUNT_ID, "Reused".to_string()).unwrap();
        sink.wait_for(7, 1).await;
        sink.assert_quiet(7, 1).await;
    }
}
