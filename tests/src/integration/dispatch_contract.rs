//! # Dispatch Contract
//!
//! The delivery guarantees of the boundary, exercised through the wired
//! core: exactly-once semantics, stream ordering, idempotent cancellation
//! and identifier reuse rules.

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::sync::Notify;

    use quill_codec::{decode_once, decode_stream, StreamFrame, WireError};
    use quill_dispatch::ops;
    use shared_types::{Fault, Folder, OperationKind, RegisterError};

    use crate::support::{delivery_id, wired_core};

    #[tokio::test(flavor = "multi_thread")]
    async fn test_once_operation_delivers_exactly_once() {
        let (core, sink) = wired_core();

        ops::notes::create_folder(&core, 7, 1, "Work".to_string()).unwrap();

        let seen = sink.wait_for(7, 1).await;
        assert!(!seen[0].is_stream);

        let folder = decode_once::<Folder>(&seen[0].bytes)
            .expect("well-formed frame")
            .expect("folder record");
        assert_eq!(folder.name, "Work");

        // Never a second delivery for the same identifier.
        sink.assert_quiet(7, 1).await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_cancelled_once_delivers_zero() {
        let (core, sink) = wired_core();

        let gate = Arc::new(Notify::new());
        let held = gate.clone();
        let handle = core
            .dispatch
            .submit_once(7, async move {
                held.notified().await;
                Ok::<_, Fault>(())
            })
            .unwrap();

        core.dispatch.abort(handle);
        gate.notify_one();

        sink.assert_quiet(7, 0).await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_duplicate_once_id_rejected_until_resolved() {
        let (core, sink) = wired_core();

        let gate = Arc::new(Notify::new());
        let held = gate.clone();
        core.dispatch
            .submit_once(7, async move {
                held.notified().await;
                Ok::<_, Fault>(())
            })
            .unwrap();

        // Reuse while live fails.
        let duplicate = ops::notes::create_folder(&core, 7, 1, "Again".to_string());
        assert_eq!(
            duplicate.unwrap_err(),
            RegisterError::DuplicateIdentifier {
                kind: OperationKind::Once,
                id: 7
            }
        );

        // Reuse after the single delivery succeeds.
        gate.notify_one();
        sink.wait_for(7, 1).await;
        assert!(ops::notes::create_folder(&core, 7, 1, "Again".to_string()).is_ok());
        sink.wait_for(7, 2).await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_stream_deliveries_preserve_production_order() {
        let (core, sink) = wired_core();

        let items: Vec<Result<i32, Fault>> = (0..100).map(Ok).collect();
        let handle = core.dispatch.open_stream(tokio_stream::iter(items));
        let id = delivery_id(handle);

        let seen = sink.wait_for(id, 101).await;

        let mut produced = Vec::new();
        for delivery in &seen {
            assert!(delivery.is_stream);
            match decode_stream::<i32>(&delivery.bytes).expect("well-formed frame") {
                StreamFrame::Item(value) => produced.push(value),
                StreamFrame::Complete => produced.push(i32::MAX),
                StreamFrame::Failed(fault) => panic!("unexpected fault: {fault}"),
            }
        }

        let mut expected: Vec<i32> = (0..100).collect();
        expected.push(i32::MAX);
        assert_eq!(produced, expected);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_no_deliveries_after_abort_grace_period() {
        let (core, sink) = wired_core();

        let (tx, rx) = tokio::sync::mpsc::channel::<Result<i32, Fault>>(8);
        let handle = core
            .dispatch
            .open_stream(tokio_stream::wrappers::ReceiverStream::new(rx));
        let id = delivery_id(handle);

        tx.send(Ok(1)).await.unwrap();
        sink.wait_for(id, 1).await;

        core.dispatch.abort(handle);
        tokio::time::sleep(Duration::from_millis(50)).await;

        let _ = tx.send(Ok(2)).await;
        let _ = tx.send(Ok(3)).await;
        sink.assert_quiet(id, 1).await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_abort_idempotent_on_every_lifecycle_stage() {
        let (core, sink) = wired_core();

        // Live, then retired by delivery.
        let handle = core
            .dispatch
            .submit_once(9, async { Ok::<_, Fault>(()) })
            .unwrap();
        sink.wait_for(9, 1).await;

        core.dispatch.abort(handle);
        core.dispatch.abort(handle);

        // Unknown handles.
        core.dispatch.abort(u64::MAX);
        core.dispatch.abort(0);

        // The registry stays clean and nothing further is delivered.
        assert_eq!(core.dispatch.registry().live_count(), 0);
        sink.assert_quiet(9, 1).await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_domain_failure_is_a_normal_payload() {
        let (core, sink) = wired_core();

        // Account 999 does not exist; the failure must arrive as a frame.
        ops::notes::create_folder(&core, 11, 999, "Orphan".to_string()).unwrap();

        let seen = sink.wait_for(11, 1).await;
        let outcome = decode_once::<Folder>(&seen[0].bytes).expect("well-formed frame");
        assert!(matches!(outcome, Err(Fault::Domain(_))));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_malformed_payload_bytes_decode_to_errors() {
        // Host-side guarantee: garbage never decodes silently.
        assert!(matches!(
            decode_once::<Folder>(&[0x00]),
            Err(WireError::Truncated { .. })
        ));
        assert!(matches!(
            decode_once::<Folder>(&[0x09, 0x00, 0x01]),
            Err(WireError::VersionMismatch { .. })
        ));
        assert!(matches!(
            decode_stream::<Folder>(&[0x01, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF]),
            Err(WireError::MalformedBody(_))
        ));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_rejected_stream_fails_then_completes() {
        let (core, sink) = wired_core();

        let handle = core
            .dispatch
            .reject_stream(Fault::Transport("unreachable".to_string()));
        let id = delivery_id(handle);

        let seen = sink.wait_for(id, 2).await;
        assert!(matches!(
            decode_stream::<()>(&seen[0].bytes).unwrap(),
            StreamFrame::Failed(Fault::Transport(_))
        ));
        assert!(matches!(
            decode_stream::<()>(&seen[1].bytes).unwrap(),
            StreamFrame::Complete
        ));

        // Terminal frame retired the entry.
        assert_eq!(core.dispatch.registry().live_count(), 0);
    }
}
