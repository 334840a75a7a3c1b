//! # Domain Flows
//!
//! End-to-end account, folder, note, sync and notification scenarios
//! driven through the operation layer, observed from the host side of the
//! callback.

#[cfg(test)]
mod tests {
    use quill_codec::{decode_once, decode_stream, StreamFrame};
    use quill_dispatch::ops;
    use quill_store::accounts::LOCAL_ACCOUNT_ID;
    use shared_types::{
        Account, Device, Fault, Folder, NoteSummary, NotificationEvent, RemoteAccount,
    };

    use crate::support::{delivery_id, wired_core, Seen};

    fn summaries(seen: &Seen) -> Vec<NoteSummary> {
        match decode_stream::<Vec<NoteSummary>>(&seen.bytes).expect("well-formed frame") {
            StreamFrame::Item(snapshot) => snapshot,
            other => panic!("expected snapshot, got {other:?}"),
        }
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_note_summaries_snapshot_then_change_then_silence() {
        let (core, sink) = wired_core();

        // Folder with one note.
        ops::notes::create_folder(&core, 1, LOCAL_ACCOUNT_ID, "Work".to_string()).unwrap();
        let folder = decode_once::<Folder>(&sink.wait_for(1, 1).await[0].bytes)
            .unwrap()
            .unwrap();
        ops::notes::create_note(&core, 2, folder.id, "first".to_string()).unwrap();
        sink.wait_for(2, 1).await;

        // Initial snapshot.
        let handle = ops::notes::note_summaries(&core, folder.id);
        let id = delivery_id(handle);
        let seen = sink.wait_for(id, 1).await;
        assert_eq!(summaries(&seen[0]).len(), 1);

        // A change in the folder produces a refreshed snapshot.
        ops::notes::create_note(&core, 3, folder.id, "second".to_string()).unwrap();
        let seen = sink.wait_for(id, 2).await;
        assert_eq!(summaries(&seen[1]).len(), 2);

        // After abort, further changes go unobserved.
        core.dispatch.abort(handle);
        tokio::time::sleep(std::time::Duration::from_millis(50)).await;
        ops::notes::create_note(&core, 4, folder.id, "third".to_string()).unwrap();
        sink.wait_for(4, 1).await;
        sink.assert_quiet(id, 2).await;
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_folders_stream_follows_crud() {
        let (core, sink) = wired_core();

        let handle = ops::notes::folders(&core);
        let id = delivery_id(handle);

        // Empty initial snapshot.
        let seen = sink.wait_for(id, 1).await;
        match decode_stream::<Vec<Folder>>(&seen[0].bytes).unwrap() {
            StreamFrame::Item(snapshot) => assert!(snapshot.is_empty()),
            other => panic!("expected snapshot, got {other:?}"),
        }

        ops::notes::create_folder(&core, 1, LOCAL_ACCOUNT_ID, "Work".to_string()).unwrap();
        let folder = decode_once::<Folder>(&sink.wait_for(1, 1).await[0].bytes)
            .unwrap()
            .unwrap();
        let seen = sink.wait_for(id, 2).await;
        match decode_stream::<Vec<Folder>>(&seen[1].bytes).unwrap() {
            StreamFrame::Item(snapshot) => assert_eq!(snapshot[0].name, "Work"),
            other => panic!("expected snapshot, got {other:?}"),
        }

        // Tombstoning hides the folder from the next snapshot.
        ops::notes::delete_folder(&core, 2, folder.id).unwrap();
        let seen = sink.wait_for(id, 3).await;
        match decode_stream::<Vec<Folder>>(&seen[2].bytes).unwrap() {
            StreamFrame::Item(snapshot) => assert!(snapshot.is_empty()),
            other => panic!("expected snapshot, got {other:?}"),
        }

        core.dispatch.abort(handle);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_note_crud_and_sync_lifecycle() {
        let (core, sink) = wired_core();

        ops::notes::create_folder(&core, 1, LOCAL_ACCOUNT_ID, "Work".to_string()).unwrap();
        let folder = decode_once::<Folder>(&sink.wait_for(1, 1).await[0].bytes)
            .unwrap()
            .unwrap();

        ops::notes::create_note(&core, 2, folder.id, "Standup\nalice: done".to_string()).unwrap();
        let note = decode_once::<shared_types::Note>(&sink.wait_for(2, 1).await[0].bytes)
            .unwrap()
            .unwrap();
        assert_eq!(note.title.as_deref(), Some("Standup"));

        ops::notes::update_note(&core, 3, note.id, "Retro".to_string()).unwrap();
        let updated = decode_once::<shared_types::Note>(&sink.wait_for(3, 1).await[0].bytes)
            .unwrap()
            .unwrap();
        assert_eq!(updated.commit, note.commit + 1);

        ops::notes::delete_note(&core, 4, note.id).unwrap();
        sink.wait_for(4, 1).await;

        // After sync the tombstone is gone and reads still fail cleanly.
        ops::notes::sync(&core, 5).unwrap();
        sink.wait_for(5, 1).await;

        ops::notes::note(&core, 6, note.id).unwrap();
        let outcome = decode_once::<shared_types::Note>(&sink.wait_for(6, 1).await[0].bytes).unwrap();
        assert!(matches!(outcome, Err(Fault::Domain(_))));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_sign_up_and_device_roster_flow() {
        let (core, sink) = wired_core();
        let email = "ada@quill.test".to_string();

        ops::accounts::send_verification_code(&core, 1, email.clone()).unwrap();
        sink.wait_for(1, 1).await;
        let code = core
            .store
            .accounts
            .issued_signup_code(&email)
            .expect("code issued");

        ops::accounts::sign_up(&core, 2, email.clone(), code).unwrap();
        let account = decode_once::<Account>(&sink.wait_for(2, 1).await[0].bytes)
            .unwrap()
            .unwrap();
        assert_eq!(account.email.as_deref(), Some("ada@quill.test"));

        ops::accounts::remote_account(&core, 3, account.id).unwrap();
        let remote = decode_once::<RemoteAccount>(&sink.wait_for(3, 1).await[0].bytes)
            .unwrap()
            .unwrap();
        assert!(remote.verified);

        ops::accounts::add_device(&core, 4, account.id, "fp:aa:bb".to_string()).unwrap();
        let device = decode_once::<Device>(&sink.wait_for(4, 1).await[0].bytes)
            .unwrap()
            .unwrap();

        ops::accounts::devices(&core, 5, account.id).unwrap();
        let roster = decode_once::<Vec<Device>>(&sink.wait_for(5, 1).await[0].bytes)
            .unwrap()
            .unwrap();
        assert_eq!(roster, vec![device]);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_wait_verification_long_poll_resolves_on_approval() {
        let (core, sink) = wired_core();
        let email = "ada@quill.test".to_string();

        ops::accounts::add_account(&core, 1, email.clone()).unwrap();
        sink.wait_for(1, 1).await;

        ops::accounts::request_verification(&core, 2, email).unwrap();
        let token = decode_once::<String>(&sink.wait_for(2, 1).await[0].bytes)
            .unwrap()
            .unwrap();

        // The long-poll stays pending until approval, then resolves once.
        ops::accounts::wait_verification(&core, 3, token.clone()).unwrap();
        sink.assert_quiet(3, 0).await;

        core.store.accounts.approve_verification(&token).unwrap();
        let seen = sink.wait_for(3, 1).await;
        assert_eq!(decode_once::<()>(&seen[0].bytes).unwrap(), Ok(()));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_close_account_purges_content() {
        let (core, sink) = wired_core();
        let email = "ada@quill.test".to_string();

        ops::accounts::add_account(&core, 1, email).unwrap();
        let account = decode_once::<Account>(&sink.wait_for(1, 1).await[0].bytes)
            .unwrap()
            .unwrap();

        ops::notes::create_folder(&core, 2, account.id, "Synced".to_string()).unwrap();
        let folder = decode_once::<Folder>(&sink.wait_for(2, 1).await[0].bytes)
            .unwrap()
            .unwrap();

        // Closing needs the mailed code.
        ops::accounts::send_close_code(&core, 3, account.id).unwrap();
        sink.wait_for(3, 1).await;
        let code = core
            .store
            .accounts
            .issued_close_code(account.id)
            .expect("code issued");

        ops::accounts::close_account(&core, 4, account.id, code).unwrap();
        assert_eq!(
            decode_once::<()>(&sink.wait_for(4, 1).await[0].bytes).unwrap(),
            Ok(())
        );

        // Account and its content are gone.
        ops::accounts::account(&core, 5, account.id).unwrap();
        let outcome = decode_once::<Account>(&sink.wait_for(5, 1).await[0].bytes).unwrap();
        assert!(matches!(outcome, Err(Fault::Domain(_))));

        ops::notes::folder(&core, 6, folder.id).unwrap();
        let outcome = decode_once::<Folder>(&sink.wait_for(6, 1).await[0].bytes).unwrap();
        assert!(matches!(outcome, Err(Fault::Domain(_))));
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_notification_listener_events() {
        let (core, sink) = wired_core();

        let handle = ops::notifications::listen(&core);
        let id = delivery_id(handle);

        ops::notifications::start(&core, 1).unwrap();
        sink.wait_for(1, 1).await;

        let seen = sink.wait_for(id, 1).await;
        assert!(matches!(
            decode_stream::<NotificationEvent>(&seen[0].bytes).unwrap(),
            StreamFrame::Item(NotificationEvent::Connected)
        ));

        core.store.notifications.publish_remote_change(3);
        let seen = sink.wait_for(id, 2).await;
        assert!(matches!(
            decode_stream::<NotificationEvent>(&seen[1].bytes).unwrap(),
            StreamFrame::Item(NotificationEvent::RemoteChanged { account_id: 3 })
        ));

        ops::notifications::stop(&core, 2).unwrap();
        let seen = sink.wait_for(id, 3).await;
        assert!(matches!(
            decode_stream::<NotificationEvent>(&seen[2].bytes).unwrap(),
            StreamFrame::Item(NotificationEvent::Disconnected)
        ));

        core.dispatch.abort(handle);
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn test_accounts_stream_follows_attach_detach() {
        let (core, sink) = wired_core();

        let handle = ops::accounts::accounts(&core);
        let id = delivery_id(handle);

        // Seeded local account in the initial snapshot.
        let seen = sink.wait_for(id, 1).await;
        match decode_stream::<Vec<Account>>(&seen[0].bytes).unwrap() {
            StreamFrame::Item(snapshot) => {
                assert_eq!(snapshot.len(), 1);
                assert_eq!(snapshot[0].id, LOCAL_ACCOUNT_ID);
            }
            other => panic!("expected snapshot, got {other:?}"),
        }

        ops::accounts::add_account(&core, 1, "ada@quill.test".to_string()).unwrap();
        let seen = sink.wait_for(id, 2).await;
        match decode_stream::<Vec<Account>>(&seen[1].bytes).unwrap() {
            StreamFrame::Item(snapshot) => assert_eq!(snapshot.len(), 2),
            other => panic!("expected snapshot, got {other:?}"),
        }

        core.dispatch.abort(handle);
    }
}
