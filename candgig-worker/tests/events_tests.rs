//! Push, notification click and sync handling.

use std::sync::Arc;

use candgig_core::{CandgigError, EventError};
use candgig_test_utils::fixtures::{manifest_network, worker_config};
use candgig_test_utils::{MockNetwork, RecordingHost};
use candgig_worker::{
    CacheWorker, ClickOutcome, InMemoryCacheStore, Notification, NotificationClick, SyncOutcome,
    ACTION_CLOSE, ACTION_EXPLORE,
};

fn worker(host: RecordingHost) -> (CacheWorker<InMemoryCacheStore, MockNetwork, RecordingHost>, Arc<RecordingHost>) {
    let host = Arc::new(host);
    let worker = CacheWorker::new(
        worker_config(),
        Arc::new(InMemoryCacheStore::new()),
        Arc::new(manifest_network()),
        Arc::clone(&host),
    )
    .unwrap();
    (worker, host)
}

async fn shown_notification(worker: &CacheWorker<InMemoryCacheStore, MockNetwork, RecordingHost>) -> Notification {
    worker
        .handle_push(Some(br#"{"title": "New post", "body": "Fresh content", "primaryKey": 1}"#.as_slice()))
        .await
        .unwrap()
        .unwrap()
}

#[tokio::test]
async fn test_push_shows_notification() {
    let (worker, host) = worker(RecordingHost::new());

    let notification = shown_notification(&worker).await;

    assert_eq!(notification.title, "New post");
    assert_eq!(notification.body, "Fresh content");
    assert_eq!(host.shown(), vec![notification]);
}

#[tokio::test]
async fn test_push_without_payload_is_ignored() {
    let (worker, host) = worker(RecordingHost::new());

    assert!(worker.handle_push(None).await.unwrap().is_none());
    assert!(worker.handle_push(Some(b"".as_slice())).await.unwrap().is_none());
    assert!(host.shown().is_empty());
}

#[tokio::test]
async fn test_malformed_push_is_rejected() {
    let (worker, host) = worker(RecordingHost::new());

    let err = worker.handle_push(Some(b"{not json".as_slice())).await.unwrap_err();

    assert!(matches!(err, CandgigError::Event(EventError::MalformedPush { .. })));
    assert!(host.shown().is_empty());
}

#[tokio::test]
async fn test_close_action_dismisses() {
    let (worker, host) = worker(RecordingHost::new().with_open_client("/"));
    let notification = shown_notification(&worker).await;

    let outcome = worker
        .handle_notification_click(&NotificationClick {
            notification,
            action: Some(ACTION_CLOSE.to_string()),
        })
        .await
        .unwrap();

    assert_eq!(outcome, ClickOutcome::Dismissed);
    assert_eq!(host.closed().len(), 1);
    assert!(host.focused().is_empty());
    assert!(host.opened().is_empty());
}

#[tokio::test]
async fn test_click_focuses_open_client() {
    let (worker, host) = worker(RecordingHost::new().with_open_client("/"));
    let notification = shown_notification(&worker).await;

    let outcome = worker
        .handle_notification_click(&NotificationClick {
            notification,
            action: Some(ACTION_EXPLORE.to_string()),
        })
        .await
        .unwrap();

    assert_eq!(outcome, ClickOutcome::FocusedExisting);
    assert_eq!(host.focused(), vec!["/".to_string()]);
    assert!(host.opened().is_empty());
}

#[tokio::test]
async fn test_click_opens_window_without_client() {
    let (worker, host) = worker(RecordingHost::new());
    let notification = shown_notification(&worker).await;

    let outcome = worker
        .handle_notification_click(&NotificationClick {
            notification,
            action: None,
        })
        .await
        .unwrap();

    assert_eq!(outcome, ClickOutcome::OpenedWindow);
    assert_eq!(host.opened(), vec!["/".to_string()]);
    assert_eq!(host.closed().len(), 1);
}

#[tokio::test]
async fn test_sync_tags() {
    let (worker, _) = worker(RecordingHost::new());

    assert_eq!(
        worker.handle_sync("background-sync").await,
        SyncOutcome::Performed("background-sync".to_string())
    );
    assert_eq!(worker.handle_sync("other").await, SyncOutcome::Ignored);
    assert_eq!(
        worker.handle_periodic_sync("content-sync").await,
        SyncOutcome::Performed("content-sync".to_string())
    );
    assert_eq!(worker.handle_periodic_sync("background-sync").await, SyncOutcome::Ignored);
}
