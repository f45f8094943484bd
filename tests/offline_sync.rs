mod common;

use std::sync::Arc;
use std::time::Duration;

use common::StubApi;
use expense_outbox::config::Settings;
use expense_outbox::persistence::QueueStore;
use expense_outbox::queue::{OfflineQueue, Record, SubmitOutcome};
use expense_outbox::sync::spawn_sync_worker;
use expense_outbox::transport::{ConnectivityMonitor, HttpDelivery};
use serde_json::json;
use tempfile::tempdir;
use tokio::sync::watch;

fn settings_for(stub: &StubApi, storage: &str) -> Settings {
    let mut settings = Settings::default();
    settings.api.base_url = stub.base_url();
    settings.api.timeout_secs = 5;
    settings.storage.path = storage.to_string();
    settings.sync.probe_interval_secs = 1;
    settings.sync.probe_timeout_ms = 500;
    settings
}

#[tokio::test]
async fn offline_records_sync_once_api_is_reachable() {
    let stub = StubApi::start(&[]).await;
    let dir = tempdir().unwrap();
    let settings = settings_for(&stub, dir.path().to_str().unwrap());

    let store = QueueStore::open(&settings.storage.path, &settings.storage.queue_key).unwrap();
    let delivery = HttpDelivery::new(&settings.api).unwrap();
    let (online, rx) = watch::channel(false);
    let queue = Arc::new(OfflineQueue::open(store.clone(), delivery, rx).unwrap());

    for message in ["coffee 35k", "taxi 120k"] {
        let outcome = queue
            .submit(Record::new(message, "u1").unwrap())
            .await
            .unwrap();
        assert_eq!(outcome, SubmitOutcome::Queued);
    }
    assert!(stub.bodies().is_empty());
    assert_eq!(store.load().unwrap().pending.len(), 2);

    let worker = spawn_sync_worker(queue.clone(), online.subscribe());
    let monitor = ConnectivityMonitor::from_settings(&settings).unwrap();
    let probing = tokio::spawn(monitor.run(online));

    tokio::time::timeout(Duration::from_secs(10), async {
        while !queue.is_empty().await {
            tokio::time::sleep(Duration::from_millis(20)).await;
        }
    })
    .await
    .expect("queue was not synced");

    assert_eq!(
        stub.bodies(),
        vec![
            json!({ "message": "coffee 35k", "userId": "u1" }),
            json!({ "message": "taxi 120k", "userId": "u1" }),
        ]
    );
    let stored = store.load().unwrap();
    assert!(stored.pending.is_empty());
    assert!(stored.in_flight.is_empty());

    probing.abort();
    let _ = probing.await;
    tokio::time::timeout(Duration::from_secs(5), worker)
        .await
        .expect("worker did not stop")
        .unwrap();
}

#[tokio::test]
async fn rejected_delivery_is_saved_and_retried() {
    let stub = StubApi::start(&[500]).await;
    let dir = tempdir().unwrap();
    let settings = settings_for(&stub, dir.path().to_str().unwrap());

    let store = QueueStore::open(&settings.storage.path, &settings.storage.queue_key).unwrap();
    let delivery = HttpDelivery::new(&settings.api).unwrap();
    let (_online, rx) = watch::channel(true);
    let queue = OfflineQueue::open(store.clone(), delivery, rx).unwrap();

    let outcome = queue
        .submit(Record::new("lunch 50k", "u2").unwrap())
        .await
        .unwrap();
    assert_eq!(outcome, SubmitOutcome::Queued);
    assert_eq!(stub.bodies().len(), 1);

    let queued = store.load().unwrap().pending;
    assert_eq!(queued.len(), 1);
    assert!(queued[0].timestamp.is_some());

    let report = queue.flush().await.unwrap();
    assert_eq!(report.synced, 1);
    assert_eq!(report.remaining, 0);
    assert_eq!(stub.bodies().len(), 2);
    assert!(store.load().unwrap().pending.is_empty());
}
