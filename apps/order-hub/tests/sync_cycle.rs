//! Sync Orchestrator Integration Tests
//!
//! Drives full refresh cycles over hand-written port fakes, asserting the
//! state-machine guarantees: webhook rotation order, pagination threading,
//! all-or-nothing snapshot installs, and subscriber notification.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::NaiveDate;
use order_hub::{
    NotificationHub, OrderRecord, OrderStatus, RecordPage, RecordSource, SnapshotStore,
    SourceError, SyncConfig, SyncError, SyncService, WebhookFilter, WebhookRegistrar,
    WebhookSubscription,
};
use rust_decimal::Decimal;

// =============================================================================
// Fakes
// =============================================================================

/// Record source that serves a scripted sequence of page results.
#[derive(Default)]
struct FakeSource {
    pages: Mutex<VecDeque<Result<RecordPage, SourceError>>>,
    offsets_seen: Mutex<Vec<Option<String>>>,
}

impl FakeSource {
    fn with_pages(pages: Vec<Result<RecordPage, SourceError>>) -> Self {
        Self {
            pages: Mutex::new(pages.into()),
            offsets_seen: Mutex::new(Vec::new()),
        }
    }

    fn offsets_seen(&self) -> Vec<Option<String>> {
        self.offsets_seen.lock().unwrap().clone()
    }

    fn calls(&self) -> usize {
        self.offsets_seen.lock().unwrap().len()
    }
}

#[async_trait]
impl RecordSource for FakeSource {
    async fn fetch_page(
        &self,
        _base_id: &str,
        _table: &str,
        _view: &str,
        offset: Option<&str>,
    ) -> Result<RecordPage, SourceError> {
        self.offsets_seen
            .lock()
            .unwrap()
            .push(offset.map(str::to_string));
        self.pages
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Ok(RecordPage::default()))
    }
}

/// Registrar that records rotation calls and injects scripted failures.
#[derive(Default)]
struct FakeRegistrar {
    existing: Vec<WebhookSubscription>,
    fail_list: bool,
    fail_delete: bool,
    fail_create: bool,
    deleted: Mutex<Vec<String>>,
    creates: AtomicUsize,
}

impl FakeRegistrar {
    fn with_existing(ids: &[&str]) -> Self {
        Self {
            existing: ids
                .iter()
                .map(|id| WebhookSubscription {
                    id: (*id).to_string(),
                    notification_url: None,
                })
                .collect(),
            ..Self::default()
        }
    }

    fn deleted(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    fn creates(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl WebhookRegistrar for FakeRegistrar {
    async fn list(&self, _base_id: &str) -> Result<Vec<WebhookSubscription>, SourceError> {
        if self.fail_list {
            return Err(SourceError::Transport("list unavailable".to_string()));
        }
        Ok(self.existing.clone())
    }

    async fn create(
        &self,
        _base_id: &str,
        notification_url: &str,
        _filter: &WebhookFilter,
    ) -> Result<WebhookSubscription, SourceError> {
        if self.fail_create {
            return Err(SourceError::Api {
                status: 422,
                message: "cannot create webhook".to_string(),
            });
        }
        self.creates.fetch_add(1, Ordering::SeqCst);
        Ok(WebhookSubscription {
            id: "achFresh".to_string(),
            notification_url: Some(notification_url.to_string()),
        })
    }

    async fn delete(&self, _base_id: &str, subscription_id: &str) -> Result<(), SourceError> {
        if self.fail_delete {
            return Err(SourceError::Api {
                status: 500,
                message: "delete exploded".to_string(),
            });
        }
        self.deleted
            .lock()
            .unwrap()
            .push(subscription_id.to_string());
        Ok(())
    }
}

// =============================================================================
// Helpers
// =============================================================================

fn order(id: &str) -> OrderRecord {
    OrderRecord {
        id: id.to_string(),
        status: OrderStatus::Placed,
        placed_on: NaiveDate::from_ymd_opt(2024, 1, 2).unwrap(),
        price: Decimal::ONE,
        product_name: "bow".to_string(),
    }
}

fn page(ids: &[&str], next_offset: Option<&str>) -> Result<RecordPage, SourceError> {
    Ok(RecordPage {
        records: ids.iter().map(|id| order(id)).collect(),
        next_offset: next_offset.map(str::to_string),
    })
}

struct Harness {
    source: Arc<FakeSource>,
    registrar: Arc<FakeRegistrar>,
    snapshot: Arc<SnapshotStore>,
    hub: Arc<NotificationHub>,
    service: SyncService,
}

fn harness(source: FakeSource, registrar: FakeRegistrar) -> Harness {
    let source = Arc::new(source);
    let registrar = Arc::new(registrar);
    let snapshot = Arc::new(SnapshotStore::new());
    let hub = Arc::new(NotificationHub::with_defaults());

    let service = SyncService::new(
        Arc::clone(&source) as Arc<dyn RecordSource>,
        Arc::clone(&registrar) as Arc<dyn WebhookRegistrar>,
        Arc::clone(&snapshot),
        Arc::clone(&hub),
        SyncConfig {
            base_id: "appBase123".to_string(),
            table_name: "Orders".to_string(),
            view_name: "Grid view".to_string(),
            notification_url: "https://hooks.example.test/ping".to_string(),
        },
    );

    Harness {
        source,
        registrar,
        snapshot,
        hub,
        service,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn cycle_rotates_fetches_installs_and_notifies() {
    let h = harness(
        FakeSource::with_pages(vec![
            page(&["rec1", "rec2"], Some("p2")),
            page(&["rec3"], None),
        ]),
        FakeRegistrar::with_existing(&["ach1", "ach2"]),
    );
    let mut notices = h.hub.subscribe();

    let report = h.service.run_cycle().await.unwrap();

    assert_eq!(report.records, 3);
    assert_eq!(report.subscribers_notified, 1);

    // Pagination threaded the offset and preserved page order.
    assert_eq!(
        h.source.offsets_seen(),
        vec![None, Some("p2".to_string())]
    );
    let snapshot = h.snapshot.read();
    let ids: Vec<_> = snapshot.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["rec1", "rec2", "rec3"]);

    // Rotation deleted every stale subscription, then created exactly one.
    assert_eq!(h.registrar.deleted(), vec!["ach1", "ach2"]);
    assert_eq!(h.registrar.creates(), 1);

    assert!(notices.try_recv().is_ok());
}

#[tokio::test]
async fn delete_failure_does_not_block_create() {
    let registrar = FakeRegistrar {
        fail_delete: true,
        ..FakeRegistrar::with_existing(&["ach1"])
    };

    let h = harness(FakeSource::with_pages(vec![page(&["rec1"], None)]), registrar);

    let report = h.service.run_cycle().await.unwrap();

    assert_eq!(report.records, 1);
    assert_eq!(h.registrar.creates(), 1);
    assert!(h.registrar.deleted().is_empty());
}

#[tokio::test]
async fn create_failure_aborts_before_any_fetch() {
    let registrar = FakeRegistrar {
        fail_create: true,
        ..FakeRegistrar::default()
    };

    let h = harness(FakeSource::with_pages(vec![page(&["recNew"], None)]), registrar);
    h.snapshot.replace(vec![order("recOld")]);
    let mut notices = h.hub.subscribe();

    let err = h.service.run_cycle().await.unwrap_err();

    assert!(matches!(err, SyncError::Rotation(_)), "got {err:?}");
    assert_eq!(h.source.calls(), 0);
    assert_eq!(h.snapshot.read()[0].id, "recOld");
    assert!(notices.try_recv().is_err());
}

#[tokio::test]
async fn list_failure_aborts_the_cycle() {
    let registrar = FakeRegistrar {
        fail_list: true,
        ..FakeRegistrar::default()
    };

    let h = harness(FakeSource::default(), registrar);

    let err = h.service.run_cycle().await.unwrap_err();
    assert!(matches!(err, SyncError::Rotation(_)), "got {err:?}");
    assert_eq!(h.registrar.creates(), 0);
}

#[tokio::test]
async fn fetch_failure_keeps_the_previous_snapshot() {
    let h = harness(
        FakeSource::with_pages(vec![
            page(&["rec1"], Some("p2")),
            Err(SourceError::Transport("connection reset".to_string())),
        ]),
        FakeRegistrar::default(),
    );
    h.snapshot.replace(vec![order("recOld")]);
    let mut notices = h.hub.subscribe();

    let err = h.service.run_cycle().await.unwrap_err();

    assert!(matches!(err, SyncError::Fetch(_)), "got {err:?}");
    assert_eq!(h.source.calls(), 2);

    // The half-assembled fetch never became visible.
    let snapshot = h.snapshot.read();
    assert_eq!(snapshot.len(), 1);
    assert_eq!(snapshot[0].id, "recOld");
    assert!(notices.try_recv().is_err());
}

#[tokio::test]
async fn empty_table_installs_an_empty_snapshot() {
    let h = harness(
        FakeSource::with_pages(vec![page(&[], None)]),
        FakeRegistrar::default(),
    );
    h.snapshot.replace(vec![order("recOld")]);

    let report = h.service.run_cycle().await.unwrap();

    assert_eq!(report.records, 0);
    assert!(h.snapshot.read().is_empty());
}

#[tokio::test]
async fn each_cycle_creates_exactly_one_subscription() {
    let h = harness(
        FakeSource::with_pages(vec![page(&["rec1"], None), page(&["rec1"], None)]),
        FakeRegistrar::default(),
    );

    h.service.run_cycle().await.unwrap();
    h.service.run_cycle().await.unwrap();

    assert_eq!(h.registrar.creates(), 2);
}

#[tokio::test]
async fn overlapping_triggers_serialize() {
    // Both cycles complete; the cycle lock queues them instead of letting
    // partial fetches interleave.
    let h = Arc::new(harness(
        FakeSource::with_pages(vec![
            page(&["rec1"], Some("p2")),
            page(&["rec2"], None),
            page(&["rec3"], Some("p2")),
            page(&["rec4"], None),
        ]),
        FakeRegistrar::default(),
    ));

    let a = {
        let h = Arc::clone(&h);
        tokio::spawn(async move { h.service.run_cycle().await.map(|r| r.records) })
    };
    let b = {
        let h = Arc::clone(&h);
        tokio::spawn(async move { h.service.run_cycle().await.map(|r| r.records) })
    };

    assert_eq!(a.await.unwrap().unwrap(), 2);
    assert_eq!(b.await.unwrap().unwrap(), 2);
    assert_eq!(h.source.calls(), 4);
    assert_eq!(h.snapshot.read().len(), 2);
}
