//! Tests for `ItemService` business rules over the in-memory store.

mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use itemgrid_api::error::AppError;
use itemgrid_api::service::{ItemService, MSG_DUPLICATE_SERIAL};
use itemgrid_core::error::CoreError;
use itemgrid_core::item_query::{ItemFilter, ItemOrder, PageWindow};
use itemgrid_core::serial::{MSG_CHARSET, MSG_LENGTH, MSG_REQUIRED};
use itemgrid_db::models::item::{Item, NewItem, SearchItems};
use itemgrid_db::{ItemStore, StoreError};
use itemgrid_events::{EventBus, ItemEvent};
use tokio::sync::broadcast::error::TryRecvError;

use common::{serial, test_service};

// ---------------------------------------------------------------------------
// create
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_then_get_returns_item_with_barcode_equal_to_serial() {
    let (service, _bus) = test_service();

    let created = service.create("ABCD1234567890EF12").await.unwrap();
    let fetched = service.get(created.id).await.unwrap();

    assert_eq!(fetched.serial_number, "ABCD1234567890EF12");
    assert_eq!(fetched.barcode, fetched.serial_number);
    assert_eq!(fetched.created_at, created.created_at);
}

#[tokio::test]
async fn create_rejects_every_wrong_length() {
    let (service, _bus) = test_service();

    for len in (1..=40).filter(|&n| n != 18) {
        let candidate = "A".repeat(len);
        assert_matches!(
            service.create(&candidate).await,
            Err(AppError::Core(CoreError::Validation(msg))) if msg == MSG_LENGTH,
            "length {len}"
        );
    }
}

#[tokio::test]
async fn create_rejects_empty_serial_as_required() {
    let (service, _bus) = test_service();

    assert_matches!(
        service.create("").await,
        Err(AppError::Core(CoreError::Validation(msg))) if msg == MSG_REQUIRED
    );
}

#[tokio::test]
async fn create_rejects_characters_outside_charset() {
    let (service, _bus) = test_service();

    for candidate in ["ABCD1234567890EF1a", "ABCD1234567890EF1-", "ABCD1234567890EF1 "] {
        assert_matches!(
            service.create(candidate).await,
            Err(AppError::Core(CoreError::Validation(msg))) if msg == MSG_CHARSET,
            "{candidate}"
        );
    }
}

#[tokio::test]
async fn duplicate_active_serial_conflicts_until_deleted() {
    let (service, _bus) = test_service();

    let first = service.create(&serial(1)).await.unwrap();
    assert_matches!(
        service.create(&serial(1)).await,
        Err(AppError::Core(CoreError::Conflict(msg))) if msg == MSG_DUPLICATE_SERIAL
    );

    service.delete(first.id).await.unwrap();

    let reused = service.create(&serial(1)).await.unwrap();
    assert_ne!(reused.id, first.id);
    assert_eq!(reused.serial_number, serial(1));
}

// ---------------------------------------------------------------------------
// get / delete
// ---------------------------------------------------------------------------

#[tokio::test]
async fn get_unknown_id_is_not_found() {
    let (service, _bus) = test_service();

    assert_matches!(
        service.get(999).await,
        Err(AppError::Core(CoreError::NotFound { entity: "Item", id: 999 }))
    );
}

#[tokio::test]
async fn delete_is_not_idempotent() {
    let (service, _bus) = test_service();
    let item = service.create(&serial(1)).await.unwrap();

    service.delete(item.id).await.unwrap();

    assert_matches!(
        service.delete(item.id).await,
        Err(AppError::Core(CoreError::NotFound { .. }))
    );
    assert_matches!(
        service.get(item.id).await,
        Err(AppError::Core(CoreError::NotFound { .. }))
    );
}

#[tokio::test]
async fn delete_unknown_id_is_not_found() {
    let (service, _bus) = test_service();

    assert_matches!(
        service.delete(12345).await,
        Err(AppError::Core(CoreError::NotFound { .. }))
    );
}

// ---------------------------------------------------------------------------
// notifications
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_and_delete_publish_events() {
    let (service, bus) = test_service();
    let mut rx = bus.subscribe();

    let item = service.create(&serial(1)).await.unwrap();
    service.delete(item.id).await.unwrap();

    assert_eq!(rx.recv().await.unwrap(), ItemEvent::ItemAdded(item.clone()));
    assert_eq!(rx.recv().await.unwrap(), ItemEvent::ItemDeleted(item.id));
}

#[tokio::test]
async fn failed_operations_publish_nothing() {
    let (service, bus) = test_service();
    service.create(&serial(1)).await.unwrap();
    let mut rx = bus.subscribe();

    let _ = service.create("bad").await;
    let _ = service.create(&serial(1)).await;
    let _ = service.delete(999).await;

    assert_matches!(rx.try_recv(), Err(TryRecvError::Empty));
}

// ---------------------------------------------------------------------------
// search
// ---------------------------------------------------------------------------

#[tokio::test]
async fn default_search_returns_newest_first_with_total() {
    let (service, _bus) = test_service();
    for n in 12..=16 {
        service.create(&serial(n)).await.unwrap();
    }

    let page = service
        .search(&SearchItems {
            skip: Some(0),
            take: Some(10),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(page.total_count, 5);
    assert_eq!(page.items.len(), 5);
    let serials: Vec<&str> = page.items.iter().map(|i| i.serial_number.as_str()).collect();
    assert_eq!(
        serials,
        vec![
            "AAAAAAAAAAAAAAAA16",
            "AAAAAAAAAAAAAAAA15",
            "AAAAAAAAAAAAAAAA14",
            "AAAAAAAAAAAAAAAA13",
            "AAAAAAAAAAAAAAAA12",
        ]
    );
    assert!(page
        .items
        .windows(2)
        .all(|w| w[0].created_at >= w[1].created_at));
}

#[tokio::test]
async fn search_sorted_by_id_pages_but_counts_all() {
    let (service, _bus) = test_service();
    let mut ids = Vec::new();
    for n in 12..=16 {
        ids.push(service.create(&serial(n)).await.unwrap().id);
    }

    let page = service
        .search(&SearchItems {
            skip: Some(0),
            take: Some(2),
            sort_field: Some("id".into()),
            sort_order: Some("asc".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(page.total_count, 5);
    let got: Vec<i64> = page.items.iter().map(|i| i.id).collect();
    assert_eq!(got, ids[..2].to_vec());
}

#[tokio::test]
async fn starts_with_filter_is_case_insensitive() {
    let (service, _bus) = test_service();
    service.create("ABC000000000000001").await.unwrap();
    service.create("ABD000000000000002").await.unwrap();

    let page = service
        .search(&SearchItems {
            filter_serial_number: Some("abc".into()),
            filter_serial_number_type: Some("startsWith".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(page.total_count, 1);
    assert_eq!(page.items[0].serial_number, "ABC000000000000001");
}

#[tokio::test]
async fn deleted_items_are_excluded_from_items_and_total() {
    let (service, _bus) = test_service();
    let keep = service.create(&serial(1)).await.unwrap();
    let gone = service.create(&serial(2)).await.unwrap();
    service.delete(gone.id).await.unwrap();

    let page = service.search(&SearchItems::default()).await.unwrap();

    assert_eq!(page.total_count, 1);
    assert_eq!(page.items.len(), 1);
    assert_eq!(page.items[0].id, keep.id);
}

#[tokio::test]
async fn id_and_barcode_filters_combine() {
    let (service, _bus) = test_service();
    let mut ids = Vec::new();
    for n in 1..=4 {
        ids.push(service.create(&serial(n)).await.unwrap().id);
    }

    let page = service
        .search(&SearchItems {
            filter_id: Some(ids[1]),
            filter_id_type: Some("greaterThanOrEqual".into()),
            filter_barcode: Some("04".into()),
            filter_barcode_type: Some("notContains".into()),
            sort_field: Some("serialNumber".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(page.total_count, 2);
    let got: Vec<i64> = page.items.iter().map(|i| i.id).collect();
    assert_eq!(got, vec![ids[1], ids[2]]);
}

#[tokio::test]
async fn unknown_operator_and_oversized_take_are_validation_errors() {
    let (service, _bus) = test_service();

    assert_matches!(
        service
            .search(&SearchItems {
                filter_serial_number: Some("a".into()),
                filter_serial_number_type: Some("fuzzy".into()),
                ..Default::default()
            })
            .await,
        Err(AppError::Core(CoreError::Validation(_)))
    );
    assert_matches!(
        service
            .search(&SearchItems {
                take: Some(1_000_000),
                ..Default::default()
            })
            .await,
        Err(AppError::Core(CoreError::Validation(_)))
    );
}

// ---------------------------------------------------------------------------
// create race
// ---------------------------------------------------------------------------

/// A store whose pre-check always passes but whose insert always loses the
/// uniqueness race, as when two creates for the same serial interleave.
struct RacingStore;

#[async_trait::async_trait]
impl ItemStore for RacingStore {
    async fn insert(&self, _item: &NewItem) -> Result<Item, StoreError> {
        Err(StoreError::ConstraintViolation(
            "uq_items_serial_number_active".to_string(),
        ))
    }

    async fn find_active(&self, _id: i64) -> Result<Option<Item>, StoreError> {
        Ok(None)
    }

    async fn serial_in_use(&self, _serial_number: &str) -> Result<bool, StoreError> {
        Ok(false)
    }

    async fn soft_delete(&self, _id: i64) -> Result<bool, StoreError> {
        Ok(false)
    }

    async fn count(&self, _filter: &ItemFilter) -> Result<i64, StoreError> {
        Ok(0)
    }

    async fn scan(
        &self,
        _filter: &ItemFilter,
        _order: ItemOrder,
        _window: PageWindow,
    ) -> Result<Vec<Item>, StoreError> {
        Ok(Vec::new())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[tokio::test]
async fn lost_insert_race_is_reported_as_conflict() {
    let bus = Arc::new(EventBus::default());
    let service = ItemService::new(Arc::new(RacingStore), Arc::clone(&bus));
    let mut rx = bus.subscribe();

    assert_matches!(
        service.create(&serial(1)).await,
        Err(AppError::Core(CoreError::Conflict(msg))) if msg == MSG_DUPLICATE_SERIAL
    );
    assert_matches!(rx.try_recv(), Err(TryRecvError::Empty));
}
