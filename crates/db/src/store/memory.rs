use std::cmp::Ordering;
use std::collections::BTreeMap;

use async_trait::async_trait;
use itemgrid_core::item_query::{ItemFilter, ItemOrder, PageWindow, SortField};
use itemgrid_core::types::DbId;
use tokio::sync::RwLock;

use crate::models::item::{Item, NewItem};
use crate::store::{ItemStore, StoreError};

/// Name reported for serial collisions, matching the PostgreSQL index.
const SERIAL_CONSTRAINT: &str = "uq_items_serial_number_active";

#[derive(Default)]
struct Table {
    /// Last id handed out; ids are never reused.
    last_id: DbId,
    rows: BTreeMap<DbId, Item>,
}

impl Table {
    fn active(&self) -> impl Iterator<Item = &Item> {
        self.rows.values().filter(|item| item.deleted_at.is_none())
    }

    fn matching<'a>(&'a self, filter: &'a ItemFilter) -> impl Iterator<Item = &'a Item> {
        self.active()
            .filter(|item| filter.matches(item.id, &item.serial_number, &item.barcode))
    }
}

/// In-process [`ItemStore`].
///
/// Used by tests and as the fallback when no database is configured. Rows
/// are kept for the lifetime of the store; deletion only stamps
/// `deleted_at`.
#[derive(Default)]
pub struct MemoryItemStore {
    table: RwLock<Table>,
}

impl MemoryItemStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn compare(a: &Item, b: &Item, order: ItemOrder) -> Ordering {
    let primary = match order.field {
        SortField::Id => Ordering::Equal,
        SortField::SerialNumber => a.serial_number.cmp(&b.serial_number),
        SortField::Barcode => a.barcode.cmp(&b.barcode),
        SortField::CreatedAt => a.created_at.cmp(&b.created_at),
    };
    order
        .direction
        .apply(primary.then_with(|| a.id.cmp(&b.id)))
}

#[async_trait]
impl ItemStore for MemoryItemStore {
    async fn insert(&self, item: &NewItem) -> Result<Item, StoreError> {
        let mut table = self.table.write().await;
        if table
            .active()
            .any(|existing| existing.serial_number == item.serial_number)
        {
            return Err(StoreError::ConstraintViolation(format!(
                "Duplicate value violates unique constraint: {SERIAL_CONSTRAINT}"
            )));
        }

        table.last_id += 1;
        let row = Item {
            id: table.last_id,
            serial_number: item.serial_number.clone(),
            barcode: item.barcode.clone(),
            created_at: item.created_at,
            deleted_at: None,
        };
        table.rows.insert(row.id, row.clone());
        Ok(row)
    }

    async fn find_active(&self, id: DbId) -> Result<Option<Item>, StoreError> {
        let table = self.table.read().await;
        Ok(table
            .rows
            .get(&id)
            .filter(|item| item.deleted_at.is_none())
            .cloned())
    }

    async fn serial_in_use(&self, serial_number: &str) -> Result<bool, StoreError> {
        let table = self.table.read().await;
        let in_use = table
            .active()
            .any(|item| item.serial_number == serial_number);
        Ok(in_use)
    }

    async fn soft_delete(&self, id: DbId) -> Result<bool, StoreError> {
        let mut table = self.table.write().await;
        match table.rows.get_mut(&id) {
            Some(item) if item.deleted_at.is_none() => {
                item.deleted_at = Some(chrono::Utc::now());
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn count(&self, filter: &ItemFilter) -> Result<i64, StoreError> {
        let table = self.table.read().await;
        let matched = table.matching(filter).count();
        Ok(matched as i64)
    }

    async fn scan(
        &self,
        filter: &ItemFilter,
        order: ItemOrder,
        window: PageWindow,
    ) -> Result<Vec<Item>, StoreError> {
        let table = self.table.read().await;
        let mut items: Vec<&Item> = table.matching(filter).collect();
        items.sort_by(|a, b| compare(a, b, order));

        let skip = usize::try_from(window.skip).unwrap_or(usize::MAX);
        let take = usize::try_from(window.take).unwrap_or(0);
        Ok(items.into_iter().skip(skip).take(take).cloned().collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
