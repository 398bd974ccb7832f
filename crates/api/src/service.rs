//! Item business rules.
//!
//! [`ItemService`] is the only component that decides whether a create or
//! delete is allowed. It validates input, consults the [`ItemStore`], and on
//! success publishes an [`ItemEvent`] to the injected [`EventBus`]. Publishing
//! never blocks or fails the caller.

use std::sync::Arc;

use itemgrid_core::error::CoreError;
use itemgrid_core::serial::validate_serial_number;
use itemgrid_core::types::DbId;
use itemgrid_db::models::item::{Item, NewItem, SearchItems, SearchPage};
use itemgrid_db::{ItemStore, StoreError};
use itemgrid_events::{EventBus, ItemEvent};

use crate::error::{AppError, AppResult};

/// Message returned when a serial number is already held by an active item.
pub const MSG_DUPLICATE_SERIAL: &str = "Serial number already exists";

#[derive(Clone)]
pub struct ItemService {
    store: Arc<dyn ItemStore>,
    events: Arc<EventBus>,
}

impl ItemService {
    pub fn new(store: Arc<dyn ItemStore>, events: Arc<EventBus>) -> Self {
        Self { store, events }
    }

    /// Create an item from a caller-assigned serial number.
    ///
    /// The barcode is always the serial number. Uniqueness is pre-checked,
    /// but the store remains the final arbiter: a concurrent create that
    /// wins the race surfaces here as a constraint violation and is reported
    /// as the same conflict.
    pub async fn create(&self, serial_number: &str) -> AppResult<Item> {
        validate_serial_number(serial_number)?;

        if self.store.serial_in_use(serial_number).await? {
            tracing::debug!(serial_number, "Rejected duplicate serial number");
            return Err(duplicate_serial());
        }

        let new_item = NewItem {
            serial_number: serial_number.to_string(),
            barcode: serial_number.to_string(),
            created_at: chrono::Utc::now(),
        };

        let item = match self.store.insert(&new_item).await {
            Ok(item) => item,
            Err(StoreError::ConstraintViolation(detail)) => {
                tracing::info!(serial_number, %detail, "Lost create race on serial number");
                return Err(duplicate_serial());
            }
            Err(e) => return Err(e.into()),
        };

        tracing::info!(item_id = item.id, serial_number, "Item created");
        self.events.publish(ItemEvent::ItemAdded(item.clone()));
        Ok(item)
    }

    /// Fetch an active item.
    pub async fn get(&self, id: DbId) -> AppResult<Item> {
        self.store
            .find_active(id)
            .await?
            .ok_or_else(|| not_found(id))
    }

    /// Soft-delete an active item.
    ///
    /// Deleting an id that is unknown or already deleted is `NotFound`.
    pub async fn delete(&self, id: DbId) -> AppResult<()> {
        if !self.store.soft_delete(id).await? {
            return Err(not_found(id));
        }

        tracing::info!(item_id = id, "Item deleted");
        self.events.publish(ItemEvent::ItemDeleted(id));
        Ok(())
    }

    /// Run a filtered, sorted, paged search.
    ///
    /// `total_count` counts every match before paging.
    pub async fn search(&self, request: &SearchItems) -> AppResult<SearchPage> {
        let query = request.to_query()?;

        let total_count = self.store.count(&query.filter).await?;
        let items = self
            .store
            .scan(&query.filter, query.order, query.window)
            .await?;

        tracing::debug!(
            total_count,
            returned = items.len(),
            skip = query.window.skip,
            take = query.window.take,
            "Item search"
        );
        Ok(SearchPage { items, total_count })
    }

    /// Check that the backing store is reachable.
    pub async fn ping(&self) -> AppResult<()> {
        Ok(self.store.ping().await?)
    }
}

fn not_found(id: DbId) -> AppError {
    AppError::Core(CoreError::NotFound { entity: "Item", id })
}

fn duplicate_serial() -> AppError {
    AppError::Core(CoreError::Conflict(MSG_DUPLICATE_SERIAL.to_string()))
}
