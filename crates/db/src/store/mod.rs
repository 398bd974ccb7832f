//! The record store abstraction.
//!
//! [`ItemStore`] is the only persistence surface the service layer sees.
//! Both implementations honour the same contract: every read is scoped to
//! active rows, and serial-number uniqueness among active rows is enforced
//! at insert time, surfacing as [`StoreError::ConstraintViolation`].

use async_trait::async_trait;
use itemgrid_core::item_query::{ItemFilter, ItemOrder, PageWindow};
use itemgrid_core::types::DbId;

use crate::models::item::{Item, NewItem};

mod memory;
mod postgres;

pub use memory::MemoryItemStore;
pub use postgres::PgItemStore;

/// Failures surfaced by an [`ItemStore`].
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A uniqueness constraint rejected the write.
    #[error("Constraint violation: {0}")]
    ConstraintViolation(String),

    /// The backing database failed or was unreachable.
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[async_trait]
pub trait ItemStore: Send + Sync {
    /// Persist a new item and return it with its assigned id.
    async fn insert(&self, item: &NewItem) -> Result<Item, StoreError>;

    /// Look up an active item.
    async fn find_active(&self, id: DbId) -> Result<Option<Item>, StoreError>;

    /// Whether an active item already holds `serial_number`.
    async fn serial_in_use(&self, serial_number: &str) -> Result<bool, StoreError>;

    /// Mark an active item deleted. Returns whether a row was affected.
    async fn soft_delete(&self, id: DbId) -> Result<bool, StoreError>;

    /// Count active items matching `filter`.
    async fn count(&self, filter: &ItemFilter) -> Result<i64, StoreError>;

    /// Fetch one ordered page of active items matching `filter`.
    async fn scan(
        &self,
        filter: &ItemFilter,
        order: ItemOrder,
        window: PageWindow,
    ) -> Result<Vec<Item>, StoreError>;

    /// Check that the store is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}
