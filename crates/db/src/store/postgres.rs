use async_trait::async_trait;
use itemgrid_core::item_query::{ItemFilter, ItemOrder, PageWindow};
use itemgrid_core::types::DbId;

use crate::models::item::{Item, NewItem};
use crate::repositories::ItemRepo;
use crate::store::{ItemStore, StoreError};
use crate::DbPool;

/// PostgreSQL unique_violation.
const UNIQUE_VIOLATION: &str = "23505";

/// [`ItemStore`] backed by the `items` table.
#[derive(Clone)]
pub struct PgItemStore {
    pool: DbPool,
}

impl PgItemStore {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }
}

/// Map unique violations on `uq_` constraints to `ConstraintViolation`.
fn classify(err: sqlx::Error) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.code().as_deref() == Some(UNIQUE_VIOLATION) {
            let constraint = db_err.constraint().unwrap_or("unknown");
            if constraint.starts_with("uq_") {
                return StoreError::ConstraintViolation(format!(
                    "Duplicate value violates unique constraint: {constraint}"
                ));
            }
        }
    }
    StoreError::Database(err)
}

#[async_trait]
impl ItemStore for PgItemStore {
    async fn insert(&self, item: &NewItem) -> Result<Item, StoreError> {
        ItemRepo::create(&self.pool, item).await.map_err(classify)
    }

    async fn find_active(&self, id: DbId) -> Result<Option<Item>, StoreError> {
        Ok(ItemRepo::find_active_by_id(&self.pool, id).await?)
    }

    async fn serial_in_use(&self, serial_number: &str) -> Result<bool, StoreError> {
        Ok(ItemRepo::serial_in_use(&self.pool, serial_number).await?)
    }

    async fn soft_delete(&self, id: DbId) -> Result<bool, StoreError> {
        Ok(ItemRepo::soft_delete(&self.pool, id).await?)
    }

    async fn count(&self, filter: &ItemFilter) -> Result<i64, StoreError> {
        Ok(ItemRepo::count(&self.pool, filter).await?)
    }

    async fn scan(
        &self,
        filter: &ItemFilter,
        order: ItemOrder,
        window: PageWindow,
    ) -> Result<Vec<Item>, StoreError> {
        Ok(ItemRepo::list(&self.pool, filter, order, window).await?)
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(crate::health_check(&self.pool).await?)
    }
}
