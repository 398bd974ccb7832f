//! Repository for the `items` table.
//!
//! Every read excludes soft-deleted rows (`deleted_at IS NOT NULL`).

use sqlx::PgPool;
use itemgrid_core::item_query::{ItemFilter, ItemOrder, PageWindow};
use itemgrid_core::types::DbId;

use crate::models::item::{Item, NewItem};

/// Column list shared across queries to avoid repetition.
const COLUMNS: &str = "id, serial_number, barcode, created_at, deleted_at";

/// Predicate ANDed into every read.
const ACTIVE: &str = "deleted_at IS NULL";

/// A positional bind produced while building a dynamic WHERE clause.
#[derive(Debug, Clone, PartialEq)]
enum BindValue {
    Id(DbId),
    Text(String),
}

/// Build the WHERE clause for `filter` (always including [`ACTIVE`]).
///
/// Returns the clause, the binds in placeholder order, and the next free
/// placeholder index.
fn where_clause(filter: &ItemFilter) -> (String, Vec<BindValue>, u32) {
    let mut conditions = vec![ACTIVE.to_string()];
    let mut binds = Vec::new();
    let mut bind_idx = 1u32;

    if let Some(f) = &filter.id {
        conditions.push(format!("id {} ${bind_idx}", f.op.sql()));
        binds.push(BindValue::Id(f.value));
        bind_idx += 1;
    }
    for (column, text) in [
        ("serial_number", &filter.serial_number),
        ("barcode", &filter.barcode),
    ] {
        if let Some(f) = text {
            let (condition, value) = f.op.sql(column, &format!("${bind_idx}"), &f.value);
            conditions.push(condition);
            binds.push(BindValue::Text(value));
            bind_idx += 1;
        }
    }

    (format!("WHERE {}", conditions.join(" AND ")), binds, bind_idx)
}

/// Provides persistence operations for items.
pub struct ItemRepo;

impl ItemRepo {
    /// Insert a new item, returning the created row.
    ///
    /// Fails with a `23505` database error when another active row already
    /// holds the serial number (`uq_items_serial_number_active`).
    pub async fn create(pool: &PgPool, input: &NewItem) -> Result<Item, sqlx::Error> {
        let query = format!(
            "INSERT INTO items (serial_number, barcode, created_at) \
             VALUES ($1, $2, $3) \
             RETURNING {COLUMNS}"
        );
        sqlx::query_as::<_, Item>(&query)
            .bind(&input.serial_number)
            .bind(&input.barcode)
            .bind(input.created_at)
            .fetch_one(pool)
            .await
    }

    /// Find an active item by its ID.
    pub async fn find_active_by_id(pool: &PgPool, id: DbId) -> Result<Option<Item>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM items WHERE id = $1 AND {ACTIVE}");
        sqlx::query_as::<_, Item>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Whether an active item already uses `serial_number` (exact match).
    pub async fn serial_in_use(pool: &PgPool, serial_number: &str) -> Result<bool, sqlx::Error> {
        let query =
            format!("SELECT EXISTS(SELECT 1 FROM items WHERE serial_number = $1 AND {ACTIVE})");
        sqlx::query_scalar::<_, bool>(&query)
            .bind(serial_number)
            .fetch_one(pool)
            .await
    }

    /// Soft-delete an active item. Returns `false` if nothing matched.
    pub async fn soft_delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let query = format!("UPDATE items SET deleted_at = now() WHERE id = $1 AND {ACTIVE}");
        let result = sqlx::query(&query).bind(id).execute(pool).await?;
        Ok(result.rows_affected() > 0)
    }

    /// Count active items matching `filter`.
    pub async fn count(pool: &PgPool, filter: &ItemFilter) -> Result<i64, sqlx::Error> {
        let (where_clause, binds, _) = where_clause(filter);
        let query = format!("SELECT COUNT(*) FROM items {where_clause}");

        let mut q = sqlx::query_scalar::<_, i64>(&query);
        for bind in binds {
            q = match bind {
                BindValue::Id(v) => q.bind(v),
                BindValue::Text(v) => q.bind(v),
            };
        }
        q.fetch_one(pool).await
    }

    /// List one page of active items matching `filter` in `order`.
    pub async fn list(
        pool: &PgPool,
        filter: &ItemFilter,
        order: ItemOrder,
        window: PageWindow,
    ) -> Result<Vec<Item>, sqlx::Error> {
        let (where_clause, binds, bind_idx) = where_clause(filter);
        let query = format!(
            "SELECT {COLUMNS} FROM items {where_clause} \
             ORDER BY {order_by} \
             OFFSET ${bind_idx} LIMIT ${next_idx}",
            order_by = order.sql(),
            next_idx = bind_idx + 1,
        );

        let mut q = sqlx::query_as::<_, Item>(&query);
        for bind in binds {
            q = match bind {
                BindValue::Id(v) => q.bind(v),
                BindValue::Text(v) => q.bind(v),
            };
        }
        q.bind(window.skip).bind(window.take).fetch_all(pool).await
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
