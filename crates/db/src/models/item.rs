//! Item entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use itemgrid_core::error::CoreError;
use itemgrid_core::item_query::ItemQuery;
use itemgrid_core::types::{DbId, Timestamp};

/// A row from the `items` table.
///
/// `deleted_at` is never serialized; soft-deleted rows are invisible to API
/// consumers.
#[derive(Debug, Clone, PartialEq, Eq, FromRow, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: DbId,
    pub serial_number: String,
    pub barcode: String,
    pub created_at: Timestamp,
    #[serde(skip)]
    pub deleted_at: Option<Timestamp>,
}

/// Values for a row about to be inserted. The store assigns the id.
#[derive(Debug, Clone)]
pub struct NewItem {
    pub serial_number: String,
    pub barcode: String,
    pub created_at: Timestamp,
}

/// DTO for creating a new item.
///
/// `serialNumber` may be missing or `null`; both reach the serial-number
/// rules as an empty value rather than failing as a malformed body.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateItem {
    #[serde(default)]
    pub serial_number: Option<String>,
}

impl CreateItem {
    /// The submitted serial number, empty when absent.
    pub fn serial_number(&self) -> &str {
        self.serial_number.as_deref().unwrap_or_default()
    }
}

/// Search request body: filters, sort and page window.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchItems {
    pub skip: Option<i64>,
    pub take: Option<i64>,
    pub sort_field: Option<String>,
    pub sort_order: Option<String>,
    pub filter_id: Option<DbId>,
    pub filter_id_type: Option<String>,
    pub filter_serial_number: Option<String>,
    pub filter_serial_number_type: Option<String>,
    pub filter_barcode: Option<String>,
    pub filter_barcode_type: Option<String>,
}

impl SearchItems {
    /// Validate the request and build the store query.
    pub fn to_query(&self) -> Result<ItemQuery, CoreError> {
        Ok(ItemQuery::builder()
            .id(self.filter_id, self.filter_id_type.as_deref())?
            .serial_number(
                self.filter_serial_number.as_deref(),
                self.filter_serial_number_type.as_deref(),
            )?
            .barcode(
                self.filter_barcode.as_deref(),
                self.filter_barcode_type.as_deref(),
            )?
            .sort(self.sort_field.as_deref(), self.sort_order.as_deref())?
            .page(self.skip, self.take)?
            .build())
    }
}

/// One page of search results plus the total match count before paging.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchPage {
    pub items: Vec<Item>,
    pub total_count: i64,
}
