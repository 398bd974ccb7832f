//! Item search query construction.
//!
//! A search request arrives as loosely typed fields (optional values plus
//! string operator codes). [`ItemQueryBuilder`] turns them into a typed
//! [`ItemQuery`]: a filter, a sort order and a page window. Operator codes
//! are parsed case-insensitively into closed enums; an unknown code is a
//! [`CoreError::Validation`], never a silent fallback.
//!
//! The filter is applied in a fixed order (id, serial number, barcode) and
//! the record store counts matches over the filter alone, before the order
//! and window are applied.

use std::cmp::Ordering;

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Pagination limits
// ---------------------------------------------------------------------------

/// Page size used when the request does not specify `take`.
pub const DEFAULT_TAKE: i64 = 100;

/// Largest page a single search may request.
pub const MAX_TAKE: i64 = 1000;

// ---------------------------------------------------------------------------
// Operators
// ---------------------------------------------------------------------------

/// Comparison applied to the numeric `id` column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum IdOperator {
    #[default]
    Equals,
    NotEqual,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
}

impl IdOperator {
    /// Parse a wire code such as `"lessThan"` (case-insensitive).
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_lowercase().as_str() {
            "equals" => Some(Self::Equals),
            "notequal" => Some(Self::NotEqual),
            "lessthan" => Some(Self::LessThan),
            "lessthanorequal" => Some(Self::LessThanOrEqual),
            "greaterthan" => Some(Self::GreaterThan),
            "greaterthanorequal" => Some(Self::GreaterThanOrEqual),
            _ => None,
        }
    }

    /// SQL comparison operator.
    pub fn sql(self) -> &'static str {
        match self {
            Self::Equals => "=",
            Self::NotEqual => "<>",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
        }
    }

    /// Evaluate `lhs <op> rhs`.
    pub fn apply(self, lhs: DbId, rhs: DbId) -> bool {
        match self {
            Self::Equals => lhs == rhs,
            Self::NotEqual => lhs != rhs,
            Self::LessThan => lhs < rhs,
            Self::LessThanOrEqual => lhs <= rhs,
            Self::GreaterThan => lhs > rhs,
            Self::GreaterThanOrEqual => lhs >= rhs,
        }
    }
}

/// Case-insensitive comparison applied to a text column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextOperator {
    #[default]
    Contains,
    Equals,
    NotEqual,
    NotContains,
    StartsWith,
    EndsWith,
}

impl TextOperator {
    /// Parse a wire code such as `"startsWith"` (case-insensitive).
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_lowercase().as_str() {
            "contains" => Some(Self::Contains),
            "equals" => Some(Self::Equals),
            "notequal" => Some(Self::NotEqual),
            "notcontains" => Some(Self::NotContains),
            "startswith" => Some(Self::StartsWith),
            "endswith" => Some(Self::EndsWith),
            _ => None,
        }
    }

    /// Evaluate the operator against `haystack`.
    ///
    /// `needle` must already be lower-cased; `haystack` is lower-cased here.
    pub fn apply(self, haystack: &str, needle: &str) -> bool {
        let haystack = haystack.to_lowercase();
        match self {
            Self::Contains => haystack.contains(needle),
            Self::Equals => haystack == needle,
            Self::NotEqual => haystack != needle,
            Self::NotContains => !haystack.contains(needle),
            Self::StartsWith => haystack.starts_with(needle),
            Self::EndsWith => haystack.ends_with(needle),
        }
    }

    /// SQL fragment comparing `LOWER(column)` against a bind placeholder,
    /// plus the value to bind for `needle`.
    ///
    /// Pattern operators escape LIKE metacharacters with `\`.
    pub fn sql(self, column: &str, placeholder: &str, needle: &str) -> (String, String) {
        let lowered = format!("LOWER({column})");
        match self {
            Self::Equals => (format!("{lowered} = {placeholder}"), needle.to_string()),
            Self::NotEqual => (format!("{lowered} <> {placeholder}"), needle.to_string()),
            Self::Contains => (
                format!("{lowered} LIKE {placeholder} ESCAPE '\\'"),
                format!("%{}%", escape_like(needle)),
            ),
            Self::NotContains => (
                format!("{lowered} NOT LIKE {placeholder} ESCAPE '\\'"),
                format!("%{}%", escape_like(needle)),
            ),
            Self::StartsWith => (
                format!("{lowered} LIKE {placeholder} ESCAPE '\\'"),
                format!("{}%", escape_like(needle)),
            ),
            Self::EndsWith => (
                format!("{lowered} LIKE {placeholder} ESCAPE '\\'"),
                format!("%{}", escape_like(needle)),
            ),
        }
    }
}

/// Escape `\`, `%` and `_` so they match literally inside a LIKE pattern.
pub fn escape_like(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

// ---------------------------------------------------------------------------
// Filter
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdFilter {
    pub op: IdOperator,
    pub value: DbId,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextFilter {
    pub op: TextOperator,
    /// Lower-cased comparison value.
    pub value: String,
}

impl TextFilter {
    pub fn matches(&self, haystack: &str) -> bool {
        self.op.apply(haystack, &self.value)
    }
}

/// Conjunction of the optional per-column filters.
///
/// The record store always ANDs this with "active only".
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    pub id: Option<IdFilter>,
    pub serial_number: Option<TextFilter>,
    pub barcode: Option<TextFilter>,
}

impl ItemFilter {
    /// Evaluate the filter against one item's columns.
    pub fn matches(&self, id: DbId, serial_number: &str, barcode: &str) -> bool {
        if let Some(f) = &self.id {
            if !f.op.apply(id, f.value) {
                return false;
            }
        }
        if let Some(f) = &self.serial_number {
            if !f.matches(serial_number) {
                return false;
            }
        }
        if let Some(f) = &self.barcode {
            if !f.matches(barcode) {
                return false;
            }
        }
        true
    }

    pub fn is_empty(&self) -> bool {
        self.id.is_none() && self.serial_number.is_none() && self.barcode.is_none()
    }
}

// ---------------------------------------------------------------------------
// Order
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Id,
    SerialNumber,
    Barcode,
    CreatedAt,
}

impl SortField {
    /// Parse a wire code such as `"serialNumber"` (case-insensitive).
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_lowercase().as_str() {
            "id" => Some(Self::Id),
            "serialnumber" => Some(Self::SerialNumber),
            "barcode" => Some(Self::Barcode),
            "createdat" => Some(Self::CreatedAt),
            _ => None,
        }
    }

    pub fn column(self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::SerialNumber => "serial_number",
            Self::Barcode => "barcode",
            Self::CreatedAt => "created_at",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_ascii_lowercase().as_str() {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }

    pub fn sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }

    /// Orient an ascending comparison result.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Self::Asc => ordering,
            Self::Desc => ordering.reverse(),
        }
    }
}

/// Sort order for a scan. Ties on `field` are broken by `id` in the same
/// direction so paging is stable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ItemOrder {
    pub field: SortField,
    pub direction: SortDirection,
}

impl Default for ItemOrder {
    /// Newest first.
    fn default() -> Self {
        Self {
            field: SortField::CreatedAt,
            direction: SortDirection::Desc,
        }
    }
}

impl ItemOrder {
    /// `ORDER BY` body, e.g. `created_at DESC, id DESC`.
    pub fn sql(&self) -> String {
        let dir = self.direction.sql();
        match self.field {
            SortField::Id => format!("id {dir}"),
            field => format!("{} {dir}, id {dir}", field.column()),
        }
    }
}

// ---------------------------------------------------------------------------
// Window
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub skip: i64,
    pub take: i64,
}

impl Default for PageWindow {
    fn default() -> Self {
        Self {
            skip: 0,
            take: DEFAULT_TAKE,
        }
    }
}

// ---------------------------------------------------------------------------
// Query + builder
// ---------------------------------------------------------------------------

/// A fully validated item search.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemQuery {
    pub filter: ItemFilter,
    pub order: ItemOrder,
    pub window: PageWindow,
}

impl ItemQuery {
    pub fn builder() -> ItemQueryBuilder {
        ItemQueryBuilder::default()
    }
}

/// Step-by-step construction of an [`ItemQuery`] from request fields.
///
/// # Example
///
/// ```
/// use itemgrid_core::item_query::{ItemQuery, SortField};
///
/// let query = ItemQuery::builder()
///     .serial_number(Some("abc"), Some("startsWith"))?
///     .sort(Some("id"), Some("asc"))?
///     .page(Some(0), Some(2))?
///     .build();
/// assert_eq!(query.order.field, SortField::Id);
/// assert_eq!(query.window.take, 2);
/// # Ok::<(), itemgrid_core::error::CoreError>(())
/// ```
#[derive(Debug, Default)]
pub struct ItemQueryBuilder {
    query: ItemQuery,
}

impl ItemQueryBuilder {
    /// Filter on `id`. Ignored when `value` is `None`.
    pub fn id(mut self, value: Option<DbId>, op: Option<&str>) -> Result<Self, CoreError> {
        let op = parse_code(op, "filterIdType", IdOperator::from_code)?.unwrap_or_default();
        if let Some(value) = value {
            self.query.filter.id = Some(IdFilter { op, value });
        }
        Ok(self)
    }

    /// Filter on `serial_number`. Ignored when `value` is absent or empty.
    pub fn serial_number(
        mut self,
        value: Option<&str>,
        op: Option<&str>,
    ) -> Result<Self, CoreError> {
        self.query.filter.serial_number =
            text_filter(value, op, "filterSerialNumberType")?;
        Ok(self)
    }

    /// Filter on `barcode`. Ignored when `value` is absent or empty.
    pub fn barcode(mut self, value: Option<&str>, op: Option<&str>) -> Result<Self, CoreError> {
        self.query.filter.barcode = text_filter(value, op, "filterBarcodeType")?;
        Ok(self)
    }

    /// Set the sort order. Without a field the default (`createdAt` desc)
    /// is kept and `direction` is only validated.
    pub fn sort(mut self, field: Option<&str>, direction: Option<&str>) -> Result<Self, CoreError> {
        let direction = parse_code(direction, "sortOrder", SortDirection::from_code)?;
        if let Some(field) = parse_code(field, "sortField", SortField::from_code)? {
            self.query.order = ItemOrder {
                field,
                direction: direction.unwrap_or_default(),
            };
        }
        Ok(self)
    }

    /// Set the page window. `skip` must be non-negative and `take` within
    /// `1..=MAX_TAKE`.
    pub fn page(mut self, skip: Option<i64>, take: Option<i64>) -> Result<Self, CoreError> {
        let skip = skip.unwrap_or(0);
        let take = take.unwrap_or(DEFAULT_TAKE);
        if skip < 0 {
            return Err(CoreError::Validation(
                "skip must be zero or greater".to_string(),
            ));
        }
        if !(1..=MAX_TAKE).contains(&take) {
            return Err(CoreError::Validation(format!(
                "take must be between 1 and {MAX_TAKE}"
            )));
        }
        self.query.window = PageWindow { skip, take };
        Ok(self)
    }

    pub fn build(self) -> ItemQuery {
        self.query
    }
}

fn text_filter(
    value: Option<&str>,
    op: Option<&str>,
    field: &str,
) -> Result<Option<TextFilter>, CoreError> {
    let op = parse_code(op, field, TextOperator::from_code)?.unwrap_or_default();
    Ok(value.filter(|v| !v.is_empty()).map(|v| TextFilter {
        op,
        value: v.to_lowercase(),
    }))
}

/// Parse an optional code; an empty string counts as absent.
fn parse_code<T>(
    code: Option<&str>,
    field: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>, CoreError> {
    match code.map(str::trim).filter(|c| !c.is_empty()) {
        None => Ok(None),
        Some(c) => parse(c)
            .map(Some)
            .ok_or_else(|| CoreError::Validation(format!("Unknown {field} value '{c}'"))),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
