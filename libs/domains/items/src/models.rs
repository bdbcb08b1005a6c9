use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

/// Item entity as stored and returned by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct Item {
    /// Server-generated UUID v4 text
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub price: f64,
    pub quantity: i64,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// DTO for creating a new item
#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateItem {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[serde(default)]
    #[validate(length(max = 500))]
    pub description: Option<String>,
    /// Must be strictly positive
    #[validate(range(exclusive_min = 0.0))]
    pub price: f64,
    #[validate(range(min = 0))]
    pub quantity: i64,
    #[serde(default)]
    #[validate(length(max = 50))]
    pub category: Option<String>,
}

/// DTO for a partial update; absent and `null` fields are left unchanged
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateItem {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(max = 500))]
    pub description: Option<String>,
    #[validate(range(exclusive_min = 0.0))]
    pub price: Option<f64>,
    #[validate(range(min = 0))]
    pub quantity: Option<i64>,
    #[validate(length(max = 50))]
    pub category: Option<String>,
}

impl UpdateItem {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.quantity.is_none()
            && self.category.is_none()
    }
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    10
}

/// Query parameters for `GET /items`
#[derive(Debug, Clone, Deserialize, Validate, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct ListItemsQuery {
    /// Page number, starting at 1
    #[serde(default = "default_page")]
    #[validate(range(min = 1))]
    #[param(minimum = 1, default = 1)]
    pub page: u64,
    /// Items per page (1-100)
    #[serde(default = "default_page_size")]
    #[validate(range(min = 1, max = 100))]
    #[param(minimum = 1, maximum = 100, default = 10)]
    pub page_size: u64,
    /// Case-insensitive substring match on name
    #[validate(custom(function = "no_nul_byte"))]
    pub search: Option<String>,
    /// Case-insensitive exact match on category
    #[validate(custom(function = "no_nul_byte"))]
    pub category: Option<String>,
}

/// Filters become regex patterns, which the store reads as C strings.
fn no_nul_byte(value: &str) -> Result<(), ValidationError> {
    if value.contains('\0') {
        return Err(ValidationError::new("nul_byte")
            .with_message("must not contain a NUL character".into()));
    }
    Ok(())
}

impl Default for ListItemsQuery {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
            search: None,
            category: None,
        }
    }
}

impl ListItemsQuery {
    /// Store filter with blank strings treated as absent.
    pub fn filter(&self) -> ItemFilter {
        ItemFilter {
            search: non_blank(&self.search),
            category: non_blank(&self.category),
        }
    }

    /// Offset of the first item on the page, capped at what the store
    /// accepts (`i64::MAX`).
    pub fn skip(&self) -> u64 {
        self.page
            .saturating_sub(1)
            .saturating_mul(self.page_size)
            .min(i64::MAX as u64)
    }
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|s| !s.is_empty()).cloned()
}

/// Normalized list filter passed to the repository
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ItemFilter {
    pub search: Option<String>,
    pub category: Option<String>,
}

impl ItemFilter {
    /// Same predicate the store applies, for in-process repositories.
    pub fn matches(&self, item: &Item) -> bool {
        let search_ok = self.search.as_ref().is_none_or(|needle| {
            item.name.to_lowercase().contains(&needle.to_lowercase())
        });
        let category_ok = self.category.as_ref().is_none_or(|wanted| {
            item.category
                .as_ref()
                .is_some_and(|c| c.to_lowercase() == wanted.to_lowercase())
        });
        search_ok && category_ok
    }
}

/// One page of items plus the paging envelope
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct PaginatedItems {
    pub items: Vec<Item>,
    pub total: u64,
    pub page: u64,
    pub page_size: u64,
    pub total_pages: u64,
}

/// `ceil(total / page_size)`, or 1 when there is nothing to page through.
pub fn total_pages(total: u64, page_size: u64) -> u64 {
    if total == 0 || page_size == 0 {
        1
    } else {
        total.div_ceil(page_size)
    }
}

/// Inventory summary returned by `GET /items/stats/summary`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct ItemStats {
    pub total_items: u64,
    pub total_quantity: i64,
    /// Sum of price x quantity, rounded to 2 decimals
    pub total_value: f64,
    /// Rounded to 2 decimals
    pub average_price: f64,
    pub min_price: f64,
    pub max_price: f64,
    /// Sorted distinct non-empty categories
    pub categories: Vec<String>,
}

/// Raw `$group` output over the whole collection
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PriceAggregate {
    /// The store widens an overflowing `$sum` of longs to a double;
    /// such totals saturate at `i64::MAX`.
    #[serde(deserialize_with = "saturating_i64")]
    pub total_quantity: i64,
    pub total_value: f64,
    pub average_price: f64,
    pub min_price: f64,
    pub max_price: f64,
}

impl ItemStats {
    pub fn from_parts(total_items: u64, prices: PriceAggregate, categories: Vec<String>) -> Self {
        let mut categories: Vec<String> =
            categories.into_iter().filter(|c| !c.is_empty()).collect();
        categories.sort();
        categories.dedup();

        Self {
            total_items,
            total_quantity: prices.total_quantity,
            total_value: round2(prices.total_value),
            average_price: round2(prices.average_price),
            min_price: prices.min_price,
            max_price: prices.max_price,
            categories,
        }
    }
}

/// Accepts any integer width or a double.
fn saturating_i64<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Total {
        Integer(i64),
        Float(f64),
    }

    Ok(match Total::deserialize(deserializer)? {
        Total::Integer(n) => n,
        // `as` saturates and maps NaN to 0.
        Total::Float(f) => f as i64,
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// `{message, detail}` body used by status and delete endpoints
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MessageResponse {
    pub message: String,
    pub detail: Option<String>,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            detail: Some(detail.into()),
        }
    }
}

/// Drops sub-millisecond precision so values survive a BSON round trip.
pub fn truncate_to_millis(ts: DateTime<Utc>) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ts.timestamp_millis()).unwrap_or(ts)
}

/// Next `updated_at`: `now`, or one millisecond past `previous` when the
/// clock has not moved on.
pub fn next_update_timestamp(previous: DateTime<Utc>, now: DateTime<Utc>) -> DateTime<Utc> {
    let now = truncate_to_millis(now);
    if now > previous {
        now
    } else {
        previous + Duration::milliseconds(1)
    }
}

impl Item {
    pub fn new(input: CreateItem, now: DateTime<Utc>) -> Self {
        let now = truncate_to_millis(now);
        Self {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            description: input.description,
            price: input.price,
            quantity: input.quantity,
            category: input.category,
            created_at: now,
            updated_at: now,
        }
    }

    /// Overwrites the fields present in `update`.
    pub fn apply_update(&mut self, update: UpdateItem, updated_at: DateTime<Utc>) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(description) = update.description {
            self.description = Some(description);
        }
        if let Some(price) = update.price {
            self.price = price;
        }
        if let Some(quantity) = update.quantity {
            self.quantity = quantity;
        }
        if let Some(category) = update.category {
            self.category = Some(category);
        }
        self.updated_at = updated_at;
    }
}
