use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::error::ItemResult;
use crate::models::{Item, ItemFilter, PriceAggregate, UpdateItem};

/// Storage seam for items.
///
/// Implementations never validate; the service does that before calling in.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ItemRepository: Send + Sync {
    /// Persist a fully-formed item and return it as stored
    async fn insert(&self, item: Item) -> ItemResult<Item>;

    async fn find_by_id(&self, id: &str) -> ItemResult<Option<Item>>;

    /// Matching items ordered by `created_at`, then `id`
    async fn find_page(&self, filter: ItemFilter, skip: u64, limit: u64) -> ItemResult<Vec<Item>>;

    async fn count(&self, filter: ItemFilter) -> ItemResult<u64>;

    /// Set the present fields plus `updated_at`; `None` if the id is gone
    async fn update(
        &self,
        id: &str,
        changes: UpdateItem,
        updated_at: DateTime<Utc>,
    ) -> ItemResult<Option<Item>>;

    /// Number of documents removed (0 or 1)
    async fn delete(&self, id: &str) -> ItemResult<u64>;

    /// Price and quantity totals over every item; `None` when empty
    async fn aggregate_prices(&self) -> ItemResult<Option<PriceAggregate>>;

    /// Raw distinct category values, possibly including blanks
    async fn distinct_categories(&self) -> ItemResult<Vec<String>>;

    async fn ping(&self) -> ItemResult<()>;
}
