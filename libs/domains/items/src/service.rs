//! Item Service - Business logic layer

use chrono::Utc;
use std::sync::Arc;
use tracing::{info, instrument};
use validator::Validate;

use crate::error::{ItemError, ItemResult};
use crate::models::{
    CreateItem, Item, ItemStats, ListItemsQuery, MessageResponse, PaginatedItems, UpdateItem,
    next_update_timestamp, total_pages,
};
use crate::repository::ItemRepository;

/// Item operations over any [`ItemRepository`].
///
/// Every input is validated before the repository is touched. Update and
/// delete check existence first, then mutate; the pair is not atomic.
pub struct ItemService<R: ItemRepository> {
    repository: Arc<R>,
}

impl<R: ItemRepository> ItemService<R> {
    /// Create a new service over `repository`
    pub fn new(repository: R) -> Self {
        Self {
            repository: Arc::new(repository),
        }
    }

    /// Create a new item
    #[instrument(skip(self, input), fields(item_name = %input.name))]
    pub async fn create_item(&self, input: CreateItem) -> ItemResult<Item> {
        input.validate()?;

        let item = self.repository.insert(Item::new(input, Utc::now())).await?;

        info!(item_id = %item.id, "Item created");
        Ok(item)
    }

    /// List one page of items matching the query filters
    #[instrument(skip(self))]
    pub async fn list_items(&self, query: ListItemsQuery) -> ItemResult<PaginatedItems> {
        query.validate()?;

        let filter = query.filter();
        let total = self.repository.count(filter.clone()).await?;
        let items = self
            .repository
            .find_page(filter, query.skip(), query.page_size)
            .await?;

        Ok(PaginatedItems {
            items,
            total,
            page: query.page,
            page_size: query.page_size,
            total_pages: total_pages(total, query.page_size),
        })
    }

    /// Get an item by ID
    #[instrument(skip(self))]
    pub async fn get_item(&self, id: &str) -> ItemResult<Item> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| ItemError::NotFound(id.to_string()))
    }

    /// Update an item. Order of checks: field constraints, existence, then emptiness.
    #[instrument(skip(self, input))]
    pub async fn update_item(&self, id: &str, input: UpdateItem) -> ItemResult<Item> {
        input.validate()?;

        let existing = self.get_item(id).await?;

        if input.is_empty() {
            return Err(ItemError::EmptyUpdate);
        }

        let updated_at = next_update_timestamp(existing.updated_at, Utc::now());
        let item = self
            .repository
            .update(id, input, updated_at)
            .await?
            .ok_or_else(|| ItemError::NotFound(id.to_string()))?;

        info!(item_id = %id, "Item updated");
        Ok(item)
    }

    /// Delete an item by ID
    #[instrument(skip(self))]
    pub async fn delete_item(&self, id: &str) -> ItemResult<MessageResponse> {
        self.get_item(id).await?;

        if self.repository.delete(id).await? == 0 {
            return Err(ItemError::Inconsistent("Failed to delete item".to_string()));
        }

        info!(item_id = %id, "Item deleted");
        Ok(MessageResponse::new(
            "Item deleted successfully",
            format!("Item ID: {}", id),
        ))
    }

    /// Summary statistics over every item
    #[instrument(skip(self))]
    pub async fn statistics(&self) -> ItemResult<ItemStats> {
        let total_items = self.repository.count(Default::default()).await?;
        if total_items == 0 {
            return Ok(ItemStats::default());
        }

        let Some(prices) = self.repository.aggregate_prices().await? else {
            return Ok(ItemStats::default());
        };
        let categories = self.repository.distinct_categories().await?;

        Ok(ItemStats::from_parts(total_items, prices, categories))
    }

    /// Check that the store is reachable
    #[instrument(skip(self))]
    pub async fn health(&self) -> ItemResult<MessageResponse> {
        self.repository.ping().await?;
        Ok(MessageResponse::new(
            "API is healthy!",
            "Database connection: OK",
        ))
    }
}

impl<R: ItemRepository> Clone for ItemService<R> {
    fn clone(&self) -> Self {
        Self {
            repository: Arc::clone(&self.repository),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ItemFilter, PriceAggregate};
    use crate::repository::MockItemRepository;
    use chrono::Duration;
    use mockall::predicate::eq;

    fn laptop() -> CreateItem {
        CreateItem {
            name: "Laptop".into(),
            description: Some("High-performance laptop".into()),
            price: 999.99,
            quantity: 10,
            category: Some("Electronics".into()),
        }
    }

    fn stored(id: &str) -> Item {
        let mut item = Item::new(laptop(), Utc::now());
        item.id = id.to_string();
        item
    }

    #[tokio::test]
    async fn test_create_item_persists_once() {
        let mut mock_repo = MockItemRepository::new();
        mock_repo
            .expect_insert()
            .times(1)
            .withf(|item| item.name == "Laptop" && item.created_at == item.updated_at)
            .returning(Ok);

        let service = ItemService::new(mock_repo);
        let item = service.create_item(laptop()).await.unwrap();

        assert_eq!(item.price, 999.99);
        assert!(uuid::Uuid::parse_str(&item.id).is_ok());
    }

    #[tokio::test]
    async fn test_create_item_invalid_price_never_inserts() {
        let mut mock_repo = MockItemRepository::new();
        mock_repo.expect_insert().never();

        let service = ItemService::new(mock_repo);
        let input = CreateItem {
            price: -100.0,
            ..laptop()
        };

        let err = service.create_item(input).await.unwrap_err();
        assert!(matches!(err, ItemError::Validation(_)));
    }

    #[tokio::test]
    async fn test_list_items_computes_envelope() {
        let mut mock_repo = MockItemRepository::new();
        let expected_filter = ItemFilter {
            search: Some("lap".into()),
            category: None,
        };

        mock_repo
            .expect_count()
            .with(eq(expected_filter.clone()))
            .returning(|_| Ok(25));
        mock_repo
            .expect_find_page()
            .with(eq(expected_filter), eq(20), eq(10))
            .returning(|_, _, _| Ok(vec![stored("a"), stored("b")]));

        let service = ItemService::new(mock_repo);
        let page = service
            .list_items(ListItemsQuery {
                page: 3,
                page_size: 10,
                search: Some("lap".into()),
                category: Some(String::new()),
            })
            .await
            .unwrap();

        assert_eq!(page.total, 25);
        assert_eq!(page.total_pages, 3);
        assert_eq!(page.page, 3);
        assert_eq!(page.items.len(), 2);
    }

    #[tokio::test]
    async fn test_list_items_rejects_oversized_page() {
        let mut mock_repo = MockItemRepository::new();
        mock_repo.expect_count().never();

        let service = ItemService::new(mock_repo);
        let err = service
            .list_items(ListItemsQuery {
                page_size: 500,
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ItemError::Validation(_)));
    }

    #[tokio::test]
    async fn test_list_items_empty_store_has_one_page() {
        let mut mock_repo = MockItemRepository::new();
        mock_repo.expect_count().returning(|_| Ok(0));
        mock_repo.expect_find_page().returning(|_, _, _| Ok(vec![]));

        let service = ItemService::new(mock_repo);
        let page = service.list_items(ListItemsQuery::default()).await.unwrap();
        assert_eq!(page.total_pages, 1);
        assert!(page.items.is_empty());
    }

    #[tokio::test]
    async fn test_get_item_not_found() {
        let mut mock_repo = MockItemRepository::new();
        mock_repo.expect_find_by_id().returning(|_| Ok(None));

        let service = ItemService::new(mock_repo);
        let err = service.get_item("missing").await.unwrap_err();
        assert!(matches!(err, ItemError::NotFound(ref id) if id == "missing"));
    }

    #[tokio::test]
    async fn test_update_validates_before_lookup() {
        let mut mock_repo = MockItemRepository::new();
        mock_repo.expect_find_by_id().never();

        let service = ItemService::new(mock_repo);
        let err = service
            .update_item(
                "missing",
                UpdateItem {
                    quantity: Some(-1),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, ItemError::Validation(_)));
    }

    #[tokio::test]
    async fn test_update_missing_item_beats_empty_update() {
        let mut mock_repo = MockItemRepository::new();
        mock_repo.expect_find_by_id().returning(|_| Ok(None));
        mock_repo.expect_update().never();

        let service = ItemService::new(mock_repo);
        let err = service
            .update_item("missing", UpdateItem::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ItemError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_update_empty_body_rejected() {
        let mut mock_repo = MockItemRepository::new();
        mock_repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(stored(id))));
        mock_repo.expect_update().never();

        let service = ItemService::new(mock_repo);
        let err = service
            .update_item("abc", UpdateItem::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ItemError::EmptyUpdate));
    }

    #[tokio::test]
    async fn test_update_moves_updated_at_forward() {
        let existing = stored("abc");
        // Existing timestamp sits in the future so the clock cannot pass it.
        let future = existing.updated_at + Duration::days(1);

        let mut mock_repo = MockItemRepository::new();
        mock_repo.expect_find_by_id().returning(move |id| {
            let mut item = stored(id);
            item.updated_at = future;
            Ok(Some(item))
        });
        mock_repo
            .expect_update()
            .withf(move |id, changes, updated_at| {
                id == "abc"
                    && changes.price == Some(899.99)
                    && *updated_at == future + Duration::milliseconds(1)
            })
            .returning(|id, changes, updated_at| {
                let mut item = stored(id);
                item.apply_update(changes, updated_at);
                Ok(Some(item))
            });

        let service = ItemService::new(mock_repo);
        let item = service
            .update_item(
                "abc",
                UpdateItem {
                    price: Some(899.99),
                    ..Default::default()
                },
            )
            .await
            .unwrap();

        assert_eq!(item.price, 899.99);
        assert!(item.updated_at > future);
    }

    #[tokio::test]
    async fn test_delete_returns_confirmation() {
        let mut mock_repo = MockItemRepository::new();
        mock_repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(stored(id))));
        mock_repo.expect_delete().times(1).returning(|_| Ok(1));

        let service = ItemService::new(mock_repo);
        let message = service.delete_item("abc").await.unwrap();

        assert_eq!(message.message, "Item deleted successfully");
        assert_eq!(message.detail.as_deref(), Some("Item ID: abc"));
    }

    #[tokio::test]
    async fn test_delete_lost_race_is_inconsistent() {
        let mut mock_repo = MockItemRepository::new();
        mock_repo
            .expect_find_by_id()
            .returning(|id| Ok(Some(stored(id))));
        mock_repo.expect_delete().returning(|_| Ok(0));

        let service = ItemService::new(mock_repo);
        let err = service.delete_item("abc").await.unwrap_err();
        assert!(matches!(err, ItemError::Inconsistent(_)));
    }

    #[tokio::test]
    async fn test_delete_missing_never_deletes() {
        let mut mock_repo = MockItemRepository::new();
        mock_repo.expect_find_by_id().returning(|_| Ok(None));
        mock_repo.expect_delete().never();

        let service = ItemService::new(mock_repo);
        assert!(matches!(
            service.delete_item("abc").await.unwrap_err(),
            ItemError::NotFound(_)
        ));
    }

    #[tokio::test]
    async fn test_statistics_empty_store_is_all_zero() {
        let mut mock_repo = MockItemRepository::new();
        mock_repo.expect_count().returning(|_| Ok(0));
        mock_repo.expect_aggregate_prices().never();

        let service = ItemService::new(mock_repo);
        assert_eq!(service.statistics().await.unwrap(), ItemStats::default());
    }

    #[tokio::test]
    async fn test_statistics_combines_aggregate_and_categories() {
        let mut mock_repo = MockItemRepository::new();
        mock_repo.expect_count().returning(|_| Ok(2));
        mock_repo.expect_aggregate_prices().returning(|| {
            Ok(Some(PriceAggregate {
                total_quantity: 3,
                total_value: 30.005,
                average_price: 10.0,
                min_price: 5.0,
                max_price: 15.0,
            }))
        });
        mock_repo
            .expect_distinct_categories()
            .returning(|| Ok(vec!["Tools".into(), String::new(), "Books".into()]));

        let service = ItemService::new(mock_repo);
        let stats = service.statistics().await.unwrap();

        assert_eq!(stats.total_items, 2);
        assert_eq!(stats.total_quantity, 3);
        assert_eq!(stats.min_price, 5.0);
        assert_eq!(stats.categories, vec!["Books".to_string(), "Tools".to_string()]);
    }

    #[tokio::test]
    async fn test_health_maps_ping_failure() {
        let mut mock_repo = MockItemRepository::new();
        mock_repo
            .expect_ping()
            .returning(|| Err(ItemError::Unavailable("no servers".into())));

        let service = ItemService::new(mock_repo);
        assert!(matches!(
            service.health().await.unwrap_err(),
            ItemError::Unavailable(_)
        ));
    }
}
