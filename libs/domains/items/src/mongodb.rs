//! MongoDB implementation of ItemRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures_util::TryStreamExt;
use mongodb::{
    Collection, Database, IndexModel,
    bson::{self, Bson, Document, doc},
    options::{IndexOptions, ReturnDocument},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use crate::error::ItemResult;
use crate::models::{Item, ItemFilter, PriceAggregate, UpdateItem};
use crate::repository::ItemRepository;

pub const DEFAULT_COLLECTION: &str = "items";

/// Stored shape of an item. Lookups use the `id` field; Mongo's own `_id`
/// is never read back.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct ItemDocument {
    id: String,
    name: String,
    description: Option<String>,
    price: f64,
    quantity: i64,
    category: Option<String>,
    created_at: bson::DateTime,
    updated_at: bson::DateTime,
}

fn to_bson_datetime(ts: DateTime<Utc>) -> bson::DateTime {
    bson::DateTime::from_millis(ts.timestamp_millis())
}

fn from_bson_datetime(ts: bson::DateTime) -> DateTime<Utc> {
    DateTime::from_timestamp_millis(ts.timestamp_millis()).unwrap_or_default()
}

impl From<&Item> for ItemDocument {
    fn from(item: &Item) -> Self {
        Self {
            id: item.id.clone(),
            name: item.name.clone(),
            description: item.description.clone(),
            price: item.price,
            quantity: item.quantity,
            category: item.category.clone(),
            created_at: to_bson_datetime(item.created_at),
            updated_at: to_bson_datetime(item.updated_at),
        }
    }
}

impl From<ItemDocument> for Item {
    fn from(doc: ItemDocument) -> Self {
        Self {
            id: doc.id,
            name: doc.name,
            description: doc.description,
            price: doc.price,
            quantity: doc.quantity,
            category: doc.category,
            created_at: from_bson_datetime(doc.created_at),
            updated_at: from_bson_datetime(doc.updated_at),
        }
    }
}

/// MongoDB implementation of the ItemRepository
pub struct MongoItemRepository {
    database: Database,
    collection: Collection<ItemDocument>,
}

impl MongoItemRepository {
    /// Repository over the `items` collection of `db`.
    ///
    /// ```ignore
    /// let client = Client::with_uri_str("mongodb://localhost:27017").await?;
    /// let repo = MongoItemRepository::new(&client.database("inventory"));
    /// repo.init_indexes().await?;
    /// ```
    pub fn new(db: &Database) -> Self {
        Self::with_collection(db, DEFAULT_COLLECTION)
    }

    pub fn with_collection(db: &Database, collection_name: &str) -> Self {
        Self {
            database: db.clone(),
            collection: db.collection::<ItemDocument>(collection_name),
        }
    }

    /// Ascending single-field indexes on `name` and `category`.
    pub async fn init_indexes(&self) -> ItemResult<()> {
        let indexes = vec![
            IndexModel::builder()
                .keys(doc! { "name": 1 })
                .options(IndexOptions::builder().name("idx_name".to_string()).build())
                .build(),
            IndexModel::builder()
                .keys(doc! { "category": 1 })
                .options(
                    IndexOptions::builder()
                        .name("idx_category".to_string())
                        .build(),
                )
                .build(),
        ];

        self.collection.create_indexes(indexes).await?;
        tracing::info!(collection = %self.collection.name(), "Item indexes created");
        Ok(())
    }

    /// Search text and category are escaped so they match literally.
    fn build_filter(filter: &ItemFilter) -> Document {
        let mut doc = doc! {};

        if let Some(ref search) = filter.search {
            doc.insert(
                "name",
                doc! { "$regex": regex::escape(search), "$options": "i" },
            );
        }

        if let Some(ref category) = filter.category {
            doc.insert(
                "category",
                doc! { "$regex": format!("^{}$", regex::escape(category)), "$options": "i" },
            );
        }

        doc
    }

    fn build_update(changes: &UpdateItem, updated_at: DateTime<Utc>) -> Document {
        let mut set = doc! {};

        if let Some(ref name) = changes.name {
            set.insert("name", name.as_str());
        }
        if let Some(ref description) = changes.description {
            set.insert("description", description.as_str());
        }
        if let Some(price) = changes.price {
            set.insert("price", price);
        }
        if let Some(quantity) = changes.quantity {
            set.insert("quantity", quantity);
        }
        if let Some(ref category) = changes.category {
            set.insert("category", category.as_str());
        }
        set.insert("updated_at", to_bson_datetime(updated_at));

        doc! { "$set": set }
    }

    fn stats_pipeline() -> Vec<Document> {
        vec![
            doc! {
                "$group": {
                    "_id": Bson::Null,
                    "total_quantity": { "$sum": "$quantity" },
                    "total_value": { "$sum": { "$multiply": ["$price", "$quantity"] } },
                    "average_price": { "$avg": "$price" },
                    "min_price": { "$min": "$price" },
                    "max_price": { "$max": "$price" },
                }
            },
            doc! { "$project": { "_id": 0 } },
        ]
    }

    fn projection() -> Document {
        doc! { "_id": 0 }
    }
}

#[async_trait]
impl ItemRepository for MongoItemRepository {
    #[instrument(skip(self, item), fields(item_id = %item.id))]
    async fn insert(&self, item: Item) -> ItemResult<Item> {
        self.collection.insert_one(ItemDocument::from(&item)).await?;
        Ok(item)
    }

    #[instrument(skip(self))]
    async fn find_by_id(&self, id: &str) -> ItemResult<Option<Item>> {
        let found = self
            .collection
            .find_one(doc! { "id": id })
            .projection(Self::projection())
            .await?;
        Ok(found.map(Item::from))
    }

    #[instrument(skip(self))]
    async fn find_page(&self, filter: ItemFilter, skip: u64, limit: u64) -> ItemResult<Vec<Item>> {
        let cursor = self
            .collection
            .find(Self::build_filter(&filter))
            .projection(Self::projection())
            .sort(doc! { "created_at": 1, "id": 1 })
            .skip(skip)
            .limit(i64::try_from(limit).unwrap_or(i64::MAX))
            .await?;

        let docs: Vec<ItemDocument> = cursor.try_collect().await?;
        Ok(docs.into_iter().map(Item::from).collect())
    }

    #[instrument(skip(self))]
    async fn count(&self, filter: ItemFilter) -> ItemResult<u64> {
        let count = self
            .collection
            .count_documents(Self::build_filter(&filter))
            .await?;
        Ok(count)
    }

    #[instrument(skip(self, changes))]
    async fn update(
        &self,
        id: &str,
        changes: UpdateItem,
        updated_at: DateTime<Utc>,
    ) -> ItemResult<Option<Item>> {
        let updated = self
            .collection
            .find_one_and_update(doc! { "id": id }, Self::build_update(&changes, updated_at))
            .return_document(ReturnDocument::After)
            .projection(Self::projection())
            .await?;
        Ok(updated.map(Item::from))
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: &str) -> ItemResult<u64> {
        let result = self.collection.delete_one(doc! { "id": id }).await?;
        Ok(result.deleted_count)
    }

    #[instrument(skip(self))]
    async fn aggregate_prices(&self) -> ItemResult<Option<PriceAggregate>> {
        let mut cursor = self.collection.aggregate(Self::stats_pipeline()).await?;

        match cursor.try_next().await? {
            Some(doc) => Ok(Some(bson::from_document(doc)?)),
            None => Ok(None),
        }
    }

    #[instrument(skip(self))]
    async fn distinct_categories(&self) -> ItemResult<Vec<String>> {
        let values = self.collection.distinct("category", doc! {}).await?;
        Ok(values
            .into_iter()
            .filter_map(|value| match value {
                Bson::String(s) => Some(s),
                _ => None,
            })
            .collect())
    }

    async fn ping(&self) -> ItemResult<()> {
        database::mongodb::ping(&self.database).await?;
        Ok(())
    }
}
