#![allow(dead_code)]

use async_trait::async_trait;
use axum::{Router, body::Body, http::Request, response::Response};
use chrono::{DateTime, Utc};
use domain_items::{
    ItemError, ItemFilter, ItemRepository, ItemResult, ItemService, PriceAggregate, UpdateItem,
    handlers, models::Item,
};
use http_body_util::BodyExt;
use serde_json::Value;
use std::sync::{
    Arc, Mutex,
    atomic::{AtomicBool, Ordering},
};
use tower::ServiceExt;

/// In-process stand-in for the MongoDB repository
#[derive(Clone, Default)]
pub struct InMemoryItemRepository {
    items: Arc<Mutex<Vec<Item>>>,
    unreachable: Arc<AtomicBool>,
}

impl InMemoryItemRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later `ping` fail.
    pub fn set_unreachable(&self) {
        self.unreachable.store(true, Ordering::SeqCst);
    }

    pub fn len(&self) -> usize {
        self.items.lock().unwrap().len()
    }

    fn sorted(&self, filter: &ItemFilter) -> Vec<Item> {
        let mut items: Vec<Item> = self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter(|item| filter.matches(item))
            .cloned()
            .collect();
        items.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        items
    }
}

#[async_trait]
impl ItemRepository for InMemoryItemRepository {
    async fn insert(&self, item: Item) -> ItemResult<Item> {
        self.items.lock().unwrap().push(item.clone());
        Ok(item)
    }

    async fn find_by_id(&self, id: &str) -> ItemResult<Option<Item>> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .find(|item| item.id == id)
            .cloned())
    }

    async fn find_page(&self, filter: ItemFilter, skip: u64, limit: u64) -> ItemResult<Vec<Item>> {
        Ok(self
            .sorted(&filter)
            .into_iter()
            .skip(skip as usize)
            .take(limit as usize)
            .collect())
    }

    async fn count(&self, filter: ItemFilter) -> ItemResult<u64> {
        Ok(self.sorted(&filter).len() as u64)
    }

    async fn update(
        &self,
        id: &str,
        changes: UpdateItem,
        updated_at: DateTime<Utc>,
    ) -> ItemResult<Option<Item>> {
        let mut items = self.items.lock().unwrap();
        Ok(items.iter_mut().find(|item| item.id == id).map(|item| {
            item.apply_update(changes, updated_at);
            item.clone()
        }))
    }

    async fn delete(&self, id: &str) -> ItemResult<u64> {
        let mut items = self.items.lock().unwrap();
        let before = items.len();
        items.retain(|item| item.id != id);
        Ok((before - items.len()) as u64)
    }

    async fn aggregate_prices(&self) -> ItemResult<Option<PriceAggregate>> {
        let items = self.items.lock().unwrap();
        if items.is_empty() {
            return Ok(None);
        }

        let prices: Vec<f64> = items.iter().map(|item| item.price).collect();
        Ok(Some(PriceAggregate {
            total_quantity: items.iter().map(|item| item.quantity).sum(),
            total_value: items
                .iter()
                .map(|item| item.price * item.quantity as f64)
                .sum(),
            average_price: prices.iter().sum::<f64>() / prices.len() as f64,
            min_price: prices.iter().copied().fold(f64::INFINITY, f64::min),
            max_price: prices.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        }))
    }

    async fn distinct_categories(&self) -> ItemResult<Vec<String>> {
        Ok(self
            .items
            .lock()
            .unwrap()
            .iter()
            .filter_map(|item| item.category.clone())
            .collect())
    }

    async fn ping(&self) -> ItemResult<()> {
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(ItemError::Unavailable("server selection timeout".into()));
        }
        Ok(())
    }
}

/// The API as mounted under `/api` by the application.
pub fn app(repo: InMemoryItemRepository) -> Router {
    let service = ItemService::new(repo);
    Router::new().nest(
        "/api",
        Router::new()
            .nest("/items", handlers::router(service.clone()))
            .merge(handlers::status_router(service)),
    )
}

pub async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> Response {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

pub async fn json_body(response: Response) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
