//! Items Domain
//!
//! Item records kept in MongoDB: CRUD, paginated search and summary
//! statistics.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────┐
//! │  Handlers   │  ← HTTP endpoints
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Service   │  ← Validation, existence checks, timestamps
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │ Repository  │  ← Data access (trait + MongoDB implementation)
//! └──────┬──────┘
//!        │
//! ┌──────▼──────┐
//! │   Models    │  ← Entities, DTOs
//! └─────────────┘
//! ```
//!
//! # Usage
//!
//! ```rust,no_run
//! use domain_items::{handlers, MongoItemRepository, ItemService};
//! use mongodb::Client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::with_uri_str("mongodb://localhost:27017").await?;
//! let repository = MongoItemRepository::new(&client.database("inventory"));
//! repository.init_indexes().await?;
//!
//! let service = ItemService::new(repository);
//! let api = axum::Router::new()
//!     .nest("/items", handlers::router(service.clone()))
//!     .merge(handlers::status_router(service));
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod handlers;
pub mod models;
pub mod mongodb;
pub mod repository;
pub mod service;

pub use error::{ItemError, ItemResult};
pub use handlers::{ApiDoc, StatusApiDoc};
pub use models::{
    CreateItem, Item, ItemFilter, ItemStats, ListItemsQuery, MessageResponse, PaginatedItems,
    PriceAggregate, UpdateItem,
};
pub use mongodb::MongoItemRepository;
pub use repository::ItemRepository;
pub use service::ItemService;
