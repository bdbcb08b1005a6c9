//! Database library providing MongoDB connectors and utilities
//!
//! # Features
//!
//! - `mongodb` (default) - MongoDB connection management and health checks
//! - `config` - Configuration support with `core_config::FromEnv`
//! - `all` - All features
//!
//! # Example
//!
//! ```ignore
//! use database::mongodb;
//!
//! let config = mongodb::MongoConfig::with_database("mongodb://localhost:27017", "mydb");
//! let client = mongodb::connect_from_config(&config).await?;
//! let db = client.database(config.database());
//! let collection = db.collection::<Document>("items");
//!
//! // On shutdown
//! mongodb::disconnect(client).await;
//! ```

#[cfg(feature = "mongodb")]
pub mod mongodb;
