//! MongoDB connection management and health checks.

mod config;
mod connector;
mod health;

pub use config::MongoConfig;
pub use connector::{MongoError, client_options, connect_from_config, disconnect};
pub use health::ping;

pub use mongodb::{Client, Collection, Database};
