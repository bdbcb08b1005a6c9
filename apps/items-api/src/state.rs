//! Shared application state, built once in `main`.

use mongodb::{Client, Database};

/// Everything the route builders need from startup.
///
/// Cloning is cheap; the client shares one connection pool.
#[derive(Clone)]
pub struct AppState {
    pub config: crate::config::Config,
    pub mongo_client: Client,
    pub db: Database,
}
