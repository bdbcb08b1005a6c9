//! Wires the items domain to the configured MongoDB collection.

use domain_items::{ItemService, MongoItemRepository};

use crate::state::AppState;

pub fn repository(state: &AppState) -> MongoItemRepository {
    MongoItemRepository::with_collection(&state.db, &state.config.collection)
}

pub fn service(state: &AppState) -> ItemService<MongoItemRepository> {
    ItemService::new(repository(state))
}
