//! API routes, nested under `/api` by `axum_helpers::create_router`.

pub mod items;

use axum::Router;
use domain_items::handlers;

use crate::state::AppState;

pub fn routes(state: &AppState) -> Router {
    let service = items::service(state);

    Router::new()
        .nest("/items", handlers::router(service.clone()))
        .merge(handlers::status_router(service))
}
