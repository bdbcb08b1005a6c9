use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
};
use axum_helpers::{
    ValidatedJson, ValidatedQuery,
    errors::responses::{
        BadRequestResponse, InternalServerErrorResponse, NotFoundResponse,
        ServiceUnavailableResponse, ValidationErrorResponse,
    },
};
use std::sync::Arc;
use utoipa::OpenApi;

use crate::error::ItemResult;
use crate::models::{
    CreateItem, Item, ItemStats, ListItemsQuery, MessageResponse, PaginatedItems, UpdateItem,
};
use crate::repository::ItemRepository;
use crate::service::ItemService;

/// OpenAPI documentation for the item endpoints
#[derive(OpenApi)]
#[openapi(
    paths(
        list_items,
        create_item,
        item_statistics,
        get_item,
        update_item,
        delete_item,
    ),
    components(
        schemas(Item, CreateItem, UpdateItem, PaginatedItems, ItemStats, MessageResponse),
        responses(
            NotFoundResponse,
            ValidationErrorResponse,
            BadRequestResponse,
            InternalServerErrorResponse
        )
    ),
    tags(
        (name = "Items", description = "Item management endpoints (MongoDB)")
    )
)]
pub struct ApiDoc;

/// OpenAPI documentation for the welcome and health endpoints
#[derive(OpenApi)]
#[openapi(
    paths(welcome, health),
    components(
        schemas(MessageResponse),
        responses(ServiceUnavailableResponse)
    ),
    tags(
        (name = "General", description = "Service status")
    )
)]
pub struct StatusApiDoc;

/// Item CRUD, listing and statistics routes. Mount under `/items`.
pub fn router<R: ItemRepository + 'static>(service: ItemService<R>) -> Router {
    Router::new()
        .route("/", get(list_items).post(create_item))
        .route("/stats/summary", get(item_statistics))
        .route("/{id}", get(get_item).put(update_item).delete(delete_item))
        .with_state(Arc::new(service))
}

/// Welcome and store health routes. Mount at the API root.
pub fn status_router<R: ItemRepository + 'static>(service: ItemService<R>) -> Router {
    Router::new()
        .route("/", get(welcome))
        .route("/health", get(health))
        .with_state(Arc::new(service))
}

/// List items, paginated and optionally filtered
#[utoipa::path(
    get,
    path = "",
    tag = "Items",
    params(ListItemsQuery),
    responses(
        (status = 200, description = "One page of items", body = PaginatedItems),
        (status = 422, response = ValidationErrorResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn list_items<R: ItemRepository>(
    State(service): State<Arc<ItemService<R>>>,
    ValidatedQuery(query): ValidatedQuery<ListItemsQuery>,
) -> ItemResult<Json<PaginatedItems>> {
    let page = service.list_items(query).await?;
    Ok(Json(page))
}

/// Create a new item
#[utoipa::path(
    post,
    path = "",
    tag = "Items",
    request_body = CreateItem,
    responses(
        (status = 201, description = "Item created successfully", body = Item),
        (status = 422, response = ValidationErrorResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn create_item<R: ItemRepository>(
    State(service): State<Arc<ItemService<R>>>,
    ValidatedJson(input): ValidatedJson<CreateItem>,
) -> ItemResult<impl IntoResponse> {
    let item = service.create_item(input).await?;
    Ok((StatusCode::CREATED, Json(item)))
}

/// Summary statistics over every item
#[utoipa::path(
    get,
    path = "/stats/summary",
    tag = "Items",
    responses(
        (status = 200, description = "Item statistics", body = ItemStats),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn item_statistics<R: ItemRepository>(
    State(service): State<Arc<ItemService<R>>>,
) -> ItemResult<Json<ItemStats>> {
    Ok(Json(service.statistics().await?))
}

/// Get an item by ID
#[utoipa::path(
    get,
    path = "/{id}",
    tag = "Items",
    params(
        ("id" = String, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item found", body = Item),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn get_item<R: ItemRepository>(
    State(service): State<Arc<ItemService<R>>>,
    Path(id): Path<String>,
) -> ItemResult<Json<Item>> {
    let item = service.get_item(&id).await?;
    Ok(Json(item))
}

/// Partially update an item
#[utoipa::path(
    put,
    path = "/{id}",
    tag = "Items",
    params(
        ("id" = String, Path, description = "Item ID")
    ),
    request_body = UpdateItem,
    responses(
        (status = 200, description = "Item updated successfully", body = Item),
        (status = 400, response = BadRequestResponse),
        (status = 404, response = NotFoundResponse),
        (status = 422, response = ValidationErrorResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn update_item<R: ItemRepository>(
    State(service): State<Arc<ItemService<R>>>,
    Path(id): Path<String>,
    ValidatedJson(input): ValidatedJson<UpdateItem>,
) -> ItemResult<Json<Item>> {
    let item = service.update_item(&id, input).await?;
    Ok(Json(item))
}

/// Delete an item
#[utoipa::path(
    delete,
    path = "/{id}",
    tag = "Items",
    params(
        ("id" = String, Path, description = "Item ID")
    ),
    responses(
        (status = 200, description = "Item deleted successfully", body = MessageResponse),
        (status = 404, response = NotFoundResponse),
        (status = 500, response = InternalServerErrorResponse)
    )
)]
async fn delete_item<R: ItemRepository>(
    State(service): State<Arc<ItemService<R>>>,
    Path(id): Path<String>,
) -> ItemResult<Json<MessageResponse>> {
    Ok(Json(service.delete_item(&id).await?))
}

/// Welcome message
#[utoipa::path(
    get,
    path = "/",
    tag = "General",
    responses(
        (status = 200, description = "Service is running", body = MessageResponse)
    )
)]
async fn welcome() -> Json<MessageResponse> {
    Json(MessageResponse::new(
        "Welcome to the Items API!",
        "Visit /api/openapi.json for the API description",
    ))
}

/// Store connectivity check
#[utoipa::path(
    get,
    path = "/health",
    tag = "General",
    responses(
        (status = 200, description = "Database reachable", body = MessageResponse),
        (status = 503, response = ServiceUnavailableResponse)
    )
)]
async fn health<R: ItemRepository>(
    State(service): State<Arc<ItemService<R>>>,
) -> ItemResult<Json<MessageResponse>> {
    Ok(Json(service.health().await?))
}
