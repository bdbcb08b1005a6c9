//! OpenAPI documentation configuration

use utoipa::OpenApi;

/// Combined OpenAPI documentation served at `/api/openapi.json`
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Items API",
        version = "0.1.0",
        description = "MongoDB-backed REST API for managing item records",
        license(name = "MIT")
    ),
    servers(
        (url = "http://localhost:8080", description = "Local development server")
    ),
    nest(
        (path = "/api/items", api = domain_items::ApiDoc),
        (path = "/api", api = domain_items::StatusApiDoc)
    ),
    tags(
        (name = "Items", description = "Item management endpoints (MongoDB)"),
        (name = "General", description = "Service status")
    )
)]
pub struct ApiDoc;
