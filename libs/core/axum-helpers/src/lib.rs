//! # Axum Helpers
//!
//! Shared building blocks for the workspace's Axum services.
//!
//! - **[`server`]**: router assembly, liveness endpoint, graceful shutdown
//! - **[`http`]**: CORS and security-header middleware
//! - **[`errors`]**: [`AppError`] and the standard error body
//! - **[`extractors`]**: validating JSON and query extractors
//!
//! ```ignore
//! use axum_helpers::server::{create_production_app, create_router, health_router};
//!
//! let router = create_router::<ApiDoc>(api_routes, create_cors_layer(&origins)?)
//!     .merge(health_router(core_config::app_info!()));
//! create_production_app(router, &config.server, Duration::from_secs(30), cleanup).await?;
//! ```

pub mod errors;
pub mod extractors;
pub mod http;
pub mod server;

pub use server::{
    HealthResponse, create_production_app, create_router, health_router, shutdown_signal,
};

pub use http::{create_cors_layer, parse_origins, security_headers};

pub use errors::{AppError, ErrorCode, ErrorResponse};

pub use extractors::{ValidatedJson, ValidatedQuery};
