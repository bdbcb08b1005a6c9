//! Server infrastructure: router assembly, liveness endpoint and graceful
//! shutdown.
//!
//! ```ignore
//! use axum_helpers::server::{create_production_app, create_router, health_router};
//! use core_config::app_info;
//!
//! let router = create_router::<ApiDoc>(api_routes, cors)
//!     .merge(health_router(app_info!()));
//!
//! create_production_app(router, &config.server, Duration::from_secs(30), async {
//!     database::mongodb::disconnect(client).await;
//! })
//! .await?;
//! ```

pub mod app;
pub mod health;
pub mod shutdown;

pub use app::{create_production_app, create_router, run_cleanup};
pub use health::{HealthResponse, health_router};
pub use shutdown::shutdown_signal;
