use super::shutdown::shutdown_signal;
use crate::errors::handlers::{method_not_allowed, not_found};
use crate::http::security::security_headers;
use axum::{Json, Router, middleware, routing::get};
use core_config::server::ServerConfig;
use std::future::Future;
use std::io;
use std::time::Duration;
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer};
use tracing::{Level, info, warn};
use utoipa::OpenApi;

/// Wraps the API routes with the shared cross-cutting layers.
///
/// - routes nested under `/api`
/// - OpenAPI document at `/api/openapi.json`
/// - JSON 404 and 405 fallbacks
/// - request tracing, security headers, CORS and response compression
///
/// Routers passed in must already have their state applied.
pub fn create_router<T>(apis: Router, cors: CorsLayer) -> Router
where
    T: OpenApi + 'static,
{
    let apis = apis.route("/openapi.json", get(|| async { Json(T::openapi()) }));

    Router::new()
        .nest("/api", apis)
        .fallback(not_found)
        .method_not_allowed_fallback(method_not_allowed)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(middleware::from_fn(security_headers))
        .layer(cors)
        .layer(CompressionLayer::new())
}

/// Runs `cleanup`, giving up after `timeout`.
pub async fn run_cleanup<F>(cleanup: F, timeout: Duration)
where
    F: Future<Output = ()>,
{
    info!("Starting cleanup tasks (timeout: {:?})", timeout);
    match tokio::time::timeout(timeout, cleanup).await {
        Ok(_) => info!("Cleanup completed successfully"),
        Err(_) => warn!("Cleanup exceeded timeout of {:?}, forcing shutdown", timeout),
    }
}

/// Serves `router` until SIGINT/SIGTERM, drains in-flight requests, then runs
/// `cleanup` bounded by `shutdown_timeout`.
///
/// ```ignore
/// create_production_app(router, &config.server, Duration::from_secs(30), async move {
///     client.shutdown().await;
/// })
/// .await?;
/// ```
pub async fn create_production_app<F>(
    router: Router,
    server_config: &ServerConfig,
    shutdown_timeout: Duration,
    cleanup: F,
) -> io::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let listener = tokio::net::TcpListener::bind(server_config.address()).await?;
    info!("Server starting on {}", listener.local_addr()?);

    let serve_result = axum::serve(listener, router.into_make_service())
        .with_graceful_shutdown(shutdown_signal())
        .await
        .inspect_err(|e| {
            tracing::error!("Server encountered an error: {:?}", e);
        });

    run_cleanup(cleanup, shutdown_timeout).await;

    serve_result
}
