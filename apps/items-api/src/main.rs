use axum_helpers::{create_cors_layer, server::create_production_app, server::health_router};
use core_config::tracing::{init_tracing, install_color_eyre};
use std::time::Duration;
use tracing::info;

mod api;
mod config;
mod openapi;
mod state;

use config::Config;
use state::AppState;

#[tokio::main]
async fn main() -> eyre::Result<()> {
    install_color_eyre();

    let config = Config::from_env()?;
    init_tracing(&config.environment);

    // Single attempt; an unreachable store aborts startup.
    let mongo_client = database::mongodb::connect_from_config(&config.mongodb).await?;
    let db = mongo_client.database(config.mongodb.database());

    let state = AppState {
        config,
        mongo_client,
        db,
    };

    api::items::repository(&state).init_indexes().await?;

    let cors = create_cors_layer(&state.config.cors_origins)?;
    let router = axum_helpers::create_router::<openapi::ApiDoc>(api::routes(&state), cors);
    let app = router.merge(health_router(state.config.app));

    info!("Starting Items API with graceful shutdown (30s timeout)");

    let mongo_client = state.mongo_client.clone();
    create_production_app(
        app,
        &state.config.server,
        Duration::from_secs(30),
        async move {
            info!("Shutting down: closing MongoDB connections");
            database::mongodb::disconnect(mongo_client).await;
        },
    )
    .await
    .map_err(|e| eyre::eyre!("Server error: {}", e))?;

    info!("Items API shutdown complete");
    Ok(())
}
