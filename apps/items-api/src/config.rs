use axum_helpers::parse_origins;
use core_config::{AppInfo, FromEnv, app_info, env_or_default, server::ServerConfig};
use database::mongodb::MongoConfig;
use domain_items::mongodb::DEFAULT_COLLECTION;

pub use core_config::Environment;

/// Application configuration, composed from the shared config pieces
#[derive(Clone, Debug)]
pub struct Config {
    pub app: AppInfo,
    pub mongodb: MongoConfig,
    /// Collection holding item documents (`MONGODB_COLLECTION`)
    pub collection: String,
    pub server: ServerConfig,
    pub environment: Environment,
    /// Allowed CORS origins; `*` or empty allows any origin
    pub cors_origins: Vec<String>,
}

impl Config {
    pub fn from_env() -> eyre::Result<Self> {
        let environment = Environment::from_env();
        let mongodb = MongoConfig::from_env()?;
        let server = ServerConfig::from_env()?;

        Ok(Self {
            app: app_info!(),
            mongodb,
            collection: env_or_default("MONGODB_COLLECTION", DEFAULT_COLLECTION),
            server,
            environment,
            cors_origins: parse_origins(&env_or_default("CORS_ORIGINS", "*")),
        })
    }
}
