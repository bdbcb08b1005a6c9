//! MongoDB test infrastructure
//!
//! Provides a `TestMongo` helper backed by a throwaway MongoDB container.

use mongodb::{Client, Database};
use testcontainers::runners::AsyncRunner;
use testcontainers::{ContainerAsync, ImageExt};
use testcontainers_modules::mongo::Mongo;

/// Test MongoDB wrapper
///
/// The container is stopped and removed when this struct is dropped. Each
/// instance gets its own server, so tests never share documents.
///
/// ```no_run
/// use test_utils::TestMongo;
///
/// # async fn example() {
/// let mongo = TestMongo::new().await;
/// let items = mongo.database().collection::<mongodb::bson::Document>("items");
/// # }
/// ```
pub struct TestMongo {
    #[allow(dead_code)]
    container: ContainerAsync<Mongo>,
    client: Client,
    database: Database,
    pub connection_string: String,
}

impl TestMongo {
    /// Starts MongoDB 7 and connects to a database named `test`.
    pub async fn new() -> Self {
        Self::with_database("test").await
    }

    pub async fn with_database(name: &str) -> Self {
        let container = Mongo::default()
            .with_tag("7")
            .start()
            .await
            .expect("Failed to start MongoDB container");

        let host_port = container
            .get_host_port_ipv4(27017)
            .await
            .expect("Failed to get MongoDB port");

        let connection_string = format!("mongodb://127.0.0.1:{}", host_port);

        let client = Client::with_uri_str(&connection_string)
            .await
            .expect("Failed to create MongoDB client");

        tracing::info!(%connection_string, "Test MongoDB container ready");

        Self {
            container,
            database: client.database(name),
            client,
            connection_string,
        }
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn database(&self) -> Database {
        self.database.clone()
    }
}
