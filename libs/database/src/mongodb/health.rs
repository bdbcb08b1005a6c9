use mongodb::{Database, bson::doc};

use super::MongoError;

/// Sends `ping` to `db`. Succeeds only if the server answers.
pub async fn ping(db: &Database) -> Result<(), MongoError> {
    db.run_command(doc! { "ping": 1 }).await?;
    Ok(())
}
