use axum::response::{IntoResponse, Response};
use axum_helpers::AppError;
use database::mongodb::MongoError;
use thiserror::Error;
use validator::ValidationErrors;

#[derive(Debug, Error)]
pub enum ItemError {
    #[error("Validation failed: {0}")]
    Validation(#[from] ValidationErrors),

    #[error("No valid fields provided for update")]
    EmptyUpdate,

    #[error("Item with ID '{0}' not found")]
    NotFound(String),

    /// A mutation disagreed with the existence check made just before it.
    #[error("{0}")]
    Inconsistent(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Database connection failed: {0}")]
    Unavailable(String),
}

pub type ItemResult<T> = Result<T, ItemError>;

impl From<ItemError> for AppError {
    fn from(err: ItemError) -> Self {
        let message = err.to_string();
        match err {
            ItemError::Validation(errors) => AppError::ValidationError(errors),
            ItemError::EmptyUpdate => AppError::BadRequest(message),
            ItemError::NotFound(_) => AppError::NotFound(message),
            ItemError::Inconsistent(msg) => AppError::Inconsistent(msg),
            ItemError::Database(msg) => AppError::Database(msg),
            ItemError::Unavailable(_) => AppError::ServiceUnavailable(message),
        }
    }
}

impl IntoResponse for ItemError {
    fn into_response(self) -> Response {
        AppError::from(self).into_response()
    }
}

impl From<mongodb::error::Error> for ItemError {
    fn from(err: mongodb::error::Error) -> Self {
        ItemError::Database(err.to_string())
    }
}

impl From<mongodb::bson::de::Error> for ItemError {
    fn from(err: mongodb::bson::de::Error) -> Self {
        ItemError::Database(format!("Failed to decode document: {}", err))
    }
}

impl From<MongoError> for ItemError {
    fn from(err: MongoError) -> Self {
        ItemError::Unavailable(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_status_codes() {
        let cases = [
            (ItemError::EmptyUpdate, StatusCode::BAD_REQUEST),
            (ItemError::NotFound("abc".into()), StatusCode::NOT_FOUND),
            (
                ItemError::Inconsistent("Failed to delete item".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ItemError::Database("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                ItemError::Unavailable("timeout".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                ItemError::Validation(ValidationErrors::new()),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_not_found_message_names_id() {
        let app: AppError = ItemError::NotFound("42".into()).into();
        assert_eq!(app.to_string(), "Not Found: Item with ID '42' not found");
    }
}
