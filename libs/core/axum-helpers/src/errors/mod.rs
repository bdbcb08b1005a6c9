pub mod codes;
pub mod handlers;
pub mod responses;

pub use codes::ErrorCode;

use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use serde_json::{Map, Value, json};
use thiserror::Error;
use utoipa::ToSchema;
use validator::ValidationErrors;

/// Body of every non-2xx response.
///
/// - `code`: integer error code for logs and monitoring (e.g. 1001)
/// - `error`: machine-readable identifier (e.g. "VALIDATION_ERROR")
/// - `message`: human-readable message
/// - `details`: per-field violations for validation failures
///
/// ```json
/// {
///   "code": 1004,
///   "error": "NOT_FOUND",
///   "message": "Item with ID 5f0c... not found"
/// }
/// ```
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub code: i32,
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

/// Application error type rendered as an [`ErrorResponse`].
///
/// Client errors are logged at `info`, server errors at `error`.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AppError {
    #[error("JSON extraction error: {0}")]
    JsonExtractorRejection(#[from] JsonRejection),

    #[error("Query extraction error: {0}")]
    QueryExtractorRejection(#[from] QueryRejection),

    #[error("Validation error: {0}")]
    ValidationError(#[from] ValidationErrors),

    #[error("Bad Request: {0}")]
    BadRequest(String),

    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Inconsistent state: {0}")]
    Inconsistent(String),

    #[error("Service Unavailable: {0}")]
    ServiceUnavailable(String),
}

impl AppError {
    /// HTTP status this error renders with.
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::JsonExtractorRejection(_)
            | AppError::QueryExtractorRejection(_)
            | AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ServiceUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::Database(_) | AppError::Inconsistent(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    pub fn error_code(&self) -> ErrorCode {
        match self {
            AppError::JsonExtractorRejection(_) => ErrorCode::JsonExtraction,
            AppError::QueryExtractorRejection(_) => ErrorCode::QueryExtraction,
            AppError::ValidationError(_) => ErrorCode::ValidationError,
            AppError::BadRequest(_) => ErrorCode::BadRequest,
            AppError::NotFound(_) => ErrorCode::NotFound,
            AppError::Database(_) => ErrorCode::DatabaseError,
            AppError::Inconsistent(_) => ErrorCode::DatabaseInconsistency,
            AppError::ServiceUnavailable(_) => ErrorCode::ServiceUnavailable,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let code = self.error_code();

        if status.is_server_error() {
            tracing::error!(error_code = code.code(), error = %self, "Request failed");
        } else {
            tracing::info!(error_code = code.code(), error = %self, "Request rejected");
        }

        let (message, details) = match self {
            AppError::ValidationError(e) => (
                code.default_message().to_string(),
                Some(validation_details(&e)),
            ),
            AppError::JsonExtractorRejection(e) => (e.body_text(), None),
            AppError::QueryExtractorRejection(e) => (e.body_text(), None),
            // Driver internals stay in the logs.
            AppError::Database(_) => (code.default_message().to_string(), None),
            AppError::BadRequest(msg)
            | AppError::NotFound(msg)
            | AppError::Inconsistent(msg)
            | AppError::ServiceUnavailable(msg) => (msg, None),
        };

        let body = Json(ErrorResponse {
            code: code.code(),
            error: code.as_str().to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Flattens validator output into `field -> [{code, message, params}]`.
pub fn validation_details(errors: &ValidationErrors) -> Value {
    let fields = errors
        .field_errors()
        .into_iter()
        .map(|(field, errors)| {
            let entries: Vec<Value> = errors
                .iter()
                .map(|err| {
                    json!({
                        "code": err.code,
                        "message": err.message,
                        "params": err.params,
                    })
                })
                .collect();
            (field.to_string(), Value::Array(entries))
        })
        .collect::<Map<_, _>>();

    Value::Object(fields)
}

/// Builds an error response without going through [`AppError`].
///
/// ```rust,ignore
/// use axum_helpers::errors::{error_response, ErrorCode};
/// use axum::http::StatusCode;
///
/// let response = error_response(
///     StatusCode::NOT_FOUND,
///     "No route".to_string(),
///     ErrorCode::NotFound,
/// );
/// ```
pub fn error_response(status: StatusCode, message: String, error_code: ErrorCode) -> Response {
    let body = Json(ErrorResponse {
        code: error_code.code(),
        error: error_code.as_str().to_string(),
        message,
        details: None,
    });

    (status, body).into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;
    use validator::Validate;

    #[derive(Validate)]
    struct Sample {
        #[validate(range(exclusive_min = 0.0))]
        price: f64,
        #[validate(length(min = 1))]
        name: String,
    }

    async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_error_renders_422_with_details() {
        let errors = Sample {
            price: -1.0,
            name: String::new(),
        }
        .validate()
        .unwrap_err();

        let response = AppError::from(errors).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

        let body = body_json(response).await;
        assert_eq!(body["code"], 1001);
        assert_eq!(body["error"], "VALIDATION_ERROR");
        assert_eq!(body["details"]["price"][0]["code"], "range");
        assert_eq!(body["details"]["name"][0]["code"], "length");
    }

    #[tokio::test]
    async fn test_not_found_keeps_message_and_omits_details() {
        let response = AppError::NotFound("Item with ID abc not found".into()).into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);

        let body = body_json(response).await;
        assert_eq!(body["error"], "NOT_FOUND");
        assert_eq!(body["message"], "Item with ID abc not found");
        assert!(body.get("details").is_none());
    }

    #[tokio::test]
    async fn test_database_error_hides_driver_message() {
        let response = AppError::Database("connection reset by peer".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["code"], 2003);
        assert_eq!(body["message"], "Database error occurred");
    }

    #[test]
    fn test_status_mapping() {
        assert_eq!(
            AppError::BadRequest("empty".into()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Inconsistent("gone".into()).status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            AppError::ServiceUnavailable("down".into()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[tokio::test]
    async fn test_inconsistent_state_keeps_message() {
        let response = AppError::Inconsistent("Failed to delete item".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["code"], 2017);
        assert_eq!(body["error"], "DATABASE_INCONSISTENCY");
        assert_eq!(body["message"], "Failed to delete item");
    }

    #[test]
    fn test_internal_errors_use_database_codes() {
        let internal_errors = [
            AppError::Database("timeout".into()),
            AppError::Inconsistent("gone".into()),
        ];
        for err in internal_errors {
            assert!(err.status().is_server_error());
            assert!((2000..3000).contains(&err.error_code().code()));
        }
    }

    #[tokio::test]
    async fn test_error_response_helper() {
        let response = error_response(
            StatusCode::NOT_FOUND,
            "nothing here".into(),
            ErrorCode::NotFound,
        );
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(response).await["code"], 1004);
    }
}
