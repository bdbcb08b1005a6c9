//! Type-safe error codes for API responses.
//!
//! Each code carries:
//! - a string identifier for clients (e.g. "VALIDATION_ERROR")
//! - an integer code for logs and monitoring (e.g. 1001)
//! - a default human-readable message
//!
//! ```rust
//! use axum_helpers::errors::ErrorCode;
//!
//! let code = ErrorCode::ValidationError;
//! assert_eq!(code.as_str(), "VALIDATION_ERROR");
//! assert_eq!(code.code(), 1001);
//! assert_eq!(code.default_message(), "Request validation failed");
//! ```

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // Client errors (1000-1999)
    /// Request body, path or query failed field validation
    ValidationError,

    /// JSON extraction from request body failed
    JsonExtraction,

    /// Requested resource was not found
    NotFound,

    /// Request is well-formed but cannot be acted on
    BadRequest,

    /// Query string could not be deserialized
    QueryExtraction,

    /// Route does not accept the request method
    MethodNotAllowed,

    // Server errors
    /// A dependency (e.g. the database) is unreachable
    ServiceUnavailable,

    // Database errors (2000-2999)
    /// A database call failed
    DatabaseError,

    /// Stored data contradicts a check made in the same request
    DatabaseInconsistency,
}

impl ErrorCode {
    /// SCREAMING_SNAKE_CASE identifier clients can match on.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::JsonExtraction => "JSON_EXTRACTION",
            Self::NotFound => "NOT_FOUND",
            Self::BadRequest => "BAD_REQUEST",
            Self::QueryExtraction => "QUERY_EXTRACTION",
            Self::MethodNotAllowed => "METHOD_NOT_ALLOWED",
            Self::ServiceUnavailable => "SERVICE_UNAVAILABLE",
            Self::DatabaseError => "DATABASE_ERROR",
            Self::DatabaseInconsistency => "DATABASE_INCONSISTENCY",
        }
    }

    /// Integer code used in structured logs and metrics.
    ///
    /// Ranges:
    /// - 1000-1999: client and availability errors
    /// - 2000-2999: database errors
    pub fn code(&self) -> i32 {
        match self {
            Self::ValidationError => 1001,
            Self::JsonExtraction => 1003,
            Self::NotFound => 1004,
            Self::ServiceUnavailable => 1011,
            Self::BadRequest => 1012,
            Self::QueryExtraction => 1013,
            Self::MethodNotAllowed => 1014,

            Self::DatabaseError => 2003,
            Self::DatabaseInconsistency => 2017,
        }
    }

    pub fn default_message(&self) -> &'static str {
        match self {
            Self::ValidationError => "Request validation failed",
            Self::JsonExtraction => "Failed to parse request body",
            Self::NotFound => "Resource not found",
            Self::BadRequest => "Bad request",
            Self::QueryExtraction => "Failed to parse query parameters",
            Self::MethodNotAllowed => "The HTTP method is not allowed for this resource",
            Self::ServiceUnavailable => "Service is temporarily unavailable",
            Self::DatabaseError => "Database error occurred",
            Self::DatabaseInconsistency => "Database state changed during the request",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
