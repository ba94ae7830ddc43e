/// Error handling for the API server
///
/// This module provides a unified error type that maps to HTTP responses.
/// All handlers return `Result<T, ApiError>` which converts to the
/// appropriate status code:
///
/// - malformed input, mapping and validation failures: `400`
/// - unknown ids: `404`
/// - everything else, including query timeouts: `500`, logged and never
///   exposed to the client
///
/// # Example
///
/// ```no_run
/// use taskboard_api::error::ApiResult;
/// use taskboard_shared::db::context::QueryContext;
/// use taskboard_shared::db::queries::Querier;
/// use taskboard_shared::models::user::{User, UserQueries};
/// use axum::Json;
///
/// async fn handler(q: &dyn Querier, id: i64) -> ApiResult<Json<User>> {
///     let user = q.get_user(&QueryContext::background(), id).await?;
///     Ok(Json(user))
/// }
/// ```

use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use taskboard_shared::error::QueryError;
use taskboard_shared::mapper::MapError;

/// API result type alias
pub type ApiResult<T> = Result<T, ApiError>;

/// Unified API error type
#[derive(Debug)]
pub enum ApiError {
    /// Bad request (400): the body, path or query string could not be decoded
    BadRequest(String),

    /// Not found (404)
    NotFound(String),

    /// Validation failed (400)
    ValidationError {
        message: String,
        details: Vec<ValidationErrorDetail>,
    },

    /// Internal server error (500)
    InternalError(String),
}

/// Validation error detail
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationErrorDetail {
    /// Field that failed validation
    pub field: String,

    /// Error message
    pub message: String,
}

/// Error response format
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error code (e.g., "bad_request", "not_found")
    pub error: String,

    /// Human-readable error message
    pub message: String,

    /// Per-field validation failures
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<ValidationErrorDetail>>,
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ApiError::BadRequest(msg) => write!(f, "Bad request: {}", msg),
            ApiError::NotFound(msg) => write!(f, "Not found: {}", msg),
            ApiError::ValidationError { message, details } => {
                write!(f, "Validation failed: {} ({} errors)", message, details.len())
            }
            ApiError::InternalError(msg) => write!(f, "Internal error: {}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, details) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::ValidationError { message, details } => (
                StatusCode::BAD_REQUEST,
                "validation_error",
                message,
                Some(details),
            ),
            ApiError::InternalError(msg) => {
                // Log internal errors but don't expose details to clients
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal_error",
                    "An internal error occurred".to_string(),
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_code.to_string(),
            message,
            details,
        });

        (status, body).into_response()
    }
}

/// Convert query layer errors to API errors
impl From<QueryError> for ApiError {
    fn from(err: QueryError) -> Self {
        match err {
            QueryError::NotFound { .. } => ApiError::NotFound(err.to_string()),
            QueryError::Cancelled | QueryError::Timeout | QueryError::Store(_) => {
                ApiError::InternalError(err.to_string())
            }
        }
    }
}

/// Convert request mapping errors to API errors
impl From<MapError> for ApiError {
    fn from(err: MapError) -> Self {
        let details = err
            .violations()
            .into_iter()
            .map(|v| ValidationErrorDetail {
                field: v.field,
                message: v.message,
            })
            .collect();

        ApiError::ValidationError {
            message: err.to_string(),
            details,
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        ApiError::BadRequest(rejection.body_text())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_error_display() {
        let err = ApiError::BadRequest("Invalid input".to_string());
        assert_eq!(err.to_string(), "Bad request: Invalid input");

        let err = ApiError::NotFound("user with id 1 not found".to_string());
        assert_eq!(err.to_string(), "Not found: user with id 1 not found");
    }

    #[test]
    fn test_not_found_query_error() {
        let err: ApiError = QueryError::not_found("task", 3).into();
        assert!(matches!(err, ApiError::NotFound(ref msg) if msg == "task with id 3 not found"));
    }

    #[test]
    fn test_store_failures_are_internal() {
        for err in [
            QueryError::Timeout,
            QueryError::Cancelled,
            QueryError::Store(sqlx::Error::PoolTimedOut),
        ] {
            assert!(matches!(ApiError::from(err), ApiError::InternalError(_)));
        }
    }

    #[test]
    fn test_map_error_keeps_field() {
        let err: ApiError = MapError::InvalidDate {
            field: "start_date",
            value: "soon".to_string(),
        }
        .into();

        match err {
            ApiError::ValidationError { details, .. } => {
                assert_eq!(details.len(), 1);
                assert_eq!(details[0].field, "start_date");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_validation_response_body() {
        let response = ApiError::from(MapError::MissingCriterion { expected: "name, email" })
            .into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = body_json(response).await;
        assert_eq!(body["error"], "validation_error");
        assert!(body["message"]
            .as_str()
            .unwrap()
            .starts_with("missing query parameter"));
        assert_eq!(body["details"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn test_internal_error_hides_detail() {
        let response = ApiError::InternalError("connection refused".to_string()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

        let body = body_json(response).await;
        assert_eq!(body["error"], "internal_error");
        assert_eq!(body["message"], "An internal error occurred");
        assert!(body.get("details").is_none());
    }
}
