//! Error types for gkam-intake
//!
//! `ValidationError` is the only failure a user ever sees. Unrecognized
//! input and enrichment failures are absorbed where they happen and never
//! reach this module.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Required data missing or partitioning impossible
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// A required item (`lead_item`, `name`, `alias`, `country`, `fame`) is unset
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// Partitioning requested with no lead item and no gallery items
    #[error("nothing to put in an album: no lead item and no gallery items")]
    EmptyAlbum,

    /// Group size cannot hold the requested layout
    #[error("invalid album size {cap}: {reason}")]
    InvalidCap { cap: usize, reason: &'static str },
}

impl ValidationError {
    /// Name of the missing field, if this is a missing-field error
    pub fn field(&self) -> Option<&'static str> {
        match self {
            ValidationError::MissingField(field) => Some(field),
            _ => None,
        }
    }
}

/// Service-level error
#[derive(Debug, Error)]
pub enum IntakeError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Session store or configuration failure
    #[error("Common error: {0}")]
    Common(#[from] gkam_common::Error),
}

pub type IntakeResult<T> = Result<T, IntakeError>;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Resource not found (404)
    #[error("Resource not found: {0}")]
    NotFound(String),

    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Required data missing (422)
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Internal server error (500)
    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<IntakeError> for ApiError {
    fn from(err: IntakeError) -> Self {
        match err {
            IntakeError::Validation(e) => ApiError::Validation(e),
            IntakeError::Common(gkam_common::Error::NotFound(msg)) => ApiError::NotFound(msg),
            IntakeError::Common(gkam_common::Error::InvalidInput(msg)) => {
                ApiError::BadRequest(msg)
            }
            IntakeError::Common(e) => ApiError::Internal(e.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_code, message, field) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg, None),
            ApiError::Validation(ref err) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "VALIDATION_ERROR",
                err.to_string(),
                err.field(),
            ),
            ApiError::Internal(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "INTERNAL_ERROR", msg, None)
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
                "field": field,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_validation_error_is_422_with_field() {
        let response = ApiError::from(ValidationError::MissingField("name")).into_response();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
        let body = body_json(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert_eq!(body["error"]["field"], "name");
        assert_eq!(body["error"]["message"], "missing required field: name");
    }

    #[tokio::test]
    async fn test_common_errors_map_to_status() {
        let not_found: ApiError =
            IntakeError::Common(gkam_common::Error::NotFound("session x".to_string())).into();
        assert_eq!(not_found.into_response().status(), StatusCode::NOT_FOUND);

        let internal: ApiError =
            IntakeError::Common(gkam_common::Error::Config("boom".to_string())).into();
        let response = internal.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body_json(response).await["error"]["field"], serde_json::Value::Null);
    }
}
