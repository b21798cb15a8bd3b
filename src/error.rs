use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};

use crate::{auth::AuthError, models::ErrorResponse, repository::RepositoryError};

/// ApiError
///
/// Every failure a request can end in. `IntoResponse` renders all of them with
/// the same `{success, error, message}` envelope.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("resource not found")]
    NotFound,

    #[error("method not allowed")]
    MethodNotAllowed,

    #[error("unprocessable: {0}")]
    Unprocessable(String),

    #[error("storage error: {0}")]
    Storage(#[from] RepositoryError),

    #[error(transparent)]
    Auth(#[from] AuthError),
}

impl ApiError {
    /// The status code and client-facing message for this failure.
    pub fn status_and_message(&self) -> (StatusCode, String) {
        match self {
            ApiError::NotFound => (StatusCode::NOT_FOUND, "Resource Not Found".to_string()),
            ApiError::MethodNotAllowed => {
                (StatusCode::METHOD_NOT_ALLOWED, "Method Not Allowed".to_string())
            }
            ApiError::Unprocessable(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "unprocessable".to_string())
            }
            ApiError::Storage(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error".to_string(),
            ),
            ApiError::Auth(e) => (e.status, e.description.clone()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            // Internal detail stays in the log.
            ApiError::Storage(e) => tracing::error!("storage error: {:?}", e),
            ApiError::Unprocessable(reason) => tracing::debug!("rejected request body: {}", reason),
            _ => {}
        }

        let (status, message) = self.status_and_message();
        let body = ErrorResponse {
            success: false,
            error: status.as_u16(),
            message,
        };

        (status, Json(body)).into_response()
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::Unprocessable(rejection.body_text())
    }
}

/// A path segment that does not parse (e.g. `/drinks/abc`) addresses no resource.
impl From<PathRejection> for ApiError {
    fn from(_: PathRejection) -> Self {
        ApiError::NotFound
    }
}
