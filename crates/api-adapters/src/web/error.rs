//! Domain-error → HTTP response mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use domains::AppError;
use serde_json::json;

/// Wrapper so handler `?` can surface domain errors as structured JSON.
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self.0 {
            AppError::Validation(_) => (StatusCode::BAD_REQUEST, "invalid request"),
            AppError::NotFound(_, _) => (StatusCode::NOT_FOUND, "not found"),
            // the admin dashboard expects 404 when the target sits on the
            // wrong side of the active/disabled divide
            AppError::Conflict(_) => (StatusCode::NOT_FOUND, "not found"),
            AppError::Unauthorized(_) => (StatusCode::UNAUTHORIZED, "unauthorized"),
            AppError::Upstream(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "internal service error")
            }
        };
        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }
        let body = Json(json!({
            "message": message,
            "error": self.0.to_string(),
        }));
        (status, body).into_response()
    }
}
