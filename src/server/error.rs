use axum::extract::rejection::PathRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;

/// Errors returned by HTTP handlers, rendered as `{ "error", "code" }` JSON bodies
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Prompt not found: {0}")]
    PromptNotFound(u32),

    #[error("Route not found: {0}")]
    RouteNotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            AppError::PromptNotFound(_) => (StatusCode::NOT_FOUND, "NOT_FOUND"),
            AppError::RouteNotFound(_) => (StatusCode::NOT_FOUND, "ROUTE_NOT_FOUND"),
            AppError::BadRequest(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
        };

        let body = json!({
            "error": self.to_string(),
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}
