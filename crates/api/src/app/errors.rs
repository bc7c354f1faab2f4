//! The single error responder.
//!
//! Every failure on the HTTP path ends up as an [`ApiError`], which renders
//! `{ "success": false, "error": "<message>" }` with the mapped status.

use std::sync::Arc;

use axum::{
    extract::{
        Request, State,
        multipart::MultipartError,
        rejection::JsonRejection,
    },
    http::StatusCode,
    middleware::Next,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tracing::error;

use devcamper_core::{DomainError, SERVER_ERROR};

use crate::config::AppConfig;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
    /// Underlying cause, logged but never rendered.
    pub detail: Option<String>,
}

/// Attached to error responses so the logging layer can see the cause.
#[derive(Debug, Clone)]
pub struct ErrorDetail(pub String);

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            detail: None,
        }
    }

    pub fn internal(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: SERVER_ERROR.to_string(),
            detail: Some(detail.into()),
        }
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        let status = StatusCode::from_u16(err.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        Self {
            status,
            message: err.to_string(),
            detail: Some(format!("{err:?}")),
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: rejection.body_text(),
            detail: Some(format!("{rejection:?}")),
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(err: MultipartError) -> Self {
        Self::bad_request(err.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let mut response = (
            self.status,
            axum::Json(json!({
                "success": false,
                "error": self.message,
            })),
        )
            .into_response();
        let detail = self.detail.unwrap_or(self.message);
        response.extensions_mut().insert(ErrorDetail(detail));
        response
    }
}

/// Answer for a panic caught by the panic boundary.
pub fn panic_response(_panic: Box<dyn std::any::Any + Send + 'static>) -> Response {
    ApiError::internal("handler panicked").into_response()
}

/// Logs error responses: all of them in development, only 5xx in production.
pub async fn log_errors(State(config): State<Arc<AppConfig>>, req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let path = req.uri().path().to_string();
    let response = next.run(req).await;

    let status = response.status();
    let loggable = status.is_server_error() || (config.environment.is_development() && status.is_client_error());
    if loggable {
        let detail = response
            .extensions()
            .get::<ErrorDetail>()
            .map(|d| d.0.as_str())
            .unwrap_or("");
        error!(%method, %path, status = status.as_u16(), detail, "request failed");
    }
    response
}
