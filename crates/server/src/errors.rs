use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use common::types::{ErrorBody, MessageBody};
use service::errors::ServiceError;
use thiserror::Error;
use tracing::error;

pub const ITEM_NOT_FOUND: &str = "Item not found";
pub const ID_REQUIRED: &str = "ID is required";

/// Handler failure rendered as JSON.
///
/// 500s carry `{ "error": ... }`; the modelled 400/404 cases carry `{ "message": ... }`.
#[derive(Debug)]
pub struct JsonApiError {
    status: StatusCode,
    text: String,
    detail: Option<String>,
}

impl JsonApiError {
    pub fn new(status: StatusCode, text: impl Into<String>, detail: Option<String>) -> Self {
        Self { status, text: text.into(), detail }
    }

    pub fn internal(text: impl Into<String>, detail: impl ToString) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, text, Some(detail.to_string()))
    }

    pub fn not_found() -> Self { Self::new(StatusCode::NOT_FOUND, ITEM_NOT_FOUND, None) }

    pub fn missing_id() -> Self { Self::new(StatusCode::BAD_REQUEST, ID_REQUIRED, None) }

    /// Map a service failure; anything not modelled becomes a 500 with `context` as the message.
    pub fn from_service(err: ServiceError, context: &'static str) -> Self {
        match err {
            ServiceError::NotFound(_) => Self::not_found(),
            ServiceError::Validation(_) => Self::missing_id(),
            other => Self::internal(context, other),
        }
    }

    pub fn status(&self) -> StatusCode { self.status }
}

impl IntoResponse for JsonApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            error!(status = %self.status, error = %self.text, detail = self.detail.as_deref().unwrap_or(""), "request failed");
            (self.status, Json(ErrorBody { error: self.text })).into_response()
        } else {
            (self.status, Json(MessageBody::new(self.text))).into_response()
        }
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error("storage init failed: {0}")]
    Storage(String),
}
