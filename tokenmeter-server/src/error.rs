//! Error types for the tokenmeter server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use tokenmeter_core::CountError;

/// Errors that can occur in the tokenmeter server.
#[derive(Debug, thiserror::Error)]
pub enum ServerError {
    /// Counting failed, either because of the request or because nothing
    /// is loaded.
    #[error("{0}")]
    Count(#[from] CountError),

    /// An uploaded file is neither UTF-8 nor GBK.
    #[error("cannot read file, expected UTF-8 or GBK encoded text")]
    Decode,

    /// The request body exceeds the configured limit.
    #[error("request body too large")]
    PayloadTooLarge,

    /// Invalid request from client.
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ServerError {
    pub fn status(&self) -> StatusCode {
        match self {
            ServerError::Count(e) if e.is_input_error() => StatusCode::BAD_REQUEST,
            ServerError::Count(_) => StatusCode::SERVICE_UNAVAILABLE,
            ServerError::Decode | ServerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::PayloadTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ServerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Map an extractor rejection, keeping the body limit distinct
    pub fn rejected(status: StatusCode, message: String) -> Self {
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            ServerError::PayloadTooLarge
        } else {
            ServerError::InvalidRequest(message)
        }
    }

    /// Attach the debug flag, which adds a `detail` field to the body
    pub fn with_debug(self, debug: bool) -> ApiError {
        ApiError { error: self, debug }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        self.with_debug(false).into_response()
    }
}

/// A [`ServerError`] rendered with or without debug detail.
#[derive(Debug)]
pub struct ApiError {
    pub error: ServerError,
    pub debug: bool,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.error.status();
        if status.is_server_error() {
            tracing::error!(error = %self.error, code = status.as_u16(), "request failed");
        } else {
            tracing::debug!(error = %self.error, code = status.as_u16(), "request rejected");
        }

        let mut body = serde_json::json!({
            "success": false,
            "error": self.error.to_string(),
            "code": status.as_u16(),
        });
        if self.debug {
            body["detail"] = serde_json::Value::String(format!("{:?}", self.error));
        }

        (status, Json(body)).into_response()
    }
}

/// Result type alias for server operations.
pub type ServerResult<T> = Result<T, ApiError>;

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
