use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use docent_core::CoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("failed to bind {0}: {1}")]
    Bind(String, std::io::Error),
    #[error("server error: {0}")]
    Server(String),
}

/// Handler error rendered as `{"error": message}` with a matching status code.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),
    #[error(transparent)]
    Core(#[from] CoreError),
}

impl ApiError {
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Core(e) => match e {
                CoreError::NotFound(_) => StatusCode::NOT_FOUND,
                CoreError::Duplicate(_) => StatusCode::CONFLICT,
                CoreError::InvalidName(_) | CoreError::EmptyQuestion => StatusCode::BAD_REQUEST,
                CoreError::UnsupportedFormat(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                CoreError::QuotaExceeded { .. } => StatusCode::TOO_MANY_REQUESTS,
                CoreError::Llm(_) => StatusCode::BAD_GATEWAY,
                CoreError::Document(_) | CoreError::Index(_) | CoreError::Io(_) => {
                    StatusCode::INTERNAL_SERVER_ERROR
                }
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("request failed: {self}");
        } else {
            tracing::debug!(%status, "request rejected: {self}");
        }
        (
            status,
            Json(serde_json::json!({ "error": self.to_string() })),
        )
            .into_response()
    }
}
