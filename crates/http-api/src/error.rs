use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use campuscard_common::error::CampusCardError;
use thiserror::Error;

/// Errors surfaced by API handlers before a response body starts.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Malformed query parameters.
    #[error("bad request: {0}")]
    BadRequest(String),

    /// A failure from the export pipeline.
    #[error(transparent)]
    Export(#[from] CampusCardError),

    /// Worker thread or channel failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Export(CampusCardError::NotFound { .. }) => StatusCode::NOT_FOUND,
            Self::Export(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(%status, "Request failed: {self}");
        }
        let message = match &self {
            Self::BadRequest(msg) => msg.clone(),
            Self::Export(err) => err.to_string(),
            Self::Internal(_) => "Internal server error".to_owned(),
        };
        (status, axum::Json(serde_json::json!({ "error": message }))).into_response()
    }
}
