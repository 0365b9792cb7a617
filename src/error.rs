use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use validator::ValidationErrors;

use crate::models::submission::validation_message;

// Every failure leaving the API is one of these; the wire shape is always
// {"status": "error", "message": "..."}
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{}", validation_message(.0))]
    ValidationFailed(ValidationErrors),

    #[error("{0}")]
    MalformedPayload(String),

    #[error("An event image is required")]
    MissingImage,

    #[error("Failed to save event: {0}")]
    PersistenceFailed(String),

    #[error("Event not found")]
    NotFound,

    #[error("An unexpected error occurred")]
    Unexpected(#[from] anyhow::Error),
}

impl AppError {
    pub const fn status_code(&self) -> StatusCode {
        match self {
            Self::ValidationFailed(_) | Self::MalformedPayload(_) | Self::MissingImage => {
                StatusCode::BAD_REQUEST
            }
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::PersistenceFailed(_) | Self::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // The catch-all keeps its detail in the log, not in the response
        if let Self::Unexpected(ref err) = self {
            tracing::error!("unexpected error: {:?}", err);
        }
        let status = self.status_code();
        let body = Json(json!({
            "status": "error",
            "message": self.to_string(),
        }));
        (status, body).into_response()
    }
}
