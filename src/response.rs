use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::entries::EntryError;

pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

#[derive(Debug, Serialize)]
pub struct MessageResponse {
    pub message: String,
}

#[derive(Debug, Clone)]
pub struct AppError {
    status: StatusCode,
    message: String,
    is_operational: bool,
}

impl AppError {
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::operational(StatusCode::NOT_FOUND, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::operational(StatusCode::BAD_REQUEST, message)
    }

    /// A failure whose detail stays in the server log.
    pub fn internal(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: message.into(),
            is_operational: false,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
    }

    fn operational(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            is_operational: true,
        }
    }
}

impl From<EntryError> for AppError {
    fn from(err: EntryError) -> Self {
        match err {
            EntryError::Validation(message) => {
                tracing::debug!(%message, "rejected entry input");
                Self::bad_request(message)
            }
            EntryError::DuplicateKey(word) => {
                tracing::debug!(%word, "duplicate word rejected");
                Self::bad_request("Word already exists")
            }
            EntryError::NotFound(_) => Self::not_found("Word not found"),
            EntryError::MissingTerm => Self::bad_request("Search term is required"),
            err @ (EntryError::Corrupt { .. }
            | EntryError::Encode { .. }
            | EntryError::Interrupted(_)
            | EntryError::Store(_)) => {
                tracing::error!(error = %err, "entry store failure");
                Self::internal(err.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = if self.is_operational {
            self.message
        } else {
            INTERNAL_ERROR_MESSAGE.to_string()
        };

        (self.status, Json(MessageResponse { message })).into_response()
    }
}

pub fn json_error(status: StatusCode, message: impl Into<String>) -> AppError {
    AppError {
        status,
        message: message.into(),
        is_operational: true,
    }
}
