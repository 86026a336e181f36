//! Mapping of crate errors and extractor rejections onto HTTP responses.

use crate::errors::Error;
use axum::{
    Json,
    extract::rejection::{JsonRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

impl Error {
    fn status(&self) -> StatusCode {
        match self {
            Self::Validation { .. } => StatusCode::BAD_REQUEST,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Transaction { .. } | Self::Database(_) | Self::Config { .. } | Self::Io(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = self.status();
        if self.is_client_error() {
            debug!("Rejected request: {}", self);
        } else {
            error!("Request failed: {}", self);
        }
        let message = match self {
            Self::Validation { message } | Self::Conflict { message } | Self::NotFound { message } => {
                message
            }
            Self::Transaction { .. } => {
                "The operation failed and was rolled back; it can be retried.".to_string()
            }
            _ => "Internal server error".to_string(),
        };

        (status, Json(serde_json::json!({ "error": message }))).into_response()
    }
}

impl From<JsonRejection> for Error {
    fn from(rejection: JsonRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}

impl From<QueryRejection> for Error {
    fn from(rejection: QueryRejection) -> Self {
        Self::validation(rejection.body_text())
    }
}
