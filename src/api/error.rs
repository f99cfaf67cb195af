//! HTTP error responses

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

/// Detail returned when interactions are read while the store is disabled
pub const STORE_NOT_CONNECTED: &str = "MongoDB not connected.";

/// Detail returned when voice input produced no text
pub const SPEECH_NOT_RECOGNIZED: &str = "Could not recognize speech.";

/// Detail returned for blank text input
pub const EMPTY_TEXT: &str = "Text must not be empty.";

/// API handler errors
#[derive(Debug)]
pub enum ApiError {
    BadRequest(&'static str),
    StoreUnavailable,
    Internal(crate::Error),
}

impl From<crate::Error> for ApiError {
    fn from(e: crate::Error) -> Self {
        match e {
            crate::Error::StoreUnavailable(_) => Self::StoreUnavailable,
            other => Self::Internal(other),
        }
    }
}

#[derive(Serialize)]
struct ErrorResponse {
    detail: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, detail) = match self {
            Self::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg.to_string()),
            Self::StoreUnavailable => (
                StatusCode::INTERNAL_SERVER_ERROR,
                STORE_NOT_CONNECTED.to_string(),
            ),
            Self::Internal(e) => {
                tracing::error!(error = %e, "request failed");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal Server Error".to_string(),
                )
            }
        };

        (status, Json(ErrorResponse { detail })).into_response()
    }
}
