use axum::extract::multipart::MultipartError;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use swapshop_auth::AuthError;
use tracing::error;
use utoipa::ToSchema;

use crate::media::MediaError;
use crate::services::ServiceError;

/// Body of every error response.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub detail: String,
}

#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn payload_too_large(message: impl Into<String>) -> Self {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE, message)
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            detail: self.message,
        });
        (self.status, body).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(error: AuthError) -> Self {
        match error {
            AuthError::UserExists => {
                Self::bad_request("username: A user with that username already exists.")
            }
            AuthError::InvalidCredentials | AuthError::Validation(_) => {
                Self::bad_request(error.to_string())
            }
            AuthError::InvalidToken => Self::unauthorized(error.to_string()),
            AuthError::Database(_) | AuthError::PasswordHash(_) => {
                error!(error = ?error, "auth error");
                Self::internal_server_error("Internal server error")
            }
        }
    }
}

impl From<ServiceError> for ApiError {
    fn from(error: ServiceError) -> Self {
        match error {
            ServiceError::NotFound(message) => Self::not_found(message),
            ServiceError::BadRequest(message) => Self::bad_request(message),
            ServiceError::Media(media) => media.into(),
            ServiceError::Database(_) | ServiceError::Internal(_) => {
                error!(error = ?error, "service error");
                Self::internal_server_error("Internal server error")
            }
        }
    }
}

impl From<MediaError> for ApiError {
    fn from(error: MediaError) -> Self {
        match error {
            MediaError::UnsupportedType(_) => Self::bad_request(error.to_string()),
            MediaError::TooLarge { .. } => Self::payload_too_large(error.to_string()),
            MediaError::Io(_) => {
                error!(error = ?error, "media error");
                Self::internal_server_error("Internal server error")
            }
        }
    }
}

impl From<MultipartError> for ApiError {
    fn from(error: MultipartError) -> Self {
        let status = error.status();
        if status == StatusCode::PAYLOAD_TOO_LARGE {
            Self::payload_too_large("Upload exceeds the size limit")
        } else {
            Self::new(status, error.body_text())
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        let status = match rejection.status() {
            StatusCode::PAYLOAD_TOO_LARGE => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        };
        Self::new(status, rejection.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        Self::bad_request(rejection.body_text())
    }
}
