use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::app::moderation::ModerationError;
use crate::app::users::UserError;

#[derive(Debug)]
pub struct AppError {
    status: StatusCode,
    message: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: message.into(),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::CONFLICT,
            message: message.into(),
        }
    }

    pub fn bad_gateway(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: message.into(),
        }
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            message: message.into(),
        }
    }
}

impl From<ModerationError> for AppError {
    fn from(err: ModerationError) -> Self {
        match err {
            ModerationError::NotFound(_) => Self::not_found(err.to_string()),
            ModerationError::Validation(message) => Self::bad_request(message),
            ModerationError::Hidden(_)
            | ModerationError::AlreadyApproved(_)
            | ModerationError::SubmissionInFlight(_)
            | ModerationError::DraftNotOpen(_)
            | ModerationError::Declined => Self::conflict(err.to_string()),
            ModerationError::Write { .. } => Self::bad_gateway(err.to_string()),
            ModerationError::Closed => Self::service_unavailable(err.to_string()),
        }
    }
}

impl From<UserError> for AppError {
    fn from(err: UserError) -> Self {
        match err {
            UserError::NotFound(_) => Self::not_found(err.to_string()),
            UserError::Validation(message) => Self::bad_request(message),
            UserError::Declined => Self::conflict(err.to_string()),
            UserError::Store { ref source, .. } => {
                tracing::error!(error = ?source, "user store failure");
                Self::bad_gateway(err.to_string())
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = Json(ErrorResponse {
            error: self.message,
        });
        (self.status, body).into_response()
    }
}
