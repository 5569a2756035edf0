use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use encore_core::CoreError;
use encore_order::{BookingError, FeedError};
use serde_json::json;

#[derive(Debug)]
pub enum AppError {
    AuthenticationError(String),
    AuthorizationError(String),
    ValidationError(String),
    NotFoundError(String),
    ConflictError(String),
    InternalServerError(String),
    /// Extractor rejection, keeping axum's status (400, 415, 422).
    RequestRejected(StatusCode, String),
    Anyhow(anyhow::Error),
}

impl AppError {
    /// Library errors arrive wrapped in anyhow; map the known ones to a status.
    fn classify(err: anyhow::Error) -> Self {
        if let Some(core) = err.downcast_ref::<CoreError>() {
            return match core {
                CoreError::ValidationError(msg) => AppError::ValidationError(msg.clone()),
                CoreError::IdentityError(msg) => AppError::AuthenticationError(msg.clone()),
                CoreError::NotFound(msg) => AppError::NotFoundError(msg.clone()),
                CoreError::Conflict(msg) => AppError::ConflictError(msg.clone()),
                CoreError::InternalError(msg) => AppError::InternalServerError(msg.clone()),
            };
        }
        if let Some(booking) = err.downcast_ref::<BookingError>() {
            return match booking {
                BookingError::EmptySelection | BookingError::ShowMismatch { .. } => {
                    AppError::ValidationError(booking.to_string())
                }
                BookingError::SeatsUnavailable(_) => AppError::ConflictError(booking.to_string()),
                BookingError::Persistence(msg) => AppError::InternalServerError(msg.clone()),
            };
        }
        if let Some(rejection) = err.downcast_ref::<JsonRejection>() {
            return AppError::RequestRejected(rejection.status(), rejection.body_text());
        }
        if let Some(rejection) = err.downcast_ref::<QueryRejection>() {
            return AppError::RequestRejected(rejection.status(), rejection.body_text());
        }
        if let Some(rejection) = err.downcast_ref::<PathRejection>() {
            return AppError::RequestRejected(rejection.status(), rejection.body_text());
        }
        if let Some(feed) = err.downcast_ref::<FeedError>() {
            return match feed {
                FeedError::Invalid(msg) => AppError::ValidationError(msg.clone()),
                FeedError::Store(msg) => AppError::InternalServerError(msg.clone()),
            };
        }
        AppError::Anyhow(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::AuthorizationError(msg) => (StatusCode::FORBIDDEN, msg),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            AppError::ConflictError(msg) => (StatusCode::CONFLICT, msg),
            AppError::RequestRejected(status, msg) => (status, msg),
            AppError::InternalServerError(msg) => {
                tracing::error!("Internal Server Error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            },
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            },
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        Self::classify(err.into())
    }
}
