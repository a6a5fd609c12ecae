use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    #[error("No token provided")]
    Unauthorized,

    #[error("Invalid token")]
    InvalidToken,

    #[error("{0}")]
    Forbidden(&'static str),

    #[error("Resource not found")]
    NotFound,

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("{0}")]
    InvalidState(String),

    #[error("User not found")]
    UserNotFound,

    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Account not activated. Set password on first login.")]
    NotActivated,

    #[error("Invalid or already activated")]
    InvalidOrAlreadyActivated,

    #[error("Payload too large")]
    PayloadTooLarge,

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

#[derive(serde::Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub message: String,
}

impl utoipa::ToSchema for AppError {
    fn name() -> std::borrow::Cow<'static, str> {
        "ErrorResponse".into()
    }
}

impl utoipa::PartialSchema for AppError {
    fn schema() -> utoipa::openapi::RefOr<utoipa::openapi::schema::Schema> {
        ErrorResponse::schema()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let needs_activation = matches!(&self, AppError::NotActivated);

        let (status, message) = match self {
            AppError::Database(e) => {
                tracing::error!("Database error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
            }
            AppError::Unauthorized => (StatusCode::UNAUTHORIZED, "No token provided".to_string()),
            AppError::InvalidToken => (StatusCode::UNAUTHORIZED, "Invalid token".to_string()),
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, msg.to_string()),
            AppError::NotFound => (StatusCode::NOT_FOUND, "Resource not found".to_string()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::InvalidState(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::UserNotFound => (StatusCode::BAD_REQUEST, "User not found".to_string()),
            AppError::InvalidCredentials => {
                (StatusCode::BAD_REQUEST, "Invalid credentials".to_string())
            }
            AppError::NotActivated => (
                StatusCode::FORBIDDEN,
                "Account not activated. Set password on first login.".to_string(),
            ),
            AppError::InvalidOrAlreadyActivated => (
                StatusCode::BAD_REQUEST,
                "Invalid or already activated".to_string(),
            ),
            AppError::PayloadTooLarge => {
                (StatusCode::PAYLOAD_TOO_LARGE, "File too large".to_string())
            }
            AppError::Internal(e) => {
                tracing::error!("Internal error: {:?}", e);
                (StatusCode::INTERNAL_SERVER_ERROR, "Server error".to_string())
            }
        };

        let mut body = json!({ "message": message });
        if needs_activation {
            body["needsActivation"] = json!(true);
        }

        (status, Json(body)).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
