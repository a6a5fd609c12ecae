use crate::error::{AppError, AppResult};
use crate::response::MessageResponse;
use crate::services::auth::AuthService;
use axum::{response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    /// Roll number (case-insensitive)
    #[validate(length(min = 1))]
    pub roll_number: String,
    /// Password
    #[validate(length(min = 1))]
    pub password: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LoginResponse {
    /// Signed bearer token, valid for one hour
    pub token: String,
    /// Caller role (student or admin)
    pub role: String,
}

#[derive(Debug, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActivateRequest {
    /// Roll number (case-insensitive)
    #[validate(length(min = 1))]
    pub roll_number: String,
    /// New password (min 6 characters)
    #[validate(length(min = 6))]
    pub password: String,
}

#[utoipa::path(
    post,
    path = "/api/login",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 400, description = "Unknown user or invalid credentials", body = AppError),
        (status = 403, description = "Account not activated (needsActivation flag set)", body = AppError),
    ),
    tag = "auth"
)]
pub async fn login(
    Extension(db): Extension<DatabaseConnection>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let service = AuthService::new(db);
    let (token, role) = service.login(&payload.roll_number, &payload.password).await?;

    Ok(Json(LoginResponse {
        token,
        role: role.as_str().to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/api/activate",
    request_body = ActivateRequest,
    responses(
        (status = 200, description = "Account activated", body = MessageResponse),
        (status = 400, description = "Invalid or already activated", body = AppError),
    ),
    tag = "auth"
)]
pub async fn activate(
    Extension(db): Extension<DatabaseConnection>,
    Json(payload): Json<ActivateRequest>,
) -> AppResult<impl IntoResponse> {
    payload
        .validate()
        .map_err(|e| AppError::Validation(e.to_string()))?;

    let service = AuthService::new(db);
    service
        .activate(&payload.roll_number, &payload.password)
        .await?;

    Ok(MessageResponse::new(
        "Account activated successfully. Now login.",
    ))
}
