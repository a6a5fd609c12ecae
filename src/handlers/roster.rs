use crate::error::{AppError, AppResult};
use crate::middleware::auth::{require_admin, AuthUser};
use crate::services::roster::{parse_roster, RosterService};
use axum::{extract::Multipart, response::IntoResponse, Extension, Json};
use sea_orm::DatabaseConnection;
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
pub struct ImportResponse {
    pub message: String,
    /// Number of students in the new roster
    pub count: u64,
}

/// Replace the student roster from an uploaded spreadsheet (admin only).
/// POST /api/upload-students (multipart form: one CSV file field)
#[utoipa::path(
    post,
    path = "/api/upload-students",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Roster replaced", body = ImportResponse),
        (status = 400, description = "No file or no valid rows", body = AppError),
        (status = 403, description = "Admin only", body = AppError),
    ),
    tag = "roster"
)]
pub async fn upload_students(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    require_admin(&auth_user)?;

    let field = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read upload: {}", e)))?
        .ok_or_else(|| AppError::Validation("No spreadsheet provided".to_string()))?;

    let data = field
        .bytes()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read file data: {}", e)))?;

    let rows = parse_roster(&data)?;

    let service = RosterService::new(db);
    let count = service.import_students(rows).await?;

    Ok(Json(ImportResponse {
        message: format!("Imported {} students", count),
        count,
    }))
}
