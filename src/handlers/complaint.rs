use crate::error::{AppError, AppResult};
use crate::middleware::auth::{require_admin, require_student, AuthUser};
use crate::models::{ComplaintCategory, ComplaintLocation, ComplaintModel, ComplaintStatus, UserModel};
use crate::response::MessageResponse;
use crate::services::complaint::{ActiveFilter, ComplaintService, NewComplaint};
use crate::services::upload::{UploadConfig, UploadService};
use axum::{
    extract::{Multipart, Path, Query},
    response::IntoResponse,
    Extension, Json,
};
use sea_orm::DatabaseConnection;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintResponse {
    pub id: i32,
    pub title: String,
    pub category: String,
    pub description: String,
    pub room_number: String,
    pub location: String,
    pub image_path: Option<String>,
    pub status: String,
    pub student_id: i32,
    pub created_at: String,
    pub updated_at: String,
}

impl From<ComplaintModel> for ComplaintResponse {
    fn from(c: ComplaintModel) -> Self {
        Self {
            id: c.id,
            title: c.title,
            category: c.category,
            description: c.description,
            room_number: c.room_number,
            location: c.location,
            image_path: c.image_path,
            status: c.status,
            student_id: c.student_id,
            created_at: c.created_at.and_utc().to_rfc3339(),
            updated_at: c.updated_at.and_utc().to_rfc3339(),
        }
    }
}

/// Owner identity joined into the admin listings, mirroring what the
/// admin UI reads from `studentId.rollNumber` / `studentId.roomNumber`.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentRef {
    pub id: i32,
    pub roll_number: String,
    pub room_number: Option<String>,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ComplaintWithStudentResponse {
    pub id: i32,
    pub title: String,
    pub category: String,
    pub description: String,
    pub room_number: String,
    pub location: String,
    pub image_path: Option<String>,
    pub status: String,
    pub student_id: Option<StudentRef>,
    pub created_at: String,
    pub updated_at: String,
}

impl From<(ComplaintModel, Option<UserModel>)> for ComplaintWithStudentResponse {
    fn from((c, student): (ComplaintModel, Option<UserModel>)) -> Self {
        Self {
            id: c.id,
            title: c.title,
            category: c.category,
            description: c.description,
            room_number: c.room_number,
            location: c.location,
            image_path: c.image_path,
            status: c.status,
            student_id: student.map(|s| StudentRef {
                id: s.id,
                roll_number: s.roll_number,
                room_number: s.room_number,
            }),
            created_at: c.created_at.and_utc().to_rfc3339(),
            updated_at: c.updated_at.and_utc().to_rfc3339(),
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ActiveComplaintsQuery {
    /// Filter by category
    pub category: Option<String>,
    /// Filter by room number
    pub room_number: Option<String>,
    /// Filter by status
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateStatusRequest {
    /// New status (Pending, In Progress, Resolved)
    pub status: String,
}

fn required_field(value: Option<String>, name: &str) -> AppResult<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v.trim().to_string()),
        _ => Err(AppError::Validation(format!(
            "Missing required field: {}",
            name
        ))),
    }
}

/// Submit a complaint (student only).
/// POST /api/complaints (multipart form: text fields + optional "image")
#[utoipa::path(
    post,
    path = "/api/complaints",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Complaint submitted", body = MessageResponse),
        (status = 400, description = "Missing or invalid field", body = AppError),
        (status = 403, description = "Students only", body = AppError),
    ),
    tag = "complaints"
)]
pub async fn submit_complaint(
    Extension(db): Extension<DatabaseConnection>,
    Extension(config): Extension<UploadConfig>,
    auth_user: AuthUser,
    mut multipart: Multipart,
) -> AppResult<impl IntoResponse> {
    let student_id = require_student(&auth_user)?;

    let mut title = None;
    let mut category = None;
    let mut description = None;
    let mut room_number = None;
    let mut location = None;
    let mut image: Option<(Vec<u8>, String)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Failed to read form: {}", e)))?
    {
        let name = field.name().unwrap_or("").to_string();
        match name.as_str() {
            "title" | "category" | "description" | "roomNumber" | "location" => {
                let value = field
                    .text()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read form: {}", e)))?;
                match name.as_str() {
                    "title" => title = Some(value),
                    "category" => category = Some(value),
                    "description" => description = Some(value),
                    "roomNumber" => room_number = Some(value),
                    "location" => location = Some(value),
                    _ => unreachable!(),
                }
            }
            "image" => {
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Failed to read file data: {}", e)))?;
                if !data.is_empty() {
                    image = Some((data.to_vec(), content_type));
                }
            }
            _ => {}
        }
    }

    let title = required_field(title, "title")?;
    let description = required_field(description, "description")?;
    let room_number = required_field(room_number, "roomNumber")?;
    let category = required_field(category, "category")?;
    let category = ComplaintCategory::parse(&category)
        .ok_or_else(|| AppError::Validation(format!("Invalid category: {}", category)))?;
    let location = required_field(location, "location")?;
    let location = ComplaintLocation::parse(&location)
        .ok_or_else(|| AppError::Validation(format!("Invalid location: {}", location)))?;

    let image_path = match image {
        Some((data, content_type)) => {
            Some(UploadService::save_file(&config, &data, &content_type).await?)
        }
        None => None,
    };

    let service = ComplaintService::new(db);
    service
        .submit(
            student_id,
            NewComplaint {
                title,
                category,
                description,
                room_number,
                location,
                image_path,
            },
        )
        .await?;

    Ok(MessageResponse::new("Complaint submitted successfully"))
}

/// A student's own complaints, newest first.
#[utoipa::path(
    get,
    path = "/api/my-complaints",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Caller's complaints", body = [ComplaintResponse]),
        (status = 403, description = "Students only", body = AppError),
    ),
    tag = "complaints"
)]
pub async fn my_complaints(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    let student_id = require_student(&auth_user)?;

    let service = ComplaintService::new(db);
    let complaints = service.list_mine(student_id).await?;
    let items: Vec<ComplaintResponse> = complaints.into_iter().map(Into::into).collect();

    Ok(Json(items))
}

/// Unresolved complaints with optional filters (admin only).
#[utoipa::path(
    get,
    path = "/api/complaints",
    security(("jwt_token" = [])),
    params(
        ("category" = Option<String>, Query, description = "Filter by category"),
        ("roomNumber" = Option<String>, Query, description = "Filter by room number"),
        ("status" = Option<String>, Query, description = "Filter by status"),
    ),
    responses(
        (status = 200, description = "Active complaints", body = [ComplaintWithStudentResponse]),
        (status = 403, description = "Admin only", body = AppError),
    ),
    tag = "complaints"
)]
pub async fn list_active(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Query(params): Query<ActiveComplaintsQuery>,
) -> AppResult<impl IntoResponse> {
    require_admin(&auth_user)?;

    let category = params
        .category
        .filter(|v| !v.is_empty())
        .map(|v| {
            ComplaintCategory::parse(&v)
                .ok_or_else(|| AppError::Validation(format!("Invalid category: {}", v)))
        })
        .transpose()?;
    let status = params
        .status
        .filter(|v| !v.is_empty())
        .map(|v| {
            ComplaintStatus::parse(&v)
                .ok_or_else(|| AppError::Validation(format!("Invalid status: {}", v)))
        })
        .transpose()?;

    let filter = ActiveFilter {
        category,
        room_number: params.room_number.filter(|v| !v.is_empty()),
        status,
    };

    let service = ComplaintService::new(db);
    let complaints = service.list_active(filter).await?;
    let items: Vec<ComplaintWithStudentResponse> =
        complaints.into_iter().map(Into::into).collect();

    Ok(Json(items))
}

/// Resolved complaint history, most recently updated first (admin only).
#[utoipa::path(
    get,
    path = "/api/complaints/history",
    security(("jwt_token" = [])),
    responses(
        (status = 200, description = "Resolved complaints", body = [ComplaintWithStudentResponse]),
        (status = 403, description = "Admin only", body = AppError),
    ),
    tag = "complaints"
)]
pub async fn list_history(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
) -> AppResult<impl IntoResponse> {
    require_admin(&auth_user)?;

    let service = ComplaintService::new(db);
    let complaints = service.list_history().await?;
    let items: Vec<ComplaintWithStudentResponse> =
        complaints.into_iter().map(Into::into).collect();

    Ok(Json(items))
}

/// Update a complaint's status (admin only).
#[utoipa::path(
    put,
    path = "/api/complaints/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Complaint ID")),
    request_body = UpdateStatusRequest,
    responses(
        (status = 200, description = "Status updated", body = MessageResponse),
        (status = 400, description = "Unknown status or illegal transition", body = AppError),
        (status = 403, description = "Admin only", body = AppError),
        (status = 404, description = "Complaint not found", body = AppError),
    ),
    tag = "complaints"
)]
pub async fn update_status(
    Extension(db): Extension<DatabaseConnection>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
    Json(payload): Json<UpdateStatusRequest>,
) -> AppResult<impl IntoResponse> {
    require_admin(&auth_user)?;

    let new_status = ComplaintStatus::parse(&payload.status)
        .ok_or_else(|| AppError::Validation(format!("Invalid status: {}", payload.status)))?;

    let service = ComplaintService::new(db);
    service.update_status(id, new_status).await?;

    Ok(MessageResponse::new("Status updated"))
}

/// Delete a resolved complaint and its photo (admin only).
#[utoipa::path(
    delete,
    path = "/api/complaints/{id}",
    security(("jwt_token" = [])),
    params(("id" = i32, Path, description = "Complaint ID")),
    responses(
        (status = 200, description = "Complaint deleted", body = MessageResponse),
        (status = 400, description = "Complaint is not resolved", body = AppError),
        (status = 403, description = "Admin only", body = AppError),
        (status = 404, description = "Complaint not found", body = AppError),
    ),
    tag = "complaints"
)]
pub async fn delete_complaint(
    Extension(db): Extension<DatabaseConnection>,
    Extension(config): Extension<UploadConfig>,
    auth_user: AuthUser,
    Path(id): Path<i32>,
) -> AppResult<impl IntoResponse> {
    require_admin(&auth_user)?;

    let service = ComplaintService::new(db);
    service.delete(id, &config).await?;

    Ok(MessageResponse::new("Complaint deleted successfully"))
}
