use crate::{
    error::{AppError, AppResult},
    models::{
        complaint, Complaint, ComplaintCategory, ComplaintLocation, ComplaintModel,
        ComplaintStatus, User, UserModel,
    },
    services::upload::{UploadConfig, UploadService},
};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder,
};

/// A validated complaint submission. Handlers parse and validate the raw
/// multipart fields before this is built.
#[derive(Debug)]
pub struct NewComplaint {
    pub title: String,
    pub category: ComplaintCategory,
    pub description: String,
    pub room_number: String,
    pub location: ComplaintLocation,
    pub image_path: Option<String>,
}

#[derive(Debug, Default)]
pub struct ActiveFilter {
    pub category: Option<ComplaintCategory>,
    pub room_number: Option<String>,
    pub status: Option<ComplaintStatus>,
}

pub struct ComplaintService {
    db: DatabaseConnection,
}

impl ComplaintService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Create a complaint owned by `student_id`, status Pending.
    pub async fn submit(&self, student_id: i32, new: NewComplaint) -> AppResult<ComplaintModel> {
        let now = chrono::Utc::now().naive_utc();
        let model = complaint::ActiveModel {
            title: sea_orm::ActiveValue::Set(new.title),
            category: sea_orm::ActiveValue::Set(new.category.as_str().to_string()),
            description: sea_orm::ActiveValue::Set(new.description),
            room_number: sea_orm::ActiveValue::Set(new.room_number),
            location: sea_orm::ActiveValue::Set(new.location.as_str().to_string()),
            image_path: sea_orm::ActiveValue::Set(new.image_path),
            status: sea_orm::ActiveValue::Set(ComplaintStatus::Pending.as_str().to_string()),
            student_id: sea_orm::ActiveValue::Set(student_id),
            created_at: sea_orm::ActiveValue::Set(now),
            updated_at: sea_orm::ActiveValue::Set(now),
            ..Default::default()
        };

        let saved = model.insert(&self.db).await?;
        Ok(saved)
    }

    /// A student's own complaints, newest first.
    pub async fn list_mine(&self, student_id: i32) -> AppResult<Vec<ComplaintModel>> {
        let complaints = Complaint::find()
            .filter(complaint::Column::StudentId.eq(student_id))
            .order_by_desc(complaint::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(complaints)
    }

    /// Unresolved complaints with optional filters, newest first, owner
    /// joined in. The not-Resolved clause always applies, so filtering on
    /// `status=Resolved` yields an empty list (history covers those).
    pub async fn list_active(
        &self,
        filter: ActiveFilter,
    ) -> AppResult<Vec<(ComplaintModel, Option<UserModel>)>> {
        let mut query = Complaint::find()
            .find_also_related(User)
            .filter(complaint::Column::Status.ne(ComplaintStatus::Resolved.as_str()));

        if let Some(category) = filter.category {
            query = query.filter(complaint::Column::Category.eq(category.as_str()));
        }
        if let Some(room) = filter.room_number {
            query = query.filter(complaint::Column::RoomNumber.eq(room));
        }
        if let Some(status) = filter.status {
            query = query.filter(complaint::Column::Status.eq(status.as_str()));
        }

        let complaints = query
            .order_by_desc(complaint::Column::CreatedAt)
            .all(&self.db)
            .await?;
        Ok(complaints)
    }

    /// Resolved complaints, most recently updated first, owner joined in.
    pub async fn list_history(&self) -> AppResult<Vec<(ComplaintModel, Option<UserModel>)>> {
        let complaints = Complaint::find()
            .find_also_related(User)
            .filter(complaint::Column::Status.eq(ComplaintStatus::Resolved.as_str()))
            .order_by_desc(complaint::Column::UpdatedAt)
            .all(&self.db)
            .await?;
        Ok(complaints)
    }

    /// Move a complaint to a new status, enforcing the transition table.
    pub async fn update_status(
        &self,
        complaint_id: i32,
        new_status: ComplaintStatus,
    ) -> AppResult<ComplaintModel> {
        let existing = Complaint::find_by_id(complaint_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        let current = ComplaintStatus::parse(&existing.status).ok_or_else(|| {
            AppError::Internal(anyhow::anyhow!("stored status '{}' unknown", existing.status))
        })?;

        if !current.can_transition(new_status) {
            return Err(AppError::InvalidState(format!(
                "Cannot move a complaint from {} to {}",
                current, new_status
            )));
        }

        let now = chrono::Utc::now().naive_utc();
        let mut active: complaint::ActiveModel = existing.into();
        active.status = sea_orm::ActiveValue::Set(new_status.as_str().to_string());
        active.updated_at = sea_orm::ActiveValue::Set(now);

        let updated = active.update(&self.db).await?;
        Ok(updated)
    }

    /// Delete a resolved complaint (and its photo). Unresolved complaints
    /// cannot be deleted.
    pub async fn delete(&self, complaint_id: i32, upload: &UploadConfig) -> AppResult<()> {
        let existing = Complaint::find_by_id(complaint_id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;

        if existing.status != ComplaintStatus::Resolved.as_str() {
            return Err(AppError::InvalidState(
                "Only resolved complaints can be deleted".to_string(),
            ));
        }

        self.purge(existing, upload).await
    }

    /// Remove a complaint record and its stored photo. The file removal is
    /// best-effort: a failure is logged and the record is still deleted.
    /// Shared by the delete route and the retention sweeper.
    pub async fn purge(&self, complaint: ComplaintModel, upload: &UploadConfig) -> AppResult<()> {
        if let Some(image_path) = &complaint.image_path {
            if let Err(e) = UploadService::delete_file(upload, image_path).await {
                tracing::warn!(
                    complaint_id = complaint.id,
                    image_path = %image_path,
                    "Failed to remove complaint image: {e}"
                );
            }
        }

        Complaint::delete_by_id(complaint.id).exec(&self.db).await?;
        Ok(())
    }
}
