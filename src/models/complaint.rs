use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "complaints")]
pub struct Model {
    #[sea_orm(primary_key)]
    pub id: i32,
    pub title: String,
    pub category: String,
    pub description: String,
    pub room_number: String,
    pub location: String,
    /// Public path under /uploads, e.g. `/uploads/complaints/<file>`.
    pub image_path: Option<String>,
    pub status: String,
    /// Owner; immutable after creation.
    pub student_id: i32,
    pub created_at: DateTime,
    pub updated_at: DateTime,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::user::Entity",
        from = "Column::StudentId",
        to = "super::user::Column::Id",
        on_delete = "Cascade"
    )]
    Student,
}

impl Related<super::user::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Student.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

/// Complaint status. Transitions are forward-only: a complaint moves toward
/// `Resolved` and never back. Re-applying the current status is accepted so
/// an admin clicking the same button twice is not an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplaintStatus {
    Pending,
    InProgress,
    Resolved,
}

impl ComplaintStatus {
    pub const fn as_str(self) -> &'static str {
        match self {
            ComplaintStatus::Pending => "Pending",
            ComplaintStatus::InProgress => "In Progress",
            ComplaintStatus::Resolved => "Resolved",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Pending" => Some(ComplaintStatus::Pending),
            "In Progress" => Some(ComplaintStatus::InProgress),
            "Resolved" => Some(ComplaintStatus::Resolved),
            _ => None,
        }
    }

    pub fn can_transition(self, next: ComplaintStatus) -> bool {
        use ComplaintStatus::*;
        if self == next {
            return true;
        }
        matches!(
            (self, next),
            (Pending, InProgress) | (Pending, Resolved) | (InProgress, Resolved)
        )
    }
}

impl fmt::Display for ComplaintStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplaintCategory {
    Water,
    Electricity,
    Cleaning,
    Internet,
    Other,
}

impl ComplaintCategory {
    pub const fn as_str(self) -> &'static str {
        match self {
            ComplaintCategory::Water => "water",
            ComplaintCategory::Electricity => "electricity",
            ComplaintCategory::Cleaning => "cleaning",
            ComplaintCategory::Internet => "internet",
            ComplaintCategory::Other => "other",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "water" => Some(ComplaintCategory::Water),
            "electricity" => Some(ComplaintCategory::Electricity),
            "cleaning" => Some(ComplaintCategory::Cleaning),
            "internet" => Some(ComplaintCategory::Internet),
            "other" => Some(ComplaintCategory::Other),
            _ => None,
        }
    }
}

impl fmt::Display for ComplaintCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComplaintLocation {
    Hostel,
    Mess,
    Class,
    Ground,
}

impl ComplaintLocation {
    pub const fn as_str(self) -> &'static str {
        match self {
            ComplaintLocation::Hostel => "Hostel",
            ComplaintLocation::Mess => "Mess",
            ComplaintLocation::Class => "Class",
            ComplaintLocation::Ground => "Ground",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "Hostel" => Some(ComplaintLocation::Hostel),
            "Mess" => Some(ComplaintLocation::Mess),
            "Class" => Some(ComplaintLocation::Class),
            "Ground" => Some(ComplaintLocation::Ground),
            _ => None,
        }
    }
}

impl fmt::Display for ComplaintLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
