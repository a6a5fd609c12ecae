use crate::{
    error::{AppError, AppResult},
    models::{normalize_roll, user, Role, User},
};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, TransactionTrait};
use std::collections::HashSet;

/// One valid spreadsheet row. The password column is checked for presence
/// when parsing but never stored: imported accounts stay inactive and
/// password-less until the student activates them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RosterRow {
    pub roll_number: String,
    pub name: Option<String>,
    pub room_number: String,
    pub mobile: Option<String>,
    pub gender: Option<String>,
}

/// Parse CSV spreadsheet data into roster rows.
///
/// Columns are located by header name (case/underscore/space-insensitive):
/// rollNumber, password and roomNumber are required columns; name, gender
/// and mobile are optional. Rows with a blank roll number, password or room
/// are skipped, as are duplicate roll numbers (first row wins).
pub fn parse_roster(data: &[u8]) -> AppResult<Vec<RosterRow>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(data);

    let headers = reader
        .headers()
        .map_err(|e| AppError::Validation(format!("Invalid spreadsheet: {}", e)))?
        .clone();

    let find_column = |names: &[&str]| -> Option<usize> {
        headers
            .iter()
            .position(|h| names.contains(&normalize_header(h).as_str()))
    };

    let roll_idx = find_column(&["rollnumber", "rollno", "roll"])
        .ok_or_else(|| AppError::Validation("Missing rollNumber column".to_string()))?;
    let password_idx = find_column(&["password", "initialpassword"])
        .ok_or_else(|| AppError::Validation("Missing password column".to_string()))?;
    let room_idx = find_column(&["roomnumber", "roomno", "room"])
        .ok_or_else(|| AppError::Validation("Missing roomNumber column".to_string()))?;
    let name_idx = find_column(&["name", "studentname"]);
    let gender_idx = find_column(&["gender"]);
    let mobile_idx = find_column(&["mobile", "phone", "mobilenumber"]);

    let mut rows = Vec::new();
    let mut seen = HashSet::new();

    for record in reader.records() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                tracing::warn!("Skipping malformed spreadsheet row: {}", e);
                continue;
            }
        };

        let cell = |idx: usize| record.get(idx).unwrap_or("").trim();
        let optional_cell = |idx: Option<usize>| -> Option<String> {
            idx.map(cell)
                .filter(|v| !v.is_empty())
                .map(|v| v.to_string())
        };

        let roll = cell(roll_idx);
        let password = cell(password_idx);
        let room = cell(room_idx);
        if roll.is_empty() || password.is_empty() || room.is_empty() {
            continue;
        }

        let roll = normalize_roll(roll);
        if !seen.insert(roll.clone()) {
            continue;
        }

        rows.push(RosterRow {
            roll_number: roll,
            name: optional_cell(name_idx),
            room_number: room.to_string(),
            mobile: optional_cell(mobile_idx),
            gender: optional_cell(gender_idx),
        });
    }

    Ok(rows)
}

fn normalize_header(header: &str) -> String {
    header
        .chars()
        .filter(|c| !matches!(c, '_' | ' ' | '-'))
        .collect::<String>()
        .to_ascii_lowercase()
}

pub struct RosterService {
    db: DatabaseConnection,
}

impl RosterService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Replace the whole student roster with the given rows.
    ///
    /// Validation happens before anything is touched: an import with zero
    /// valid rows fails here and leaves the existing roster in place. The
    /// delete-then-insert runs inside one transaction, so a failure mid-way
    /// rolls back to the previous roster.
    pub async fn import_students(&self, rows: Vec<RosterRow>) -> AppResult<u64> {
        if rows.is_empty() {
            return Err(AppError::Validation("No valid student rows".to_string()));
        }

        let now = chrono::Utc::now().naive_utc();
        let models: Vec<user::ActiveModel> = rows
            .into_iter()
            .map(|row| user::ActiveModel {
                roll_number: sea_orm::ActiveValue::Set(row.roll_number),
                name: sea_orm::ActiveValue::Set(row.name),
                room_number: sea_orm::ActiveValue::Set(Some(row.room_number)),
                mobile: sea_orm::ActiveValue::Set(row.mobile),
                gender: sea_orm::ActiveValue::Set(row.gender),
                password_hash: sea_orm::ActiveValue::Set(None),
                role: sea_orm::ActiveValue::Set(Role::Student.as_str().to_string()),
                is_active: sea_orm::ActiveValue::Set(false),
                created_at: sea_orm::ActiveValue::Set(now),
                updated_at: sea_orm::ActiveValue::Set(now),
                ..Default::default()
            })
            .collect();
        let count = models.len() as u64;

        let txn = self.db.begin().await?;
        User::delete_many()
            .filter(user::Column::Role.eq(Role::Student.as_str()))
            .exec(&txn)
            .await?;
        User::insert_many(models).exec(&txn).await?;
        txn.commit().await?;

        tracing::info!(count, "Student roster replaced");
        Ok(count)
    }
}
