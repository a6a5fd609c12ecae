use crate::error::AppResult;
use crate::models::{normalize_roll, user, Role, User};
use crate::utils::hash_password;
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};
use std::env;

#[derive(Debug, Clone)]
pub struct BootstrapAdminConfig {
    pub roll_number: String,
    pub password: String,
}

impl BootstrapAdminConfig {
    pub fn from_env() -> Option<Self> {
        let enabled = env::var("BOOTSTRAP_ADMIN_ENABLED")
            .ok()
            .map(|v| v.trim().to_ascii_lowercase())
            .map(|v| matches!(v.as_str(), "1" | "true" | "yes" | "y" | "on"))
            .unwrap_or(false);

        if !enabled {
            return None;
        }

        Some(Self {
            roll_number: env::var("BOOTSTRAP_ADMIN_ROLL").ok()?,
            password: env::var("BOOTSTRAP_ADMIN_PASSWORD").ok()?,
        })
    }
}

/// Explicit admin provisioning, opted into via environment:
/// - if any admin already exists: do nothing (credentials are never reset)
/// - else if the configured roll exists: promote it to admin and activate
/// - else create a new, active admin with the configured password
pub async fn ensure_bootstrap_admin(db: &DatabaseConnection) -> AppResult<()> {
    let Some(cfg) = BootstrapAdminConfig::from_env() else {
        return Ok(());
    };

    let admin_exists = User::find()
        .filter(user::Column::Role.eq(Role::Admin.as_str()))
        .one(db)
        .await?
        .is_some();
    if admin_exists {
        return Ok(());
    }

    let roll = normalize_roll(&cfg.roll_number);
    let now = chrono::Utc::now().naive_utc();

    let existing = User::find()
        .filter(user::Column::RollNumber.eq(roll.clone()))
        .one(db)
        .await?;

    if let Some(existing_user) = existing {
        let mut active: user::ActiveModel = existing_user.into();
        active.role = sea_orm::ActiveValue::Set(Role::Admin.as_str().to_string());
        active.is_active = sea_orm::ActiveValue::Set(true);
        active.updated_at = sea_orm::ActiveValue::Set(now);
        active.update(db).await?;
        tracing::info!(roll_number = %roll, "Existing user promoted to admin");
        return Ok(());
    }

    let password_hash = hash_password(&cfg.password)?;

    let new_admin = user::ActiveModel {
        roll_number: sea_orm::ActiveValue::Set(roll.clone()),
        name: sea_orm::ActiveValue::Set(None),
        room_number: sea_orm::ActiveValue::Set(None),
        mobile: sea_orm::ActiveValue::Set(None),
        gender: sea_orm::ActiveValue::Set(None),
        password_hash: sea_orm::ActiveValue::Set(Some(password_hash)),
        role: sea_orm::ActiveValue::Set(Role::Admin.as_str().to_string()),
        is_active: sea_orm::ActiveValue::Set(true),
        created_at: sea_orm::ActiveValue::Set(now),
        updated_at: sea_orm::ActiveValue::Set(now),
        ..Default::default()
    };

    new_admin.insert(db).await?;
    tracing::info!(roll_number = %roll, "Bootstrap admin created");
    Ok(())
}
