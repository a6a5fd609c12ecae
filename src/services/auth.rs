use crate::{
    error::{AppError, AppResult},
    models::{normalize_roll, user, Role, User, UserModel},
    utils::{encode_token, hash_password, verify_password},
};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

pub struct AuthService {
    db: DatabaseConnection,
}

impl AuthService {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Log a user in by roll number and password.
    /// Returns the signed token and the caller's role.
    ///
    /// Failure order matters to the front-end: an unknown roll is reported
    /// before activation state, and an inactive account is reported (with
    /// the activation hint) before the password is ever checked.
    pub async fn login(&self, roll_number: &str, password: &str) -> AppResult<(String, Role)> {
        let user = self
            .find_by_roll(roll_number)
            .await?
            .ok_or(AppError::UserNotFound)?;

        if !user.is_active {
            return Err(AppError::NotActivated);
        }

        let hash = user
            .password_hash
            .as_deref()
            .ok_or(AppError::InvalidCredentials)?;
        if !verify_password(password, hash)? {
            return Err(AppError::InvalidCredentials);
        }

        let role = Role::parse(&user.role)
            .ok_or_else(|| AppError::Internal(anyhow::anyhow!("unknown role '{}'", user.role)))?;
        let token = encode_token(user.id, role)?;

        Ok((token, role))
    }

    /// One-time activation: set the first password on an inactive account.
    /// Any other state (unknown roll, already active) is reported uniformly.
    pub async fn activate(&self, roll_number: &str, password: &str) -> AppResult<()> {
        let user = self
            .find_by_roll(roll_number)
            .await?
            .filter(|u| !u.is_active)
            .ok_or(AppError::InvalidOrAlreadyActivated)?;

        let now = chrono::Utc::now().naive_utc();
        let mut active: user::ActiveModel = user.into();
        active.password_hash = sea_orm::ActiveValue::Set(Some(hash_password(password)?));
        active.is_active = sea_orm::ActiveValue::Set(true);
        active.updated_at = sea_orm::ActiveValue::Set(now);
        active.update(&self.db).await?;

        Ok(())
    }

    async fn find_by_roll(&self, roll_number: &str) -> AppResult<Option<UserModel>> {
        let roll = normalize_roll(roll_number);
        let user = User::find()
            .filter(user::Column::RollNumber.eq(roll))
            .one(&self.db)
            .await?;
        Ok(user)
    }
}
