use sqlx::PgPool;
use uuid::Uuid;

use crate::auth;
use crate::error::ApiError;

use super::auth_service::UserProfile;

/// Partial profile update; absent fields keep their current values.
#[derive(Debug, Default)]
pub struct UpdateProfile {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub city_id: Option<i32>,
    pub password: Option<String>,
}

pub struct UserService {
    pool: PgPool,
}

impl UserService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        update: UpdateProfile,
    ) -> Result<UserProfile, ApiError> {
        let password_hash = match update.password.as_deref() {
            Some(password) => Some(auth::hash_password(password).map_err(|e| {
                tracing::error!("Password hashing error: {}", e);
                ApiError::internal_server_error("An error occurred while processing your request")
            })?),
            None => None,
        };

        let user = sqlx::query_as::<_, crate::database::models::user::User>(
            r#"
            UPDATE users SET
                name = COALESCE($2, name),
                phone = COALESCE($3, phone),
                city_id = COALESCE($4, city_id),
                password_hash = COALESCE($5, password_hash),
                updated_at = now()
            WHERE id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(update.name)
        .bind(update.phone)
        .bind(update.city_id)
        .bind(password_hash)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| ApiError::not_found("Account not found"))?;

        Ok(user.into())
    }

    /// Soft-delete the account. The row stays for order history; the email
    /// becomes reusable because lookups filter on deleted_at.
    pub async fn soft_delete(&self, user_id: Uuid) -> Result<(), ApiError> {
        let result = sqlx::query(
            "UPDATE users SET deleted_at = now(), updated_at = now() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(user_id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("Account not found"));
        }

        tracing::info!("Soft-deleted user account {}", user_id);
        Ok(())
    }
}
