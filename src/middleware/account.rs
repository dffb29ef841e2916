use axum::async_trait;
use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use crate::auth::TokenScope;
use crate::database::manager::DatabaseManager;
use crate::database::models::admin::AdminUser;
use crate::database::models::user::User;
use crate::error::ApiError;

use super::auth::authenticate;

/// The authenticated user's row, loaded once per request after JWT decode.
/// Extracting this on a handler is what makes the route require a user token.
#[derive(Clone, Debug)]
pub struct CurrentUser(pub User);

/// The authenticated admin's row; requires an admin-scoped token.
#[derive(Clone, Debug)]
pub struct CurrentAdmin(pub AdminUser);

#[async_trait]
impl<S> FromRequestParts<S> for CurrentUser
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = authenticate(&parts.headers, TokenScope::User)?;

        let pool = DatabaseManager::pool().await?;

        // Soft-deleted accounts authenticate like unknown ones
        let user = sqlx::query_as::<_, User>(
            "SELECT * FROM users WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(claims.sub)
        .fetch_optional(&pool)
        .await
        .map_err(|e| {
            tracing::error!("Database error loading user {}: {}", claims.sub, e);
            ApiError::internal_server_error("Failed to load account")
        })?
        .ok_or_else(|| {
            tracing::warn!("Token subject {} not found or deleted", claims.sub);
            ApiError::unauthorized("Account not found")
        })?;

        if !user.is_active {
            tracing::warn!("Rejected deactivated account {}", user.id);
            return Err(ApiError::business(
                403,
                "ACCOUNT_DISABLED",
                "This account has been disabled",
            ));
        }

        Ok(CurrentUser(user))
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for CurrentAdmin
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let claims = authenticate(&parts.headers, TokenScope::Admin)?;

        let pool = DatabaseManager::pool().await?;

        let admin = sqlx::query_as::<_, AdminUser>("SELECT * FROM admin_users WHERE id = $1")
            .bind(claims.sub)
            .fetch_optional(&pool)
            .await
            .map_err(|e| {
                tracing::error!("Database error loading admin {}: {}", claims.sub, e);
                ApiError::internal_server_error("Failed to load account")
            })?
            .ok_or_else(|| {
                tracing::warn!("Admin token subject {} not found", claims.sub);
                ApiError::unauthorized("Account not found")
            })?;

        if !admin.is_active {
            tracing::warn!("Rejected deactivated admin {}", admin.id);
            return Err(ApiError::business(
                403,
                "ACCOUNT_DISABLED",
                "This account has been disabled",
            ));
        }

        Ok(CurrentAdmin(admin))
    }
}
