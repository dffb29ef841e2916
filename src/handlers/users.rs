use serde::Deserialize;
use utoipa::ToSchema;

use crate::database::manager::DatabaseManager;
use crate::middleware::account::CurrentUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::auth_service::UserProfile;
use crate::services::user_service::{UpdateProfile, UserService};
use crate::validation::{FieldErrors, Validate, ValidatedJson, ValidationErrors};

pub const USERS_TAG: &str = "users";

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateMeRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
    pub city_id: Option<i32>,
    pub password: Option<String>,
}

impl Validate for UpdateMeRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = FieldErrors::new();
        if let Some(name) = self.name.as_deref() {
            errors.require("name", name);
            errors.max_len("name", name, 50);
        }
        if let Some(phone) = self.phone.as_deref() {
            errors.max_len("phone", phone, 20);
        }
        if let Some(password) = self.password.as_deref() {
            errors.min_len("password", password, 8);
            errors.max_len("password", password, 72);
        }
        errors.into_result()
    }
}

/// Partial profile update; absent fields keep their current values.
#[utoipa::path(
    patch,
    path = "/api/users/me",
    tag = USERS_TAG,
    security(("bearer_auth" = [])),
    request_body = UpdateMeRequest,
    responses(
        (status = 200, description = "Updated profile", body = UserProfile),
        (status = 400, description = "Validation failed"),
        (status = 401, description = "Missing or invalid token")
    ),
)]
pub async fn update_me(
    CurrentUser(user): CurrentUser,
    ValidatedJson(req): ValidatedJson<UpdateMeRequest>,
) -> ApiResult<UserProfile> {
    let pool = DatabaseManager::pool().await?;
    let profile = UserService::new(pool)
        .update_profile(
            user.id,
            UpdateProfile {
                name: req.name,
                phone: req.phone,
                city_id: req.city_id,
                password: req.password,
            },
        )
        .await?;
    Ok(ApiResponse::success(profile))
}

/// Soft-delete the current account.
#[utoipa::path(
    delete,
    path = "/api/users/me",
    tag = USERS_TAG,
    security(("bearer_auth" = [])),
    responses(
        (status = 204, description = "Account deleted"),
        (status = 401, description = "Missing or invalid token")
    ),
)]
pub async fn delete_me(CurrentUser(user): CurrentUser) -> ApiResult<()> {
    let pool = DatabaseManager::pool().await?;
    UserService::new(pool).soft_delete(user.id).await?;
    Ok(ApiResponse::<()>::no_content())
}
