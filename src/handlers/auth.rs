use serde::Deserialize;
use utoipa::ToSchema;

use crate::database::manager::DatabaseManager;
use crate::middleware::account::CurrentUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::auth_service::{AuthService, UserProfile, UserSession};
use crate::validation::{FieldErrors, Validate, ValidatedJson, ValidationErrors};

pub const AUTH_TAG: &str = "auth";

#[derive(Debug, Deserialize, ToSchema)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub phone: Option<String>,
    pub city_id: Option<i32>,
}

impl Validate for SignupRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = FieldErrors::new();
        errors.require("email", &self.email);
        errors.email("email", &self.email);
        errors.min_len("password", &self.password, 8);
        errors.max_len("password", &self.password, 72);
        errors.require("name", &self.name);
        errors.max_len("name", &self.name, 50);
        if let Some(phone) = self.phone.as_deref() {
            errors.max_len("phone", phone, 20);
        }
        errors.into_result()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl Validate for LoginRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = FieldErrors::new();
        errors.require("email", &self.email);
        errors.require("password", &self.password);
        errors.into_result()
    }
}

/// Create a student account and return a session token.
#[utoipa::path(
    post,
    path = "/api/auth/signup",
    tag = AUTH_TAG,
    request_body = SignupRequest,
    responses(
        (status = 201, description = "Account created", body = UserSession),
        (status = 400, description = "Validation failed"),
        (status = 409, description = "Email already registered")
    ),
)]
pub async fn signup(
    ValidatedJson(req): ValidatedJson<SignupRequest>,
) -> ApiResult<UserSession> {
    let pool = DatabaseManager::pool().await?;
    let session = AuthService::new(pool)
        .signup(
            &req.email,
            &req.password,
            &req.name,
            req.phone.as_deref(),
            req.city_id,
        )
        .await?;
    Ok(ApiResponse::created(session))
}

/// Log in with email and password.
#[utoipa::path(
    post,
    path = "/api/auth/login",
    tag = AUTH_TAG,
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Logged in", body = UserSession),
        (status = 401, description = "Invalid credentials"),
        (status = 403, description = "Account disabled")
    ),
)]
pub async fn login(ValidatedJson(req): ValidatedJson<LoginRequest>) -> ApiResult<UserSession> {
    let pool = DatabaseManager::pool().await?;
    let session = AuthService::new(pool).login(&req.email, &req.password).await?;
    Ok(ApiResponse::success(session))
}

/// Current account behind the bearer token.
#[utoipa::path(
    get,
    path = "/api/auth/me",
    tag = AUTH_TAG,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Current account", body = UserProfile),
        (status = 401, description = "Missing or invalid token")
    ),
)]
pub async fn me(CurrentUser(user): CurrentUser) -> ApiResult<UserProfile> {
    Ok(ApiResponse::success(user.into()))
}
