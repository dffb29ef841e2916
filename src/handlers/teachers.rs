use axum::extract::Path;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::teacher::{Teacher, TeacherAvailableSlot};
use crate::middleware::account::CurrentUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::teacher_service::{
    TeacherPublicProfile, TeacherService, UpdateTeacherProfile,
};
use crate::validation::{parse_time, FieldErrors, Validate, ValidatedJson, ValidationErrors};

pub const TEACHERS_TAG: &str = "teachers";

#[derive(Debug, Deserialize, ToSchema)]
pub struct ApplyTeacherRequest {
    pub headline: String,
    #[serde(default)]
    pub introduction: String,
    #[serde(default)]
    pub career_years: i16,
}

impl Validate for ApplyTeacherRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = FieldErrors::new();
        errors.require("headline", &self.headline);
        errors.max_len("headline", &self.headline, 100);
        errors.max_len("introduction", &self.introduction, 2000);
        errors.range_i64("career_years", self.career_years as i64, 0, 50);
        errors.into_result()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateTeacherRequest {
    pub headline: Option<String>,
    pub introduction: Option<String>,
    pub career_years: Option<i16>,
}

impl Validate for UpdateTeacherRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = FieldErrors::new();
        if let Some(headline) = self.headline.as_deref() {
            errors.require("headline", headline);
            errors.max_len("headline", headline, 100);
        }
        if let Some(introduction) = self.introduction.as_deref() {
            errors.max_len("introduction", introduction, 2000);
        }
        if let Some(years) = self.career_years {
            errors.range_i64("career_years", years as i64, 0, 50);
        }
        errors.into_result()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct AddSlotRequest {
    pub weekday: i16,
    #[schema(example = "09:00")]
    pub start_time: String,
    #[schema(example = "11:00")]
    pub end_time: String,
}

impl Validate for AddSlotRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = FieldErrors::new();
        errors.range_i64("weekday", self.weekday as i64, 0, 6);
        errors.time("start_time", &self.start_time);
        errors.time("end_time", &self.end_time);
        if let (Some(start), Some(end)) = (parse_time(&self.start_time), parse_time(&self.end_time))
        {
            if end <= start {
                errors.push("end_time", "Must be after start_time");
            }
        }
        errors.into_result()
    }
}

/// Apply as a teacher; the profile starts in pending status.
#[utoipa::path(
    post,
    path = "/api/teachers",
    tag = TEACHERS_TAG,
    security(("bearer_auth" = [])),
    request_body = ApplyTeacherRequest,
    responses(
        (status = 201, description = "Application created", body = Teacher),
        (status = 409, description = "Profile already exists")
    ),
)]
pub async fn apply(
    CurrentUser(user): CurrentUser,
    ValidatedJson(req): ValidatedJson<ApplyTeacherRequest>,
) -> ApiResult<Teacher> {
    let pool = DatabaseManager::pool().await?;
    let teacher = TeacherService::new(pool)
        .apply(user.id, &req.headline, &req.introduction, req.career_years)
        .await?;
    Ok(ApiResponse::created(teacher))
}

/// Own teacher profile, including moderation status.
#[utoipa::path(
    get,
    path = "/api/teachers/me",
    tag = TEACHERS_TAG,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own profile", body = Teacher),
        (status = 404, description = "No teacher profile")
    ),
)]
pub async fn me(CurrentUser(user): CurrentUser) -> ApiResult<Teacher> {
    let pool = DatabaseManager::pool().await?;
    let teacher = TeacherService::new(pool).profile_by_user(user.id).await?;
    Ok(ApiResponse::success(teacher))
}

/// Partial teacher profile update.
#[utoipa::path(
    patch,
    path = "/api/teachers/me",
    tag = TEACHERS_TAG,
    security(("bearer_auth" = [])),
    request_body = UpdateTeacherRequest,
    responses(
        (status = 200, description = "Updated profile", body = Teacher),
        (status = 404, description = "No teacher profile")
    ),
)]
pub async fn update_me(
    CurrentUser(user): CurrentUser,
    ValidatedJson(req): ValidatedJson<UpdateTeacherRequest>,
) -> ApiResult<Teacher> {
    let pool = DatabaseManager::pool().await?;
    let teacher = TeacherService::new(pool)
        .update_profile(
            user.id,
            UpdateTeacherProfile {
                headline: req.headline,
                introduction: req.introduction,
                career_years: req.career_years,
            },
        )
        .await?;
    Ok(ApiResponse::success(teacher))
}

/// Own weekly availability.
#[utoipa::path(
    get,
    path = "/api/teachers/me/slots",
    tag = TEACHERS_TAG,
    security(("bearer_auth" = [])),
    responses(
        (status = 200, description = "Own slots", body = [TeacherAvailableSlot]),
        (status = 404, description = "No teacher profile")
    ),
)]
pub async fn my_slots(
    CurrentUser(user): CurrentUser,
) -> ApiResult<Vec<TeacherAvailableSlot>> {
    let pool = DatabaseManager::pool().await?;
    let slots = TeacherService::new(pool).my_slots(user.id).await?;
    Ok(ApiResponse::success(slots))
}

/// Add an availability slot (max 10 per weekday, 70 per week, no overlap).
#[utoipa::path(
    post,
    path = "/api/teachers/me/slots",
    tag = TEACHERS_TAG,
    security(("bearer_auth" = [])),
    request_body = AddSlotRequest,
    responses(
        (status = 201, description = "Slot added", body = TeacherAvailableSlot),
        (status = 409, description = "Cap reached or overlap")
    ),
)]
pub async fn add_slot(
    CurrentUser(user): CurrentUser,
    ValidatedJson(req): ValidatedJson<AddSlotRequest>,
) -> ApiResult<TeacherAvailableSlot> {
    // Validation already proved both times parse
    let start = parse_time(&req.start_time)
        .ok_or_else(|| crate::error::ApiError::bad_request("Invalid start_time"))?;
    let end = parse_time(&req.end_time)
        .ok_or_else(|| crate::error::ApiError::bad_request("Invalid end_time"))?;

    let pool = DatabaseManager::pool().await?;
    let slot = TeacherService::new(pool)
        .add_slot(user.id, req.weekday, start, end)
        .await?;
    Ok(ApiResponse::created(slot))
}

/// Remove one of the caller's availability slots.
#[utoipa::path(
    delete,
    path = "/api/teachers/me/slots/{id}",
    tag = TEACHERS_TAG,
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Slot id")),
    responses(
        (status = 204, description = "Slot removed"),
        (status = 404, description = "Slot not found")
    ),
)]
pub async fn remove_slot(
    CurrentUser(user): CurrentUser,
    Path(slot_id): Path<Uuid>,
) -> ApiResult<()> {
    let pool = DatabaseManager::pool().await?;
    TeacherService::new(pool).remove_slot(user.id, slot_id).await?;
    Ok(ApiResponse::<()>::no_content())
}

/// Public teacher card; only approved profiles are visible.
#[utoipa::path(
    get,
    path = "/api/teachers/{id}",
    tag = TEACHERS_TAG,
    params(("id" = Uuid, Path, description = "Teacher id")),
    responses(
        (status = 200, description = "Teacher profile", body = TeacherPublicProfile),
        (status = 404, description = "Teacher not found or not approved")
    ),
)]
pub async fn public_profile(Path(teacher_id): Path<Uuid>) -> ApiResult<TeacherPublicProfile> {
    let pool = DatabaseManager::pool().await?;
    let profile = TeacherService::new(pool).public_profile(teacher_id).await?;
    Ok(ApiResponse::success(profile))
}

/// Weekly availability of an approved teacher, for the booking UI.
#[utoipa::path(
    get,
    path = "/api/teachers/{id}/slots",
    tag = TEACHERS_TAG,
    params(("id" = Uuid, Path, description = "Teacher id")),
    responses(
        (status = 200, description = "Weekly slots", body = [TeacherAvailableSlot]),
        (status = 404, description = "Teacher not found or not approved")
    ),
)]
pub async fn public_slots(Path(teacher_id): Path<Uuid>) -> ApiResult<Vec<TeacherAvailableSlot>> {
    let pool = DatabaseManager::pool().await?;
    let slots = TeacherService::new(pool).public_slots(teacher_id).await?;
    Ok(ApiResponse::success(slots))
}
