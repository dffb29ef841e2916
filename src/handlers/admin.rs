use axum::extract::{Path, Query};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::course::Course;
use crate::database::models::order::Order;
use crate::database::models::teacher::{Teacher, TeacherStatus};
use crate::middleware::account::CurrentAdmin;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::admin_service::{AdminService, TeacherApplication, UserAccountRow};
use crate::services::auth_service::{AdminSession, AuthService};
use crate::types::{Page, PageQuery};
use crate::validation::{FieldErrors, Validate, ValidatedJson, ValidationErrors};

pub const ADMIN_TAG: &str = "admin";

#[derive(Debug, Deserialize, ToSchema)]
pub struct AdminLoginRequest {
    pub email: String,
    pub password: String,
}

impl Validate for AdminLoginRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = FieldErrors::new();
        errors.require("email", &self.email);
        errors.require("password", &self.password);
        errors.into_result()
    }
}

/// Status filter plus pagination for the moderation queue.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct TeacherListQuery {
    #[param(inline)]
    pub status: Option<TeacherStatus>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Log in to the moderation console.
#[utoipa::path(
    post,
    path = "/api/admin/login",
    tag = ADMIN_TAG,
    request_body = AdminLoginRequest,
    responses(
        (status = 200, description = "Logged in", body = AdminSession),
        (status = 401, description = "Invalid credentials")
    ),
)]
pub async fn login(
    ValidatedJson(req): ValidatedJson<AdminLoginRequest>,
) -> ApiResult<AdminSession> {
    let pool = DatabaseManager::pool().await?;
    let session = AuthService::new(pool)
        .admin_login(&req.email, &req.password)
        .await?;
    Ok(ApiResponse::success(session))
}

/// Teacher applications, optionally filtered by status.
#[utoipa::path(
    get,
    path = "/api/admin/teachers",
    tag = ADMIN_TAG,
    security(("bearer_auth" = [])),
    params(TeacherListQuery),
    responses((status = 200, description = "Applications", body = Page<TeacherApplication>)),
)]
pub async fn list_teachers(
    _admin: CurrentAdmin,
    Query(query): Query<TeacherListQuery>,
) -> ApiResult<Page<TeacherApplication>> {
    let page = PageQuery {
        page: query.page,
        per_page: query.per_page,
    };
    let pool = DatabaseManager::pool().await?;
    let applications = AdminService::new(pool)
        .list_teachers(query.status, &page)
        .await?;
    Ok(ApiResponse::success(applications))
}

/// Approve a pending teacher application.
#[utoipa::path(
    post,
    path = "/api/admin/teachers/{id}/approve",
    tag = ADMIN_TAG,
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Teacher id")),
    responses(
        (status = 200, description = "Teacher approved", body = Teacher),
        (status = 409, description = "Application is not pending")
    ),
)]
pub async fn approve_teacher(
    _admin: CurrentAdmin,
    Path(teacher_id): Path<Uuid>,
) -> ApiResult<Teacher> {
    let pool = DatabaseManager::pool().await?;
    let teacher = AdminService::new(pool).approve_teacher(teacher_id).await?;
    Ok(ApiResponse::success(teacher))
}

/// Reject a pending teacher application. The applicant may re-apply.
#[utoipa::path(
    post,
    path = "/api/admin/teachers/{id}/reject",
    tag = ADMIN_TAG,
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Teacher id")),
    responses(
        (status = 200, description = "Teacher rejected", body = Teacher),
        (status = 409, description = "Application is not pending")
    ),
)]
pub async fn reject_teacher(
    _admin: CurrentAdmin,
    Path(teacher_id): Path<Uuid>,
) -> ApiResult<Teacher> {
    let pool = DatabaseManager::pool().await?;
    let teacher = AdminService::new(pool).reject_teacher(teacher_id).await?;
    Ok(ApiResponse::success(teacher))
}

/// All user accounts, including disabled and soft-deleted ones.
#[utoipa::path(
    get,
    path = "/api/admin/users",
    tag = ADMIN_TAG,
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses((status = 200, description = "User accounts", body = Page<UserAccountRow>)),
)]
pub async fn list_users(
    _admin: CurrentAdmin,
    Query(page): Query<PageQuery>,
) -> ApiResult<Page<UserAccountRow>> {
    let pool = DatabaseManager::pool().await?;
    let users = AdminService::new(pool).list_users(&page).await?;
    Ok(ApiResponse::success(users))
}

/// Re-enable a disabled account.
#[utoipa::path(
    post,
    path = "/api/admin/users/{id}/activate",
    tag = ADMIN_TAG,
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 204, description = "Account activated"),
        (status = 404, description = "User not found")
    ),
)]
pub async fn activate_user(
    _admin: CurrentAdmin,
    Path(user_id): Path<Uuid>,
) -> ApiResult<()> {
    let pool = DatabaseManager::pool().await?;
    AdminService::new(pool).set_user_active(user_id, true).await?;
    Ok(ApiResponse::<()>::no_content())
}

/// Disable an account; its tokens stop working at the next request.
#[utoipa::path(
    post,
    path = "/api/admin/users/{id}/deactivate",
    tag = ADMIN_TAG,
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "User id")),
    responses(
        (status = 204, description = "Account deactivated"),
        (status = 404, description = "User not found")
    ),
)]
pub async fn deactivate_user(
    _admin: CurrentAdmin,
    Path(user_id): Path<Uuid>,
) -> ApiResult<()> {
    let pool = DatabaseManager::pool().await?;
    AdminService::new(pool).set_user_active(user_id, false).await?;
    Ok(ApiResponse::<()>::no_content())
}

/// Every course, inactive and soft-deleted rows included.
#[utoipa::path(
    get,
    path = "/api/admin/courses",
    tag = ADMIN_TAG,
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses((status = 200, description = "Courses", body = Page<Course>)),
)]
pub async fn list_courses(
    _admin: CurrentAdmin,
    Query(page): Query<PageQuery>,
) -> ApiResult<Page<Course>> {
    let pool = DatabaseManager::pool().await?;
    let courses = AdminService::new(pool).list_courses(&page).await?;
    Ok(ApiResponse::success(courses))
}

/// Restore a course to the public catalog.
#[utoipa::path(
    post,
    path = "/api/admin/courses/{id}/activate",
    tag = ADMIN_TAG,
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 204, description = "Course activated"),
        (status = 404, description = "Course not found")
    ),
)]
pub async fn activate_course(
    _admin: CurrentAdmin,
    Path(course_id): Path<Uuid>,
) -> ApiResult<()> {
    let pool = DatabaseManager::pool().await?;
    AdminService::new(pool).set_course_active(course_id, true).await?;
    Ok(ApiResponse::<()>::no_content())
}

/// Pull a course from the public catalog.
#[utoipa::path(
    post,
    path = "/api/admin/courses/{id}/deactivate",
    tag = ADMIN_TAG,
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 204, description = "Course deactivated"),
        (status = 404, description = "Course not found")
    ),
)]
pub async fn deactivate_course(
    _admin: CurrentAdmin,
    Path(course_id): Path<Uuid>,
) -> ApiResult<()> {
    let pool = DatabaseManager::pool().await?;
    AdminService::new(pool).set_course_active(course_id, false).await?;
    Ok(ApiResponse::<()>::no_content())
}

/// All orders across users.
#[utoipa::path(
    get,
    path = "/api/admin/orders",
    tag = ADMIN_TAG,
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses((status = 200, description = "Orders", body = Page<Order>)),
)]
pub async fn list_orders(
    _admin: CurrentAdmin,
    Query(page): Query<PageQuery>,
) -> ApiResult<Page<Order>> {
    let pool = DatabaseManager::pool().await?;
    let orders = AdminService::new(pool).list_orders(&page).await?;
    Ok(ApiResponse::success(orders))
}

/// Hide an abusive review from course pages.
#[utoipa::path(
    post,
    path = "/api/admin/reviews/{id}/hide",
    tag = ADMIN_TAG,
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Review id")),
    responses(
        (status = 204, description = "Review hidden"),
        (status = 404, description = "Review not found")
    ),
)]
pub async fn hide_review(
    _admin: CurrentAdmin,
    Path(review_id): Path<Uuid>,
) -> ApiResult<()> {
    let pool = DatabaseManager::pool().await?;
    AdminService::new(pool).set_review_hidden(review_id, true).await?;
    Ok(ApiResponse::<()>::no_content())
}

/// Restore a hidden review.
#[utoipa::path(
    post,
    path = "/api/admin/reviews/{id}/unhide",
    tag = ADMIN_TAG,
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Review id")),
    responses(
        (status = 204, description = "Review restored"),
        (status = 404, description = "Review not found")
    ),
)]
pub async fn unhide_review(
    _admin: CurrentAdmin,
    Path(review_id): Path<Uuid>,
) -> ApiResult<()> {
    let pool = DatabaseManager::pool().await?;
    AdminService::new(pool).set_review_hidden(review_id, false).await?;
    Ok(ApiResponse::<()>::no_content())
}
