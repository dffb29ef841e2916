use axum::extract::{Path, Query};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::course::{Course, CoursePriceOption};
use crate::middleware::account::CurrentUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::course_service::{
    CourseDetail, CourseSearch, CourseService, CourseSummary, UpdateCourse,
};
use crate::services::review_service::{ReviewPublic, ReviewService};
use crate::types::{Page, PageQuery};
use crate::validation::{FieldErrors, Validate, ValidatedJson, ValidationErrors};

pub const COURSES_TAG: &str = "courses";

/// Search filters plus pagination, kept flat because axum's `Query` cannot
/// deserialize flattened structs with typed fields.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct CourseListQuery {
    pub sub_category_id: Option<i32>,
    pub city_id: Option<i32>,
    pub teacher_id: Option<Uuid>,
    pub online: Option<bool>,
    pub keyword: Option<String>,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

impl CourseListQuery {
    fn split(self) -> (CourseSearch, PageQuery) {
        (
            CourseSearch {
                sub_category_id: self.sub_category_id,
                city_id: self.city_id,
                teacher_id: self.teacher_id,
                online: self.online,
                keyword: self.keyword,
            },
            PageQuery {
                page: self.page,
                per_page: self.per_page,
            },
        )
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCourseRequest {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub sub_category_id: i32,
    pub city_id: Option<i32>,
    #[serde(default)]
    pub is_online: bool,
}

impl Validate for CreateCourseRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = FieldErrors::new();
        errors.require("title", &self.title);
        errors.max_len("title", &self.title, 100);
        errors.max_len("description", &self.description, 5000);
        if !self.is_online && self.city_id.is_none() {
            errors.push("city_id", "Required for offline courses");
        }
        errors.into_result()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCourseRequest {
    pub title: Option<String>,
    pub description: Option<String>,
    pub sub_category_id: Option<i32>,
    /// Present-and-null clears the city for online-only courses.
    #[serde(default, deserialize_with = "deserialize_some")]
    pub city_id: Option<Option<i32>>,
    pub is_online: Option<bool>,
}

/// Distinguishes an absent field from an explicit null.
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: serde::Deserialize<'de>,
    D: serde::Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

impl Validate for UpdateCourseRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = FieldErrors::new();
        if let Some(title) = self.title.as_deref() {
            errors.require("title", title);
            errors.max_len("title", title, 100);
        }
        if let Some(description) = self.description.as_deref() {
            errors.max_len("description", description, 5000);
        }
        errors.into_result()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct PriceOptionRequest {
    /// Price in the smallest currency unit.
    pub price: i64,
    /// Number of sessions the option buys.
    pub quantity: i32,
}

impl Validate for PriceOptionRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = FieldErrors::new();
        errors.range_i64("price", self.price, 0, 100_000_000);
        errors.range_i64("quantity", self.quantity as i64, 1, 100);
        errors.into_result()
    }
}

/// Search active courses of approved teachers.
#[utoipa::path(
    get,
    path = "/api/courses",
    tag = COURSES_TAG,
    params(CourseListQuery),
    responses((status = 200, description = "Matching courses", body = Page<CourseSummary>)),
)]
pub async fn search(Query(query): Query<CourseListQuery>) -> ApiResult<Page<CourseSummary>> {
    let (search, page) = query.split();
    let pool = DatabaseManager::pool().await?;
    let results = CourseService::new(pool).search(&search, &page).await?;
    Ok(ApiResponse::success(results))
}

/// Full course page: price options, teacher card, rating aggregate.
#[utoipa::path(
    get,
    path = "/api/courses/{id}",
    tag = COURSES_TAG,
    params(("id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 200, description = "Course detail", body = CourseDetail),
        (status = 404, description = "Course not found or inactive")
    ),
)]
pub async fn detail(Path(course_id): Path<Uuid>) -> ApiResult<CourseDetail> {
    let pool = DatabaseManager::pool().await?;
    let detail = CourseService::new(pool).detail(course_id).await?;
    Ok(ApiResponse::success(detail))
}

/// Create a course; approved teachers only.
#[utoipa::path(
    post,
    path = "/api/courses",
    tag = COURSES_TAG,
    security(("bearer_auth" = [])),
    request_body = CreateCourseRequest,
    responses(
        (status = 201, description = "Course created", body = Course),
        (status = 403, description = "Not an approved teacher")
    ),
)]
pub async fn create(
    CurrentUser(user): CurrentUser,
    ValidatedJson(req): ValidatedJson<CreateCourseRequest>,
) -> ApiResult<Course> {
    let pool = DatabaseManager::pool().await?;
    let course = CourseService::new(pool)
        .create(
            user.id,
            &req.title,
            &req.description,
            req.sub_category_id,
            req.city_id,
            req.is_online,
        )
        .await?;
    Ok(ApiResponse::created(course))
}

/// Partial update of an owned course.
#[utoipa::path(
    patch,
    path = "/api/courses/{id}",
    tag = COURSES_TAG,
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Course id")),
    request_body = UpdateCourseRequest,
    responses(
        (status = 200, description = "Updated course", body = Course),
        (status = 403, description = "Not the owner")
    ),
)]
pub async fn update(
    CurrentUser(user): CurrentUser,
    Path(course_id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateCourseRequest>,
) -> ApiResult<Course> {
    let pool = DatabaseManager::pool().await?;
    let course = CourseService::new(pool)
        .update(
            user.id,
            course_id,
            UpdateCourse {
                title: req.title,
                description: req.description,
                sub_category_id: req.sub_category_id,
                city_id: req.city_id,
                is_online: req.is_online,
            },
        )
        .await?;
    Ok(ApiResponse::success(course))
}

/// Take an owned course off the catalog. Existing purchases stay valid.
#[utoipa::path(
    delete,
    path = "/api/courses/{id}",
    tag = COURSES_TAG,
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Course id")),
    responses(
        (status = 204, description = "Course deactivated"),
        (status = 403, description = "Not the owner")
    ),
)]
pub async fn deactivate(
    CurrentUser(user): CurrentUser,
    Path(course_id): Path<Uuid>,
) -> ApiResult<()> {
    let pool = DatabaseManager::pool().await?;
    CourseService::new(pool).deactivate(user.id, course_id).await?;
    Ok(ApiResponse::<()>::no_content())
}

/// Add a price option (max 3, no duplicate price/quantity pair).
#[utoipa::path(
    post,
    path = "/api/courses/{id}/price-options",
    tag = COURSES_TAG,
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Course id")),
    request_body = PriceOptionRequest,
    responses(
        (status = 201, description = "Option added", body = CoursePriceOption),
        (status = 409, description = "Limit reached or duplicate")
    ),
)]
pub async fn add_price_option(
    CurrentUser(user): CurrentUser,
    Path(course_id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<PriceOptionRequest>,
) -> ApiResult<CoursePriceOption> {
    let pool = DatabaseManager::pool().await?;
    let option = CourseService::new(pool)
        .add_price_option(user.id, course_id, req.price, req.quantity)
        .await?;
    Ok(ApiResponse::created(option))
}

/// Replace a price option's price and quantity.
#[utoipa::path(
    put,
    path = "/api/courses/{id}/price-options/{option_id}",
    tag = COURSES_TAG,
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Course id"),
        ("option_id" = Uuid, Path, description = "Price option id")
    ),
    request_body = PriceOptionRequest,
    responses(
        (status = 200, description = "Option replaced", body = CoursePriceOption),
        (status = 409, description = "Duplicate price/quantity pair")
    ),
)]
pub async fn replace_price_option(
    CurrentUser(user): CurrentUser,
    Path((course_id, option_id)): Path<(Uuid, Uuid)>,
    ValidatedJson(req): ValidatedJson<PriceOptionRequest>,
) -> ApiResult<CoursePriceOption> {
    let pool = DatabaseManager::pool().await?;
    let option = CourseService::new(pool)
        .replace_price_option(user.id, course_id, option_id, req.price, req.quantity)
        .await?;
    Ok(ApiResponse::success(option))
}

/// Remove a price option. Order items keep their snapshots.
#[utoipa::path(
    delete,
    path = "/api/courses/{id}/price-options/{option_id}",
    tag = COURSES_TAG,
    security(("bearer_auth" = [])),
    params(
        ("id" = Uuid, Path, description = "Course id"),
        ("option_id" = Uuid, Path, description = "Price option id")
    ),
    responses(
        (status = 204, description = "Option removed"),
        (status = 404, description = "Option not found")
    ),
)]
pub async fn remove_price_option(
    CurrentUser(user): CurrentUser,
    Path((course_id, option_id)): Path<(Uuid, Uuid)>,
) -> ApiResult<()> {
    let pool = DatabaseManager::pool().await?;
    CourseService::new(pool)
        .remove_price_option(user.id, course_id, option_id)
        .await?;
    Ok(ApiResponse::<()>::no_content())
}

/// Visible reviews for a course, newest first.
#[utoipa::path(
    get,
    path = "/api/courses/{id}/reviews",
    tag = COURSES_TAG,
    params(
        ("id" = Uuid, Path, description = "Course id"),
        PageQuery
    ),
    responses((status = 200, description = "Course reviews", body = Page<ReviewPublic>)),
)]
pub async fn reviews(
    Path(course_id): Path<Uuid>,
    Query(page): Query<PageQuery>,
) -> ApiResult<Page<ReviewPublic>> {
    let pool = DatabaseManager::pool().await?;
    let reviews = ReviewService::new(pool).list_for_course(course_id, &page).await?;
    Ok(ApiResponse::success(reviews))
}
