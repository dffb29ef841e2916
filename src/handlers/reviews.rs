use axum::extract::Path;
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::review::Review;
use crate::middleware::account::CurrentUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::review_service::ReviewService;
use crate::validation::{FieldErrors, Validate, ValidatedJson, ValidationErrors};

pub const REVIEWS_TAG: &str = "reviews";

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReviewRequest {
    pub purchase_id: Uuid,
    pub rating: i16,
    #[serde(default)]
    pub comment: String,
}

impl Validate for CreateReviewRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = FieldErrors::new();
        errors.range_i64("rating", self.rating as i64, 1, 5);
        errors.max_len("comment", &self.comment, 2000);
        errors.into_result()
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateReviewRequest {
    pub rating: Option<i16>,
    pub comment: Option<String>,
}

impl Validate for UpdateReviewRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = FieldErrors::new();
        if let Some(rating) = self.rating {
            errors.range_i64("rating", rating as i64, 1, 5);
        }
        if let Some(comment) = self.comment.as_deref() {
            errors.max_len("comment", comment, 2000);
        }
        errors.into_result()
    }
}

/// Review a purchased course, one review per purchase.
#[utoipa::path(
    post,
    path = "/api/reviews",
    tag = REVIEWS_TAG,
    security(("bearer_auth" = [])),
    request_body = CreateReviewRequest,
    responses(
        (status = 201, description = "Review created", body = Review),
        (status = 409, description = "Purchase already reviewed")
    ),
)]
pub async fn create(
    CurrentUser(user): CurrentUser,
    ValidatedJson(req): ValidatedJson<CreateReviewRequest>,
) -> ApiResult<Review> {
    let pool = DatabaseManager::pool().await?;
    let review = ReviewService::new(pool)
        .create(user.id, req.purchase_id, req.rating, &req.comment)
        .await?;
    Ok(ApiResponse::created(review))
}

/// Edit one's own review.
#[utoipa::path(
    patch,
    path = "/api/reviews/{id}",
    tag = REVIEWS_TAG,
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Review id")),
    request_body = UpdateReviewRequest,
    responses(
        (status = 200, description = "Updated review", body = Review),
        (status = 403, description = "Not the author")
    ),
)]
pub async fn update(
    CurrentUser(user): CurrentUser,
    Path(review_id): Path<Uuid>,
    ValidatedJson(req): ValidatedJson<UpdateReviewRequest>,
) -> ApiResult<Review> {
    let pool = DatabaseManager::pool().await?;
    let review = ReviewService::new(pool)
        .update(user.id, review_id, req.rating, req.comment.as_deref())
        .await?;
    Ok(ApiResponse::success(review))
}

/// Remove one's own review. Frees the purchase for a fresh review.
#[utoipa::path(
    delete,
    path = "/api/reviews/{id}",
    tag = REVIEWS_TAG,
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Review id")),
    responses(
        (status = 204, description = "Review deleted"),
        (status = 403, description = "Not the author")
    ),
)]
pub async fn delete(
    CurrentUser(user): CurrentUser,
    Path(review_id): Path<Uuid>,
) -> ApiResult<()> {
    let pool = DatabaseManager::pool().await?;
    ReviewService::new(pool).soft_delete(user.id, review_id).await?;
    Ok(ApiResponse::<()>::no_content())
}
