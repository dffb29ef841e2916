use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::database::models::purchase::UserCoursePurchase;
use crate::database::models::review::Review;
use crate::types::{Page, PageQuery};

#[derive(Debug, thiserror::Error)]
pub enum ReviewError {
    #[error("Review not found")]
    NotFound,
    #[error("Purchase not found")]
    PurchaseNotFound,
    #[error("Not the author of this review")]
    Forbidden,
    #[error("Purchase already reviewed")]
    AlreadyReviewed,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Review as shown on a course page.
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct ReviewPublic {
    pub id: Uuid,
    pub rating: i16,
    pub comment: String,
    pub author_name: String,
    pub created_at: DateTime<Utc>,
}

pub struct ReviewService {
    pool: PgPool,
}

impl ReviewService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Review a purchased course, one review per purchase. Soft-deleting a
    /// review frees the purchase for a fresh one.
    pub async fn create(
        &self,
        user_id: Uuid,
        purchase_id: Uuid,
        rating: i16,
        comment: &str,
    ) -> Result<Review, ReviewError> {
        let purchase = sqlx::query_as::<_, UserCoursePurchase>(
            "SELECT * FROM user_course_purchases WHERE id = $1",
        )
        .bind(purchase_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ReviewError::PurchaseNotFound)?;

        if purchase.user_id != user_id {
            return Err(ReviewError::Forbidden);
        }

        let (reviewed,): (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM reviews \
             WHERE purchase_id = $1 AND deleted_at IS NULL)",
        )
        .bind(purchase_id)
        .fetch_one(&self.pool)
        .await?;

        if reviewed {
            return Err(ReviewError::AlreadyReviewed);
        }

        let review = sqlx::query_as::<_, Review>(
            r#"
            INSERT INTO reviews (id, course_id, user_id, purchase_id, rating, comment)
            VALUES ($1, $2, $3, $4, $5, $6)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(purchase.course_id)
        .bind(user_id)
        .bind(purchase_id)
        .bind(rating)
        .bind(comment)
        .fetch_one(&self.pool)
        .await?;

        Ok(review)
    }

    pub async fn update(
        &self,
        user_id: Uuid,
        review_id: Uuid,
        rating: Option<i16>,
        comment: Option<&str>,
    ) -> Result<Review, ReviewError> {
        let review = self.owned_review(user_id, review_id).await?;

        let review = sqlx::query_as::<_, Review>(
            r#"
            UPDATE reviews SET
                rating = COALESCE($2, rating),
                comment = COALESCE($3, comment),
                updated_at = now()
            WHERE id = $1
            RETURNING *
            "#,
        )
        .bind(review.id)
        .bind(rating)
        .bind(comment)
        .fetch_one(&self.pool)
        .await?;

        Ok(review)
    }

    pub async fn soft_delete(&self, user_id: Uuid, review_id: Uuid) -> Result<(), ReviewError> {
        let review = self.owned_review(user_id, review_id).await?;

        sqlx::query("UPDATE reviews SET deleted_at = now(), updated_at = now() WHERE id = $1")
            .bind(review.id)
            .execute(&self.pool)
            .await?;

        Ok(())
    }

    /// Visible reviews for a course page: hidden and soft-deleted rows are
    /// excluded.
    pub async fn list_for_course(
        &self,
        course_id: Uuid,
        page: &PageQuery,
    ) -> Result<Page<ReviewPublic>, ReviewError> {
        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM reviews \
             WHERE course_id = $1 AND is_hidden = FALSE AND deleted_at IS NULL",
        )
        .bind(course_id)
        .fetch_one(&self.pool)
        .await?;

        let items = sqlx::query_as::<_, ReviewPublic>(
            r#"
            SELECT r.id, r.rating, r.comment, u.name AS author_name, r.created_at
            FROM reviews r
            JOIN users u ON u.id = r.user_id
            WHERE r.course_id = $1 AND r.is_hidden = FALSE AND r.deleted_at IS NULL
            ORDER BY r.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(course_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(items, total, page))
    }

    async fn owned_review(&self, user_id: Uuid, review_id: Uuid) -> Result<Review, ReviewError> {
        let review = sqlx::query_as::<_, Review>(
            "SELECT * FROM reviews WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(review_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ReviewError::NotFound)?;

        if review.user_id != user_id {
            return Err(ReviewError::Forbidden);
        }
        Ok(review)
    }
}
