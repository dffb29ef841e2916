use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::database::models::course::Course;
use crate::database::models::order::Order;
use crate::database::models::teacher::{Teacher, TeacherStatus};
use crate::error::ApiError;
use crate::types::{Page, PageQuery};

/// Teacher application row with account details for the moderation list.
#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct TeacherApplication {
    pub id: Uuid,
    pub user_id: Uuid,
    pub email: String,
    pub name: String,
    pub headline: String,
    pub career_years: i16,
    pub status: TeacherStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, FromRow, ToSchema)]
pub struct UserAccountRow {
    pub id: Uuid,
    pub email: String,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

pub struct AdminService {
    pool: PgPool,
}

impl AdminService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn list_teachers(
        &self,
        status: Option<TeacherStatus>,
        page: &PageQuery,
    ) -> Result<Page<TeacherApplication>, ApiError> {
        let (total,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM teachers t \
             WHERE t.deleted_at IS NULL AND ($1::teacher_status IS NULL OR t.status = $1)",
        )
        .bind(status)
        .fetch_one(&self.pool)
        .await?;

        let items = sqlx::query_as::<_, TeacherApplication>(
            r#"
            SELECT t.id, t.user_id, u.email, u.name, t.headline, t.career_years,
                   t.status, t.created_at
            FROM teachers t
            JOIN users u ON u.id = t.user_id
            WHERE t.deleted_at IS NULL AND ($1::teacher_status IS NULL OR t.status = $1)
            ORDER BY t.created_at DESC
            LIMIT $2 OFFSET $3
            "#,
        )
        .bind(status)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(items, total, page))
    }

    /// Approve a pending application. Approval also flips the account role
    /// to teacher, unlocking course creation.
    pub async fn approve_teacher(&self, teacher_id: Uuid) -> Result<Teacher, ApiError> {
        let mut tx = self.pool.begin().await?;

        let teacher = sqlx::query_as::<_, Teacher>(
            "SELECT * FROM teachers WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(teacher_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::not_found("Teacher not found"))?;

        if teacher.status != TeacherStatus::Pending {
            return Err(ApiError::business(
                409,
                "INVALID_STATUS_TRANSITION",
                "Only pending applications can be moderated",
            ));
        }

        let teacher = sqlx::query_as::<_, Teacher>(
            "UPDATE teachers SET status = 'approved', updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(teacher_id)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query("UPDATE users SET role = 'teacher', updated_at = now() WHERE id = $1")
            .bind(teacher.user_id)
            .execute(&mut *tx)
            .await?;

        tx.commit().await?;

        tracing::info!("Teacher {} approved", teacher.id);
        Ok(teacher)
    }

    /// Reject a pending application. The row stays so the applicant can see
    /// the outcome and re-apply.
    pub async fn reject_teacher(&self, teacher_id: Uuid) -> Result<Teacher, ApiError> {
        let mut tx = self.pool.begin().await?;

        let teacher = sqlx::query_as::<_, Teacher>(
            "SELECT * FROM teachers WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
        )
        .bind(teacher_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| ApiError::not_found("Teacher not found"))?;

        if teacher.status != TeacherStatus::Pending {
            return Err(ApiError::business(
                409,
                "INVALID_STATUS_TRANSITION",
                "Only pending applications can be moderated",
            ));
        }

        let teacher = sqlx::query_as::<_, Teacher>(
            "UPDATE teachers SET status = 'rejected', updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(teacher_id)
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!("Teacher {} rejected", teacher.id);
        Ok(teacher)
    }

    pub async fn list_users(&self, page: &PageQuery) -> Result<Page<UserAccountRow>, ApiError> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;

        let items = sqlx::query_as::<_, UserAccountRow>(
            "SELECT id, email, name, is_active, created_at, deleted_at FROM users \
             ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(items, total, page))
    }

    pub async fn set_user_active(&self, user_id: Uuid, active: bool) -> Result<(), ApiError> {
        let result = sqlx::query(
            "UPDATE users SET is_active = $2, updated_at = now() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(user_id)
        .bind(active)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("User not found"));
        }

        tracing::info!("User {} active flag set to {}", user_id, active);
        Ok(())
    }

    /// Course list for moderation, inactive and soft-deleted rows included.
    pub async fn list_courses(&self, page: &PageQuery) -> Result<Page<Course>, ApiError> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM courses")
            .fetch_one(&self.pool)
            .await?;

        let items = sqlx::query_as::<_, Course>(
            "SELECT * FROM courses ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(items, total, page))
    }

    pub async fn set_course_active(&self, course_id: Uuid, active: bool) -> Result<(), ApiError> {
        let result = sqlx::query(
            "UPDATE courses SET is_active = $2, updated_at = now() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(course_id)
        .bind(active)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("Course not found"));
        }
        Ok(())
    }

    pub async fn list_orders(&self, page: &PageQuery) -> Result<Page<Order>, ApiError> {
        let (total,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        let items = sqlx::query_as::<_, Order>(
            "SELECT * FROM orders ORDER BY created_at DESC LIMIT $1 OFFSET $2",
        )
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(items, total, page))
    }

    pub async fn set_review_hidden(&self, review_id: Uuid, hidden: bool) -> Result<(), ApiError> {
        let result = sqlx::query(
            "UPDATE reviews SET is_hidden = $2, updated_at = now() \
             WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(review_id)
        .bind(hidden)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(ApiError::not_found("Review not found"));
        }

        tracing::info!("Review {} hidden flag set to {}", review_id, hidden);
        Ok(())
    }
}
