use chrono::NaiveTime;
use serde::Serialize;
use sqlx::PgPool;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::database::models::teacher::{Teacher, TeacherAvailableSlot, TeacherStatus};

/// Availability caps per teacher.
pub const SLOT_LIMIT_PER_WEEKDAY: usize = 10;
pub const SLOT_LIMIT_PER_WEEK: usize = 70;

#[derive(Debug, thiserror::Error)]
pub enum TeacherError {
    #[error("Teacher not found")]
    NotFound,
    #[error("A teacher profile already exists for this account")]
    ProfileExists,
    #[error("Weekday slot limit reached")]
    SlotLimitWeekday,
    #[error("Weekly slot limit reached")]
    SlotLimitWeek,
    #[error("Slot overlaps an existing slot")]
    SlotOverlap,
    #[error("end_time must be after start_time")]
    InvalidTimeRange,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// What the booking UI sees of a teacher: approved profiles only.
#[derive(Debug, Serialize, ToSchema)]
pub struct TeacherPublicProfile {
    pub id: Uuid,
    pub name: String,
    pub headline: String,
    pub introduction: String,
    pub career_years: i16,
}

#[derive(Debug, Default)]
pub struct UpdateTeacherProfile {
    pub headline: Option<String>,
    pub introduction: Option<String>,
    pub career_years: Option<i16>,
}

pub struct TeacherService {
    pool: PgPool,
}

impl TeacherService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply as a teacher. A rejected profile may re-apply, which resets the
    /// same row back to pending; anything else is a duplicate.
    pub async fn apply(
        &self,
        user_id: Uuid,
        headline: &str,
        introduction: &str,
        career_years: i16,
    ) -> Result<Teacher, TeacherError> {
        let existing = sqlx::query_as::<_, Teacher>(
            "SELECT * FROM teachers WHERE user_id = $1 AND deleted_at IS NULL",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        match existing {
            None => {
                let teacher = sqlx::query_as::<_, Teacher>(
                    r#"
                    INSERT INTO teachers (id, user_id, headline, introduction, career_years)
                    VALUES ($1, $2, $3, $4, $5)
                    RETURNING *
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(user_id)
                .bind(headline)
                .bind(introduction)
                .bind(career_years)
                .fetch_one(&self.pool)
                .await?;

                tracing::info!("Teacher application created for user {}", user_id);
                Ok(teacher)
            }
            Some(profile) if profile.status == TeacherStatus::Rejected => {
                let teacher = sqlx::query_as::<_, Teacher>(
                    r#"
                    UPDATE teachers SET
                        headline = $2, introduction = $3, career_years = $4,
                        status = 'pending', updated_at = now()
                    WHERE id = $1
                    RETURNING *
                    "#,
                )
                .bind(profile.id)
                .bind(headline)
                .bind(introduction)
                .bind(career_years)
                .fetch_one(&self.pool)
                .await?;

                tracing::info!("Teacher {} re-applied after rejection", teacher.id);
                Ok(teacher)
            }
            Some(_) => Err(TeacherError::ProfileExists),
        }
    }

    pub async fn profile_by_user(&self, user_id: Uuid) -> Result<Teacher, TeacherError> {
        sqlx::query_as::<_, Teacher>(
            "SELECT * FROM teachers WHERE user_id = $1 AND deleted_at IS NULL",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(TeacherError::NotFound)
    }

    pub async fn update_profile(
        &self,
        user_id: Uuid,
        update: UpdateTeacherProfile,
    ) -> Result<Teacher, TeacherError> {
        sqlx::query_as::<_, Teacher>(
            r#"
            UPDATE teachers SET
                headline = COALESCE($2, headline),
                introduction = COALESCE($3, introduction),
                career_years = COALESCE($4, career_years),
                updated_at = now()
            WHERE user_id = $1 AND deleted_at IS NULL
            RETURNING *
            "#,
        )
        .bind(user_id)
        .bind(update.headline)
        .bind(update.introduction)
        .bind(update.career_years)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(TeacherError::NotFound)
    }

    /// Public teacher card; only approved profiles are visible.
    pub async fn public_profile(&self, teacher_id: Uuid) -> Result<TeacherPublicProfile, TeacherError> {
        let row: Option<(Uuid, String, String, String, i16)> = sqlx::query_as(
            r#"
            SELECT t.id, u.name, t.headline, t.introduction, t.career_years
            FROM teachers t
            JOIN users u ON u.id = t.user_id
            WHERE t.id = $1 AND t.status = 'approved' AND t.deleted_at IS NULL
            "#,
        )
        .bind(teacher_id)
        .fetch_optional(&self.pool)
        .await?;

        let (id, name, headline, introduction, career_years) =
            row.ok_or(TeacherError::NotFound)?;

        Ok(TeacherPublicProfile {
            id,
            name,
            headline,
            introduction,
            career_years,
        })
    }

    /// Weekly availability of an approved teacher, for the booking UI.
    pub async fn public_slots(&self, teacher_id: Uuid) -> Result<Vec<TeacherAvailableSlot>, TeacherError> {
        let visible: (bool,) = sqlx::query_as(
            "SELECT EXISTS (SELECT 1 FROM teachers \
             WHERE id = $1 AND status = 'approved' AND deleted_at IS NULL)",
        )
        .bind(teacher_id)
        .fetch_one(&self.pool)
        .await?;

        if !visible.0 {
            return Err(TeacherError::NotFound);
        }

        self.slots_of(teacher_id).await
    }

    pub async fn my_slots(&self, user_id: Uuid) -> Result<Vec<TeacherAvailableSlot>, TeacherError> {
        let teacher = self.profile_by_user(user_id).await?;
        self.slots_of(teacher.id).await
    }

    async fn slots_of(&self, teacher_id: Uuid) -> Result<Vec<TeacherAvailableSlot>, TeacherError> {
        let slots = sqlx::query_as::<_, TeacherAvailableSlot>(
            "SELECT * FROM teacher_available_slots \
             WHERE teacher_id = $1 ORDER BY weekday, start_time",
        )
        .bind(teacher_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(slots)
    }

    /// Add a weekly availability slot, enforcing the per-weekday and weekly
    /// caps and rejecting overlaps with existing slots.
    pub async fn add_slot(
        &self,
        user_id: Uuid,
        weekday: i16,
        start_time: NaiveTime,
        end_time: NaiveTime,
    ) -> Result<TeacherAvailableSlot, TeacherError> {
        if end_time <= start_time {
            return Err(TeacherError::InvalidTimeRange);
        }

        let teacher = self.profile_by_user(user_id).await?;
        let slots = self.slots_of(teacher.id).await?;

        if slots.len() >= SLOT_LIMIT_PER_WEEK {
            return Err(TeacherError::SlotLimitWeek);
        }
        if slots.iter().filter(|s| s.weekday == weekday).count() >= SLOT_LIMIT_PER_WEEKDAY {
            return Err(TeacherError::SlotLimitWeekday);
        }
        if slots.iter().any(|s| s.overlaps(weekday, start_time, end_time)) {
            return Err(TeacherError::SlotOverlap);
        }

        let slot = sqlx::query_as::<_, TeacherAvailableSlot>(
            r#"
            INSERT INTO teacher_available_slots (id, teacher_id, weekday, start_time, end_time)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(teacher.id)
        .bind(weekday)
        .bind(start_time)
        .bind(end_time)
        .fetch_one(&self.pool)
        .await?;

        Ok(slot)
    }

    pub async fn remove_slot(&self, user_id: Uuid, slot_id: Uuid) -> Result<(), TeacherError> {
        let teacher = self.profile_by_user(user_id).await?;

        let result = sqlx::query(
            "DELETE FROM teacher_available_slots WHERE id = $1 AND teacher_id = $2",
        )
        .bind(slot_id)
        .bind(teacher.id)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(TeacherError::NotFound);
        }
        Ok(())
    }
}
