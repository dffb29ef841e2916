use chrono::{DateTime, Datelike, Utc};
use serde::Deserialize;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use crate::database::models::purchase::UserCoursePurchase;
use crate::database::models::reservation::{Reservation, ReservationStatus};
use crate::database::models::teacher::TeacherAvailableSlot;
use crate::types::{Page, PageQuery};

#[derive(Debug, thiserror::Error)]
pub enum ReservationError {
    #[error("Reservation not found")]
    NotFound,
    #[error("Purchase not found")]
    PurchaseNotFound,
    #[error("Not a participant of this reservation")]
    Forbidden,
    #[error("No sessions left on this purchase")]
    NoSessionsLeft,
    #[error("Conflicting reservation")]
    Conflict,
    #[error("Outside the teacher's availability")]
    OutsideAvailability,
    #[error("Invalid status transition")]
    InvalidTransition,
    #[error("Invalid time range")]
    InvalidTimeRange,
    #[error(transparent)]
    Database(#[from] sqlx::Error),
}

/// Which side of a reservation the caller wants to list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum ReservationSide {
    #[default]
    Student,
    Teacher,
}

/// Weekday index with Monday as 0, matching slot storage.
pub fn weekday_index(at: DateTime<Utc>) -> i16 {
    at.weekday().num_days_from_monday() as i16
}

/// Whether the requested window fits inside one of the teacher's weekly
/// slots. Both ends must land on the same calendar day; slots never span
/// midnight.
pub fn within_availability(
    slots: &[TeacherAvailableSlot],
    starts_at: DateTime<Utc>,
    ends_at: DateTime<Utc>,
) -> bool {
    if starts_at.date_naive() != ends_at.date_naive() {
        return false;
    }
    let weekday = weekday_index(starts_at);
    let start = starts_at.time();
    let end = ends_at.time();
    slots.iter().any(|slot| slot.contains(weekday, start, end))
}

pub struct ReservationService {
    pool: PgPool,
}

impl ReservationService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Book a session: consumes one session from the purchase, validates
    /// availability containment and teacher conflicts inside a transaction.
    pub async fn create(
        &self,
        user_id: Uuid,
        purchase_id: Uuid,
        starts_at: DateTime<Utc>,
        ends_at: DateTime<Utc>,
    ) -> Result<Reservation, ReservationError> {
        let now = Utc::now();
        if ends_at <= starts_at || starts_at <= now {
            return Err(ReservationError::InvalidTimeRange);
        }

        let mut tx = self.pool.begin().await?;

        let purchase = sqlx::query_as::<_, UserCoursePurchase>(
            "SELECT * FROM user_course_purchases WHERE id = $1 FOR UPDATE",
        )
        .bind(purchase_id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(ReservationError::PurchaseNotFound)?;

        if purchase.user_id != user_id {
            return Err(ReservationError::Forbidden);
        }
        if purchase.quantity_remaining() <= 0 {
            return Err(ReservationError::NoSessionsLeft);
        }

        let (teacher_id,): (Uuid,) =
            sqlx::query_as("SELECT teacher_id FROM courses WHERE id = $1")
                .bind(purchase.course_id)
                .fetch_one(&mut *tx)
                .await?;

        let slots = sqlx::query_as::<_, TeacherAvailableSlot>(
            "SELECT * FROM teacher_available_slots WHERE teacher_id = $1",
        )
        .bind(teacher_id)
        .fetch_all(&mut *tx)
        .await?;

        if !within_availability(&slots, starts_at, ends_at) {
            return Err(ReservationError::OutsideAvailability);
        }

        let (conflicting,): (bool,) = sqlx::query_as(
            r#"
            SELECT EXISTS (
                SELECT 1 FROM reservations
                WHERE teacher_id = $1 AND status <> 'canceled'
                  AND starts_at < $3 AND $2 < ends_at
            )
            "#,
        )
        .bind(teacher_id)
        .bind(starts_at)
        .bind(ends_at)
        .fetch_one(&mut *tx)
        .await?;

        if conflicting {
            return Err(ReservationError::Conflict);
        }

        let reservation = sqlx::query_as::<_, Reservation>(
            r#"
            INSERT INTO reservations (id, course_id, teacher_id, student_id, purchase_id, starts_at, ends_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            RETURNING *
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(purchase.course_id)
        .bind(teacher_id)
        .bind(user_id)
        .bind(purchase_id)
        .bind(starts_at)
        .bind(ends_at)
        .fetch_one(&mut *tx)
        .await?;

        sqlx::query(
            "UPDATE user_course_purchases SET quantity_used = quantity_used + 1 WHERE id = $1",
        )
        .bind(purchase_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!("Reservation {} booked with teacher {}", reservation.id, teacher_id);
        Ok(reservation)
    }

    pub async fn list(
        &self,
        user_id: Uuid,
        side: ReservationSide,
        page: &PageQuery,
    ) -> Result<Page<Reservation>, ReservationError> {
        let (filter_column, subject_id) = match side {
            ReservationSide::Student => ("student_id", Some(user_id)),
            ReservationSide::Teacher => {
                let teacher: Option<(Uuid,)> = sqlx::query_as(
                    "SELECT id FROM teachers WHERE user_id = $1 AND deleted_at IS NULL",
                )
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;
                ("teacher_id", teacher.map(|t| t.0))
            }
        };

        let Some(subject_id) = subject_id else {
            return Ok(Page::new(Vec::new(), 0, page));
        };

        let (total,): (i64,) = sqlx::query_as(&format!(
            "SELECT COUNT(*) FROM reservations WHERE {} = $1",
            filter_column
        ))
        .bind(subject_id)
        .fetch_one(&self.pool)
        .await?;

        let items = sqlx::query_as::<_, Reservation>(&format!(
            "SELECT * FROM reservations WHERE {} = $1 \
             ORDER BY starts_at DESC LIMIT $2 OFFSET $3",
            filter_column
        ))
        .bind(subject_id)
        .bind(page.limit())
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(Page::new(items, total, page))
    }

    pub async fn detail(&self, user_id: Uuid, id: Uuid) -> Result<Reservation, ReservationError> {
        let reservation = sqlx::query_as::<_, Reservation>(
            "SELECT * FROM reservations WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(ReservationError::NotFound)?;

        self.ensure_participant(&reservation, user_id).await?;
        Ok(reservation)
    }

    /// Teacher accepts a requested booking.
    pub async fn confirm(&self, user_id: Uuid, id: Uuid) -> Result<Reservation, ReservationError> {
        let mut tx = self.pool.begin().await?;
        let reservation = Self::lock(&mut tx, id).await?;

        if !self.is_teacher_side(&reservation, user_id).await? {
            return Err(ReservationError::Forbidden);
        }
        if !reservation.status.can_transition(ReservationStatus::Confirmed) {
            return Err(ReservationError::InvalidTransition);
        }

        let reservation = Self::set_status(&mut tx, id, ReservationStatus::Confirmed).await?;
        tx.commit().await?;
        Ok(reservation)
    }

    /// Teacher marks a confirmed session completed once it has ended.
    pub async fn complete(&self, user_id: Uuid, id: Uuid) -> Result<Reservation, ReservationError> {
        let mut tx = self.pool.begin().await?;
        let reservation = Self::lock(&mut tx, id).await?;

        if !self.is_teacher_side(&reservation, user_id).await? {
            return Err(ReservationError::Forbidden);
        }
        if !reservation.status.can_transition(ReservationStatus::Completed)
            || Utc::now() < reservation.ends_at
        {
            return Err(ReservationError::InvalidTransition);
        }

        let reservation = Self::set_status(&mut tx, id, ReservationStatus::Completed).await?;
        tx.commit().await?;
        Ok(reservation)
    }

    /// Either participant cancels before the session starts; the consumed
    /// session goes back to the purchase.
    pub async fn cancel(&self, user_id: Uuid, id: Uuid) -> Result<Reservation, ReservationError> {
        let mut tx = self.pool.begin().await?;
        let reservation = Self::lock(&mut tx, id).await?;

        let is_student = reservation.student_id == user_id;
        if !is_student && !self.is_teacher_side(&reservation, user_id).await? {
            return Err(ReservationError::Forbidden);
        }
        if !reservation.status.can_transition(ReservationStatus::Canceled)
            || Utc::now() >= reservation.starts_at
        {
            return Err(ReservationError::InvalidTransition);
        }

        let reservation = Self::set_status(&mut tx, id, ReservationStatus::Canceled).await?;

        sqlx::query(
            "UPDATE user_course_purchases \
             SET quantity_used = GREATEST(quantity_used - 1, 0) WHERE id = $1",
        )
        .bind(reservation.purchase_id)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        tracing::info!("Reservation {} canceled, session refunded", reservation.id);
        Ok(reservation)
    }

    async fn lock(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
    ) -> Result<Reservation, ReservationError> {
        sqlx::query_as::<_, Reservation>("SELECT * FROM reservations WHERE id = $1 FOR UPDATE")
            .bind(id)
            .fetch_optional(&mut **tx)
            .await?
            .ok_or(ReservationError::NotFound)
    }

    async fn set_status(
        tx: &mut Transaction<'_, Postgres>,
        id: Uuid,
        status: ReservationStatus,
    ) -> Result<Reservation, ReservationError> {
        let reservation = sqlx::query_as::<_, Reservation>(
            "UPDATE reservations SET status = $2, updated_at = now() WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_one(&mut **tx)
        .await?;
        Ok(reservation)
    }

    async fn is_teacher_side(
        &self,
        reservation: &Reservation,
        user_id: Uuid,
    ) -> Result<bool, ReservationError> {
        let (owner,): (Uuid,) = sqlx::query_as("SELECT user_id FROM teachers WHERE id = $1")
            .bind(reservation.teacher_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(owner == user_id)
    }

    async fn ensure_participant(
        &self,
        reservation: &Reservation,
        user_id: Uuid,
    ) -> Result<(), ReservationError> {
        if reservation.student_id == user_id || self.is_teacher_side(reservation, user_id).await? {
            Ok(())
        } else {
            Err(ReservationError::Forbidden)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn slot(weekday: i16, start: &str, end: &str) -> TeacherAvailableSlot {
        TeacherAvailableSlot {
            id: Uuid::new_v4(),
            teacher_id: Uuid::new_v4(),
            weekday,
            start_time: start.parse().unwrap(),
            end_time: end.parse().unwrap(),
            created_at: Utc::now(),
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn monday_is_weekday_zero() {
        // 2026-08-31 is a Monday
        assert_eq!(weekday_index(at(2026, 8, 31, 12, 0)), 0);
        assert_eq!(weekday_index(at(2026, 9, 6, 12, 0)), 6);
    }

    #[test]
    fn booking_must_fit_one_slot() {
        let slots = vec![slot(0, "09:00:00", "12:00:00"), slot(2, "14:00:00", "18:00:00")];

        // Monday 10:00-11:00 fits the first slot
        assert!(within_availability(&slots, at(2026, 8, 31, 10, 0), at(2026, 8, 31, 11, 0)));
        // Wednesday inside the second slot
        assert!(within_availability(&slots, at(2026, 9, 2, 14, 0), at(2026, 9, 2, 16, 0)));
        // Monday but spilling past the slot end
        assert!(!within_availability(&slots, at(2026, 8, 31, 11, 0), at(2026, 8, 31, 13, 0)));
        // Right weekday, no slot at that hour
        assert!(!within_availability(&slots, at(2026, 9, 2, 9, 0), at(2026, 9, 2, 10, 0)));
        // Tuesday has no slots at all
        assert!(!within_availability(&slots, at(2026, 9, 1, 10, 0), at(2026, 9, 1, 11, 0)));
    }

    #[test]
    fn midnight_spanning_bookings_are_rejected() {
        let slots = vec![slot(0, "00:00:00", "23:59:59"), slot(1, "00:00:00", "23:59:59")];
        assert!(!within_availability(
            &slots,
            at(2026, 8, 31, 23, 0),
            at(2026, 9, 1, 1, 0)
        ));
    }
}
