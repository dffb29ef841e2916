use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Reservation lifecycle: requested -> confirmed -> completed, with
/// cancellation allowed from either non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "reservation_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ReservationStatus {
    Requested,
    Confirmed,
    Completed,
    Canceled,
}

impl ReservationStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, ReservationStatus::Completed | ReservationStatus::Canceled)
    }

    pub fn can_transition(&self, to: ReservationStatus) -> bool {
        use ReservationStatus::*;
        matches!(
            (self, to),
            (Requested, Confirmed) | (Confirmed, Completed) | (Requested, Canceled) | (Confirmed, Canceled)
        )
    }
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Reservation {
    pub id: Uuid,
    pub course_id: Uuid,
    pub teacher_id: Uuid,
    pub student_id: Uuid,
    pub purchase_id: Uuid,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
    pub status: ReservationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::ReservationStatus::*;

    #[test]
    fn allowed_transitions() {
        assert!(Requested.can_transition(Confirmed));
        assert!(Requested.can_transition(Canceled));
        assert!(Confirmed.can_transition(Completed));
        assert!(Confirmed.can_transition(Canceled));
    }

    #[test]
    fn terminal_states_never_move() {
        for to in [Requested, Confirmed, Completed, Canceled] {
            assert!(!Completed.can_transition(to));
            assert!(!Canceled.can_transition(to));
        }
        assert!(Completed.is_terminal());
        assert!(Canceled.is_terminal());
        assert!(!Requested.is_terminal());
    }

    #[test]
    fn no_skipping_confirmation() {
        assert!(!Requested.can_transition(Completed));
        assert!(!Confirmed.can_transition(Requested));
    }
}
