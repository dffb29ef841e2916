use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type, ToSchema)]
#[sqlx(type_name = "teacher_status", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TeacherStatus {
    Pending,
    Approved,
    Rejected,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Teacher {
    pub id: Uuid,
    pub user_id: Uuid,
    pub headline: String,
    pub introduction: String,
    pub career_years: i16,
    pub status: TeacherStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A weekly-recurring availability window. Weekday 0 is Monday.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct TeacherAvailableSlot {
    pub id: Uuid,
    pub teacher_id: Uuid,
    pub weekday: i16,
    #[schema(value_type = String, example = "09:00:00")]
    pub start_time: NaiveTime,
    #[schema(value_type = String, example = "11:00:00")]
    pub end_time: NaiveTime,
    pub created_at: DateTime<Utc>,
}

impl TeacherAvailableSlot {
    /// Half-open interval overlap on the same weekday.
    pub fn overlaps(&self, weekday: i16, start: NaiveTime, end: NaiveTime) -> bool {
        self.weekday == weekday && self.start_time < end && start < self.end_time
    }

    /// Whether the given window fits entirely inside this slot.
    pub fn contains(&self, weekday: i16, start: NaiveTime, end: NaiveTime) -> bool {
        self.weekday == weekday && self.start_time <= start && end <= self.end_time
    }
}

#[cfg(test)]
mod tests {
    use super::*;

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

    fn t(s: &str) -> NaiveTime {
        s.parse().unwrap()
    }

    #[test]
    fn overlap_is_half_open() {
        let s = slot(0, "09:00:00", "11:00:00");
        assert!(s.overlaps(0, t("10:00:00"), t("12:00:00")));
        // Touching boundaries do not overlap
        assert!(!s.overlaps(0, t("11:00:00"), t("12:00:00")));
        assert!(!s.overlaps(0, t("08:00:00"), t("09:00:00")));
        // Different weekday never overlaps
        assert!(!s.overlaps(1, t("10:00:00"), t("12:00:00")));
    }

    #[test]
    fn containment_allows_exact_bounds() {
        let s = slot(3, "14:00:00", "18:00:00");
        assert!(s.contains(3, t("14:00:00"), t("18:00:00")));
        assert!(s.contains(3, t("15:00:00"), t("16:00:00")));
        assert!(!s.contains(3, t("13:30:00"), t("15:00:00")));
        assert!(!s.contains(2, t("14:00:00"), t("15:00:00")));
    }
}
