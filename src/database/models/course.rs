use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Course {
    pub id: Uuid,
    pub teacher_id: Uuid,
    pub sub_category_id: i32,
    pub city_id: Option<i32>,
    pub title: String,
    pub description: String,
    pub is_online: bool,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// A (price, quantity-of-sessions) bundle attached to a course.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct CoursePriceOption {
    pub id: Uuid,
    pub course_id: Uuid,
    pub price: i64,
    pub quantity: i32,
    pub created_at: DateTime<Utc>,
}
