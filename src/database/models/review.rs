use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Reviews attach to a purchase, proving the author bought the course.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct Review {
    pub id: Uuid,
    pub course_id: Uuid,
    pub user_id: Uuid,
    pub purchase_id: Uuid,
    pub rating: i16,
    pub comment: String,
    pub is_hidden: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}
