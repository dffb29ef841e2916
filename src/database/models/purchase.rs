use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;
use uuid::Uuid;

/// Created when an order is paid, one per order item. Reservations draw
/// sessions from quantity_used, which never exceeds quantity_total.
#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct UserCoursePurchase {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub order_item_id: Uuid,
    pub quantity_total: i32,
    pub quantity_used: i32,
    pub created_at: DateTime<Utc>,
}

impl UserCoursePurchase {
    pub fn quantity_remaining(&self) -> i32 {
        self.quantity_total - self.quantity_used
    }
}
