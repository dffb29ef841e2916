use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Admin credentials live apart from regular users; there is no
/// self-service signup for this table.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct AdminUser {
    pub id: Uuid,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub name: String,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
}
