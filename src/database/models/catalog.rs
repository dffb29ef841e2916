use serde::Serialize;
use sqlx::FromRow;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct City {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct MainCategory {
    pub id: i32,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, FromRow, ToSchema)]
pub struct SubCategory {
    pub id: i32,
    pub main_category_id: i32,
    pub name: String,
}
