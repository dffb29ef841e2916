use serde::Serialize;
use sqlx::PgPool;
use utoipa::ToSchema;

use crate::database::models::catalog::{City, MainCategory, SubCategory};
use crate::error::ApiError;

/// Main category with its nested subcategories, as the browse UI expects.
#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryTree {
    pub id: i32,
    pub name: String,
    pub sub_categories: Vec<SubCategory>,
}

pub struct CatalogService {
    pool: PgPool,
}

impl CatalogService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn cities(&self) -> Result<Vec<City>, ApiError> {
        let cities = sqlx::query_as::<_, City>("SELECT id, name FROM cities ORDER BY id")
            .fetch_all(&self.pool)
            .await?;
        Ok(cities)
    }

    pub async fn categories(&self) -> Result<Vec<CategoryTree>, ApiError> {
        let mains = sqlx::query_as::<_, MainCategory>(
            "SELECT id, name FROM main_categories ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        let subs = sqlx::query_as::<_, SubCategory>(
            "SELECT id, main_category_id, name FROM sub_categories ORDER BY id",
        )
        .fetch_all(&self.pool)
        .await?;

        let tree = mains
            .into_iter()
            .map(|main| {
                let sub_categories = subs
                    .iter()
                    .filter(|s| s.main_category_id == main.id)
                    .cloned()
                    .collect();
                CategoryTree {
                    id: main.id,
                    name: main.name,
                    sub_categories,
                }
            })
            .collect();

        Ok(tree)
    }
}
