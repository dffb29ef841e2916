use crate::database::manager::DatabaseManager;
use crate::database::models::catalog::City;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::catalog_service::{CatalogService, CategoryTree};

pub const CATALOG_TAG: &str = "catalog";

/// City lookup for signup and course filtering.
#[utoipa::path(
    get,
    path = "/api/catalog/cities",
    tag = CATALOG_TAG,
    responses((status = 200, description = "All cities", body = [City])),
)]
pub async fn cities() -> ApiResult<Vec<City>> {
    let pool = DatabaseManager::pool().await?;
    let cities = CatalogService::new(pool).cities().await?;
    Ok(ApiResponse::success(cities))
}

/// Main categories with their nested subcategories.
#[utoipa::path(
    get,
    path = "/api/catalog/categories",
    tag = CATALOG_TAG,
    responses((status = 200, description = "Category tree", body = [CategoryTree])),
)]
pub async fn categories() -> ApiResult<Vec<CategoryTree>> {
    let pool = DatabaseManager::pool().await?;
    let tree = CatalogService::new(pool).categories().await?;
    Ok(ApiResponse::success(tree))
}
