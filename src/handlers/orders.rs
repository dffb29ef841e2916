use axum::extract::{Path, Query};
use serde::Deserialize;
use utoipa::ToSchema;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::order::Order;
use crate::middleware::account::CurrentUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::order_service::{
    OrderDetail, OrderItemRequest, OrderService, PurchaseSummary,
};
use crate::types::{Page, PageQuery};
use crate::validation::{FieldErrors, Validate, ValidatedJson, ValidationErrors};

pub const ORDERS_TAG: &str = "orders";

const MAX_ORDER_ITEMS: usize = 20;

#[derive(Debug, Deserialize, ToSchema)]
pub struct OrderItemInput {
    pub course_id: Uuid,
    pub price_option_id: Uuid,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateOrderRequest {
    pub items: Vec<OrderItemInput>,
}

impl Validate for CreateOrderRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = FieldErrors::new();
        if self.items.is_empty() {
            errors.push("items", "Must not be empty");
        }
        if self.items.len() > MAX_ORDER_ITEMS {
            errors.push("items", "Too many items");
        }
        errors.into_result()
    }
}

/// Create a pending order from cart items. Prices and titles are
/// snapshotted at order time.
#[utoipa::path(
    post,
    path = "/api/orders",
    tag = ORDERS_TAG,
    security(("bearer_auth" = [])),
    request_body = CreateOrderRequest,
    responses(
        (status = 201, description = "Order created", body = OrderDetail),
        (status = 400, description = "Empty order"),
        (status = 404, description = "Course or price option not found")
    ),
)]
pub async fn create(
    CurrentUser(user): CurrentUser,
    ValidatedJson(req): ValidatedJson<CreateOrderRequest>,
) -> ApiResult<OrderDetail> {
    let items: Vec<OrderItemRequest> = req
        .items
        .iter()
        .map(|item| OrderItemRequest {
            course_id: item.course_id,
            price_option_id: item.price_option_id,
        })
        .collect();

    let pool = DatabaseManager::pool().await?;
    let order = OrderService::new(pool).create(user.id, &items).await?;
    Ok(ApiResponse::created(order))
}

/// Own orders, newest first.
#[utoipa::path(
    get,
    path = "/api/orders",
    tag = ORDERS_TAG,
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses((status = 200, description = "Own orders", body = Page<Order>)),
)]
pub async fn list(
    CurrentUser(user): CurrentUser,
    Query(page): Query<PageQuery>,
) -> ApiResult<Page<Order>> {
    let pool = DatabaseManager::pool().await?;
    let orders = OrderService::new(pool).list(user.id, &page).await?;
    Ok(ApiResponse::success(orders))
}

/// One order with its snapshotted items.
#[utoipa::path(
    get,
    path = "/api/orders/{id}",
    tag = ORDERS_TAG,
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order detail", body = OrderDetail),
        (status = 404, description = "Order not found")
    ),
)]
pub async fn detail(
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<Uuid>,
) -> ApiResult<OrderDetail> {
    let pool = DatabaseManager::pool().await?;
    let order = OrderService::new(pool).detail(user.id, order_id).await?;
    Ok(ApiResponse::success(order))
}

/// Mark a pending order paid; mints one purchase per item.
#[utoipa::path(
    post,
    path = "/api/orders/{id}/pay",
    tag = ORDERS_TAG,
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 200, description = "Order paid", body = OrderDetail),
        (status = 409, description = "Order is not pending")
    ),
)]
pub async fn pay(
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<Uuid>,
) -> ApiResult<OrderDetail> {
    let pool = DatabaseManager::pool().await?;
    let order = OrderService::new(pool).pay(user.id, order_id).await?;
    Ok(ApiResponse::success(order))
}

/// Cancel a pending order.
#[utoipa::path(
    post,
    path = "/api/orders/{id}/cancel",
    tag = ORDERS_TAG,
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Order id")),
    responses(
        (status = 204, description = "Order canceled"),
        (status = 409, description = "Order is not pending")
    ),
)]
pub async fn cancel(
    CurrentUser(user): CurrentUser,
    Path(order_id): Path<Uuid>,
) -> ApiResult<()> {
    let pool = DatabaseManager::pool().await?;
    OrderService::new(pool).cancel(user.id, order_id).await?;
    Ok(ApiResponse::<()>::no_content())
}

/// Purchased session packs with remaining counts.
#[utoipa::path(
    get,
    path = "/api/purchases",
    tag = ORDERS_TAG,
    security(("bearer_auth" = [])),
    params(PageQuery),
    responses((status = 200, description = "Own purchases", body = Page<PurchaseSummary>)),
)]
pub async fn purchases(
    CurrentUser(user): CurrentUser,
    Query(page): Query<PageQuery>,
) -> ApiResult<Page<PurchaseSummary>> {
    let pool = DatabaseManager::pool().await?;
    let purchases = OrderService::new(pool).purchases(user.id, &page).await?;
    Ok(ApiResponse::success(purchases))
}
