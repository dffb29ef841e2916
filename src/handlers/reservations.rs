use axum::extract::{Path, Query};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::database::models::reservation::Reservation;
use crate::middleware::account::CurrentUser;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::reservation_service::{ReservationService, ReservationSide};
use crate::types::{Page, PageQuery};
use crate::validation::{FieldErrors, Validate, ValidatedJson, ValidationErrors};

pub const RESERVATIONS_TAG: &str = "reservations";

#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateReservationRequest {
    pub purchase_id: Uuid,
    pub starts_at: DateTime<Utc>,
    pub ends_at: DateTime<Utc>,
}

impl Validate for CreateReservationRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = FieldErrors::new();
        if self.ends_at <= self.starts_at {
            errors.push("ends_at", "Must be after starts_at");
        }
        errors.into_result()
    }
}

/// `as=student` (default) or `as=teacher`, plus pagination.
#[derive(Debug, Default, Deserialize, IntoParams)]
pub struct ReservationListQuery {
    #[serde(rename = "as", default)]
    #[param(inline)]
    pub side: ReservationSide,
    pub page: Option<u32>,
    pub per_page: Option<u32>,
}

/// Book a session from a purchase, inside the teacher's weekly
/// availability.
#[utoipa::path(
    post,
    path = "/api/reservations",
    tag = RESERVATIONS_TAG,
    security(("bearer_auth" = [])),
    request_body = CreateReservationRequest,
    responses(
        (status = 201, description = "Reservation requested", body = Reservation),
        (status = 409, description = "Conflict, no sessions left, or outside availability")
    ),
)]
pub async fn create(
    CurrentUser(user): CurrentUser,
    ValidatedJson(req): ValidatedJson<CreateReservationRequest>,
) -> ApiResult<Reservation> {
    let pool = DatabaseManager::pool().await?;
    let reservation = ReservationService::new(pool)
        .create(user.id, req.purchase_id, req.starts_at, req.ends_at)
        .await?;
    Ok(ApiResponse::created(reservation))
}

/// Reservations the caller participates in, on either side.
#[utoipa::path(
    get,
    path = "/api/reservations",
    tag = RESERVATIONS_TAG,
    security(("bearer_auth" = [])),
    params(ReservationListQuery),
    responses((status = 200, description = "Reservations", body = Page<Reservation>)),
)]
pub async fn list(
    CurrentUser(user): CurrentUser,
    Query(query): Query<ReservationListQuery>,
) -> ApiResult<Page<Reservation>> {
    let page = PageQuery {
        page: query.page,
        per_page: query.per_page,
    };
    let pool = DatabaseManager::pool().await?;
    let reservations = ReservationService::new(pool)
        .list(user.id, query.side, &page)
        .await?;
    Ok(ApiResponse::success(reservations))
}

/// One reservation; participants only.
#[utoipa::path(
    get,
    path = "/api/reservations/{id}",
    tag = RESERVATIONS_TAG,
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Reservation id")),
    responses(
        (status = 200, description = "Reservation", body = Reservation),
        (status = 404, description = "Reservation not found")
    ),
)]
pub async fn detail(
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Reservation> {
    let pool = DatabaseManager::pool().await?;
    let reservation = ReservationService::new(pool).detail(user.id, id).await?;
    Ok(ApiResponse::success(reservation))
}

/// Teacher accepts a requested booking.
#[utoipa::path(
    post,
    path = "/api/reservations/{id}/confirm",
    tag = RESERVATIONS_TAG,
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Reservation id")),
    responses(
        (status = 200, description = "Reservation confirmed", body = Reservation),
        (status = 409, description = "Invalid status transition")
    ),
)]
pub async fn confirm(
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Reservation> {
    let pool = DatabaseManager::pool().await?;
    let reservation = ReservationService::new(pool).confirm(user.id, id).await?;
    Ok(ApiResponse::success(reservation))
}

/// Teacher marks a confirmed session completed once it has ended.
#[utoipa::path(
    post,
    path = "/api/reservations/{id}/complete",
    tag = RESERVATIONS_TAG,
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Reservation id")),
    responses(
        (status = 200, description = "Reservation completed", body = Reservation),
        (status = 409, description = "Invalid status transition or session not over")
    ),
)]
pub async fn complete(
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Reservation> {
    let pool = DatabaseManager::pool().await?;
    let reservation = ReservationService::new(pool).complete(user.id, id).await?;
    Ok(ApiResponse::success(reservation))
}

/// Either participant cancels before the session starts. The consumed
/// session goes back to the purchase.
#[utoipa::path(
    post,
    path = "/api/reservations/{id}/cancel",
    tag = RESERVATIONS_TAG,
    security(("bearer_auth" = [])),
    params(("id" = Uuid, Path, description = "Reservation id")),
    responses(
        (status = 200, description = "Reservation canceled", body = Reservation),
        (status = 409, description = "Already started or terminal")
    ),
)]
pub async fn cancel(
    CurrentUser(user): CurrentUser,
    Path(id): Path<Uuid>,
) -> ApiResult<Reservation> {
    let pool = DatabaseManager::pool().await?;
    let reservation = ReservationService::new(pool).cancel(user.id, id).await?;
    Ok(ApiResponse::success(reservation))
}
