// HTTP API Error Types
use axum::{http::StatusCode, response::IntoResponse, Json};
use serde_json::{json, Value};
use std::collections::HashMap;

use crate::services::auth_service::AuthError;
use crate::services::course_service::CourseError;
use crate::services::order_service::OrderError;
use crate::services::reservation_service::ReservationError;
use crate::services::review_service::ReviewError;
use crate::services::teacher_service::TeacherError;

/// HTTP API error with appropriate status codes and client-friendly messages
#[derive(Debug)]
pub enum ApiError {
    // 400 Bad Request
    BadRequest(String),
    ValidationError {
        message: String,
        field_errors: Option<HashMap<String, String>>,
    },
    InvalidJson(String),

    // 401 Unauthorized
    Unauthorized(String),

    // 403 Forbidden
    Forbidden(String),

    // 404 Not Found
    NotFound(String),

    // 409 Conflict
    Conflict(String),

    // Business rule failure with a stable client-facing code
    Business {
        status: u16,
        code: &'static str,
        message: String,
    },

    // 500 Internal Server Error
    InternalServerError(String),

    // 503 Service Unavailable
    ServiceUnavailable(String),
}

impl ApiError {
    /// Get HTTP status code
    pub fn status_code(&self) -> u16 {
        match self {
            ApiError::BadRequest(_) => 400,
            ApiError::ValidationError { .. } => 400,
            ApiError::InvalidJson(_) => 400,
            ApiError::Unauthorized(_) => 401,
            ApiError::Forbidden(_) => 403,
            ApiError::NotFound(_) => 404,
            ApiError::Conflict(_) => 409,
            ApiError::Business { status, .. } => *status,
            ApiError::InternalServerError(_) => 500,
            ApiError::ServiceUnavailable(_) => 503,
        }
    }

    /// Get client-safe error message
    pub fn message(&self) -> &str {
        match self {
            ApiError::BadRequest(msg) => msg,
            ApiError::ValidationError { message, .. } => message,
            ApiError::InvalidJson(msg) => msg,
            ApiError::Unauthorized(msg) => msg,
            ApiError::Forbidden(msg) => msg,
            ApiError::NotFound(msg) => msg,
            ApiError::Conflict(msg) => msg,
            ApiError::Business { message, .. } => message,
            ApiError::InternalServerError(msg) => msg,
            ApiError::ServiceUnavailable(msg) => msg,
        }
    }

    /// Get error code for client handling
    pub fn error_code(&self) -> &'static str {
        match self {
            ApiError::BadRequest(_) => "BAD_REQUEST",
            ApiError::ValidationError { .. } => "VALIDATION_ERROR",
            ApiError::InvalidJson(_) => "INVALID_JSON",
            ApiError::Unauthorized(_) => "UNAUTHORIZED",
            ApiError::Forbidden(_) => "FORBIDDEN",
            ApiError::NotFound(_) => "NOT_FOUND",
            ApiError::Conflict(_) => "CONFLICT",
            ApiError::Business { code, .. } => code,
            ApiError::InternalServerError(_) => "INTERNAL_SERVER_ERROR",
            ApiError::ServiceUnavailable(_) => "SERVICE_UNAVAILABLE",
        }
    }

    /// Convert to JSON response body
    pub fn to_json(&self) -> Value {
        match self {
            ApiError::ValidationError { message, field_errors } => {
                let mut response = json!({
                    "error": true,
                    "message": message,
                    "code": "VALIDATION_ERROR"
                });

                if let Some(field_errors) = field_errors {
                    response["field_errors"] = json!(field_errors);
                }

                response
            }
            _ => {
                json!({
                    "error": true,
                    "message": self.message(),
                    "code": self.error_code()
                })
            }
        }
    }
}

// Static constructor methods
impl ApiError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        ApiError::BadRequest(message.into())
    }

    pub fn validation_error(
        message: impl Into<String>,
        field_errors: Option<HashMap<String, String>>,
    ) -> Self {
        ApiError::ValidationError {
            message: message.into(),
            field_errors,
        }
    }

    pub fn invalid_json(message: impl Into<String>) -> Self {
        ApiError::InvalidJson(message.into())
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        ApiError::Unauthorized(message.into())
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        ApiError::Forbidden(message.into())
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        ApiError::NotFound(message.into())
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        ApiError::Conflict(message.into())
    }

    pub fn business(status: u16, code: &'static str, message: impl Into<String>) -> Self {
        ApiError::Business {
            status,
            code,
            message: message.into(),
        }
    }

    pub fn internal_server_error(message: impl Into<String>) -> Self {
        ApiError::InternalServerError(message.into())
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        ApiError::ServiceUnavailable(message.into())
    }
}

// Convert other error types to ApiError

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => ApiError::not_found("Resource not found"),
            other => {
                // Log the real error but never leak SQL details to clients
                tracing::error!("Database error: {}", other);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
        }
    }
}

impl From<crate::database::manager::DatabaseError> for ApiError {
    fn from(err: crate::database::manager::DatabaseError) -> Self {
        use crate::database::manager::DatabaseError;
        match err {
            DatabaseError::ConfigMissing(name) => {
                tracing::error!("Missing configuration: {}", name);
                ApiError::service_unavailable("Database is not configured")
            }
            DatabaseError::MigrationError(msg) => {
                tracing::error!("Migration error: {}", msg);
                ApiError::service_unavailable("Service is being updated, please try again later")
            }
            DatabaseError::Sqlx(sqlx_err) => sqlx_err.into(),
        }
    }
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::EmailTaken => {
                ApiError::business(409, "EMAIL_TAKEN", "An account with this email already exists")
            }
            AuthError::InvalidCredentials => {
                ApiError::business(401, "INVALID_CREDENTIALS", "Invalid email or password")
            }
            AuthError::AccountDisabled => {
                ApiError::business(403, "ACCOUNT_DISABLED", "This account has been disabled")
            }
            AuthError::Hash(e) => {
                tracing::error!("Password hashing error: {}", e);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            AuthError::Token(e) => {
                tracing::error!("Token generation error: {}", e);
                ApiError::internal_server_error("An error occurred while processing your request")
            }
            AuthError::Database(e) => e.into(),
        }
    }
}

impl From<TeacherError> for ApiError {
    fn from(err: TeacherError) -> Self {
        match err {
            TeacherError::NotFound => ApiError::not_found("Teacher not found"),
            TeacherError::ProfileExists => ApiError::business(
                409,
                "TEACHER_PROFILE_EXISTS",
                "A teacher profile already exists for this account",
            ),
            TeacherError::SlotLimitWeekday => ApiError::business(
                409,
                "SLOT_LIMIT_WEEKDAY",
                "A teacher may declare at most 10 slots per weekday",
            ),
            TeacherError::SlotLimitWeek => ApiError::business(
                409,
                "SLOT_LIMIT_WEEK",
                "A teacher may declare at most 70 slots per week",
            ),
            TeacherError::SlotOverlap => ApiError::business(
                409,
                "SLOT_OVERLAP",
                "The slot overlaps an existing slot on the same weekday",
            ),
            TeacherError::InvalidTimeRange => {
                ApiError::bad_request("end_time must be after start_time")
            }
            TeacherError::Database(e) => e.into(),
        }
    }
}

impl From<CourseError> for ApiError {
    fn from(err: CourseError) -> Self {
        match err {
            CourseError::NotFound => ApiError::not_found("Course not found"),
            CourseError::Forbidden => {
                ApiError::business(403, "FORBIDDEN", "You do not own this course")
            }
            CourseError::TeacherNotApproved => ApiError::business(
                403,
                "TEACHER_NOT_APPROVED",
                "Only approved teachers can manage courses",
            ),
            CourseError::SubCategoryNotFound => ApiError::not_found("Sub-category not found"),
            CourseError::PriceOptionNotFound => ApiError::not_found("Price option not found"),
            CourseError::PriceOptionLimit => ApiError::business(
                409,
                "PRICE_OPTION_LIMIT",
                "A course may have at most 3 price options",
            ),
            CourseError::PriceOptionDuplicate => ApiError::business(
                409,
                "PRICE_OPTION_DUPLICATE",
                "A price option with this price and quantity already exists",
            ),
            CourseError::Database(e) => e.into(),
        }
    }
}

impl From<OrderError> for ApiError {
    fn from(err: OrderError) -> Self {
        match err {
            OrderError::NotFound => ApiError::not_found("Order not found"),
            OrderError::Forbidden => {
                ApiError::business(403, "FORBIDDEN", "You do not own this order")
            }
            OrderError::EmptyOrder => {
                ApiError::business(400, "EMPTY_ORDER", "An order requires at least one item")
            }
            OrderError::NotPending => ApiError::business(
                409,
                "ORDER_NOT_PENDING",
                "Only pending orders can be modified",
            ),
            OrderError::CourseNotFound => ApiError::not_found("Course not found"),
            OrderError::PriceOptionNotFound => ApiError::not_found("Price option not found"),
            OrderError::Database(e) => e.into(),
        }
    }
}

impl From<ReservationError> for ApiError {
    fn from(err: ReservationError) -> Self {
        match err {
            ReservationError::NotFound => ApiError::not_found("Reservation not found"),
            ReservationError::PurchaseNotFound => ApiError::not_found("Purchase not found"),
            ReservationError::Forbidden => ApiError::business(
                403,
                "FORBIDDEN",
                "You are not a participant of this reservation",
            ),
            ReservationError::NoSessionsLeft => ApiError::business(
                409,
                "NO_SESSIONS_LEFT",
                "All sessions of this purchase have been used",
            ),
            ReservationError::Conflict => ApiError::business(
                409,
                "RESERVATION_CONFLICT",
                "The teacher already has a reservation in this time range",
            ),
            ReservationError::OutsideAvailability => ApiError::business(
                409,
                "OUTSIDE_AVAILABILITY",
                "The requested time falls outside the teacher's availability",
            ),
            ReservationError::InvalidTransition => ApiError::business(
                409,
                "INVALID_STATUS_TRANSITION",
                "The reservation cannot change to the requested status",
            ),
            ReservationError::InvalidTimeRange => {
                ApiError::bad_request("ends_at must be after starts_at and in the future")
            }
            ReservationError::Database(e) => e.into(),
        }
    }
}

impl From<ReviewError> for ApiError {
    fn from(err: ReviewError) -> Self {
        match err {
            ReviewError::NotFound => ApiError::not_found("Review not found"),
            ReviewError::PurchaseNotFound => ApiError::not_found("Purchase not found"),
            ReviewError::Forbidden => {
                ApiError::business(403, "FORBIDDEN", "You are not the author of this review")
            }
            ReviewError::AlreadyReviewed => ApiError::business(
                409,
                "ALREADY_REVIEWED",
                "This purchase has already been reviewed",
            ),
            ReviewError::Database(e) => e.into(),
        }
    }
}

// Standard error trait implementations
impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for ApiError {}

// Automatic HTTP response conversion for Axum
impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_json())).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn business_errors_carry_code_and_status() {
        let err: ApiError = TeacherError::SlotOverlap.into();
        assert_eq!(err.status_code(), 409);
        assert_eq!(err.error_code(), "SLOT_OVERLAP");
    }

    #[test]
    fn validation_error_envelope_includes_field_errors() {
        let mut fields = HashMap::new();
        fields.insert("email".to_string(), "must be a valid email".to_string());
        let err = ApiError::validation_error("Validation failed", Some(fields));
        let body = err.to_json();
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert_eq!(body["field_errors"]["email"], "must be a valid email");
    }

    #[test]
    fn sqlx_errors_never_leak_details() {
        let err: ApiError = sqlx::Error::PoolClosed.into();
        assert_eq!(err.status_code(), 500);
        assert!(!err.message().contains("pool"));
    }
}
