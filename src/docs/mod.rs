/// OpenAPI document served at /docs via Swagger UI.
use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::database::models::catalog::City;
use crate::database::models::course::{Course, CoursePriceOption};
use crate::database::models::order::{Order, OrderItem, OrderStatus};
use crate::database::models::reservation::{Reservation, ReservationStatus};
use crate::database::models::review::Review;
use crate::database::models::teacher::{Teacher, TeacherAvailableSlot, TeacherStatus};
use crate::database::models::user::UserRole;
use crate::handlers::{
    admin, auth, catalog, courses, orders, reservations, reviews, teachers, users,
};
use crate::services::admin_service::{TeacherApplication, UserAccountRow};
use crate::services::auth_service::{AdminProfile, AdminSession, UserProfile, UserSession};
use crate::services::catalog_service::CategoryTree;
use crate::services::course_service::{CourseDetail, CourseSummary, TeacherCard};
use crate::services::order_service::{OrderDetail, PurchaseSummary};
use crate::services::review_service::ReviewPublic;
use crate::services::teacher_service::TeacherPublicProfile;
use crate::types::Page;

struct BearerAuth;

impl Modify for BearerAuth {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    info(
        title = "TutorHub API",
        description = "Marketplace backend for booking tutoring sessions"
    ),
    paths(
        auth::signup,
        auth::login,
        auth::me,
        users::update_me,
        users::delete_me,
        catalog::cities,
        catalog::categories,
        teachers::apply,
        teachers::me,
        teachers::update_me,
        teachers::my_slots,
        teachers::add_slot,
        teachers::remove_slot,
        teachers::public_profile,
        teachers::public_slots,
        courses::search,
        courses::detail,
        courses::create,
        courses::update,
        courses::deactivate,
        courses::add_price_option,
        courses::replace_price_option,
        courses::remove_price_option,
        courses::reviews,
        orders::create,
        orders::list,
        orders::detail,
        orders::pay,
        orders::cancel,
        orders::purchases,
        reservations::create,
        reservations::list,
        reservations::detail,
        reservations::confirm,
        reservations::complete,
        reservations::cancel,
        reviews::create,
        reviews::update,
        reviews::delete,
        admin::login,
        admin::list_teachers,
        admin::approve_teacher,
        admin::reject_teacher,
        admin::list_users,
        admin::activate_user,
        admin::deactivate_user,
        admin::list_courses,
        admin::activate_course,
        admin::deactivate_course,
        admin::list_orders,
        admin::hide_review,
        admin::unhide_review,
    ),
    components(schemas(
        UserRole,
        UserProfile,
        UserSession,
        AdminProfile,
        AdminSession,
        City,
        CategoryTree,
        TeacherStatus,
        Teacher,
        TeacherAvailableSlot,
        TeacherPublicProfile,
        TeacherApplication,
        UserAccountRow,
        Course,
        CoursePriceOption,
        CourseSummary,
        CourseDetail,
        TeacherCard,
        OrderStatus,
        Order,
        OrderItem,
        OrderDetail,
        PurchaseSummary,
        ReservationStatus,
        Reservation,
        Review,
        ReviewPublic,
        Page<CourseSummary>,
        Page<Order>,
        Page<Reservation>,
        Page<ReviewPublic>,
        Page<TeacherApplication>,
        Page<UserAccountRow>,
        Page<Course>,
        Page<PurchaseSummary>,
    )),
    modifiers(&BearerAuth),
    tags(
        (name = auth::AUTH_TAG, description = "Signup, login, current account"),
        (name = users::USERS_TAG, description = "Profile management"),
        (name = catalog::CATALOG_TAG, description = "Cities and categories"),
        (name = teachers::TEACHERS_TAG, description = "Teacher profiles and availability"),
        (name = courses::COURSES_TAG, description = "Course catalog and price options"),
        (name = orders::ORDERS_TAG, description = "Orders and purchases"),
        (name = reservations::RESERVATIONS_TAG, description = "Session booking"),
        (name = reviews::REVIEWS_TAG, description = "Course reviews"),
        (name = admin::ADMIN_TAG, description = "Moderation console"),
    )
)]
pub struct ApiDoc;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_includes_core_paths() {
        let doc = ApiDoc::openapi();
        let paths = &doc.paths.paths;
        assert!(paths.contains_key("/api/auth/signup"));
        assert!(paths.contains_key("/api/courses"));
        assert!(paths.contains_key("/api/reservations/{id}/cancel"));
        assert!(paths.contains_key("/api/admin/teachers/{id}/approve"));
    }

    #[test]
    fn bearer_scheme_is_registered() {
        let doc = ApiDoc::openapi();
        let components = doc.components.expect("components");
        assert!(components.security_schemes.contains_key("bearer_auth"));
    }
}
