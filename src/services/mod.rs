pub mod admin_service;
pub mod auth_service;
pub mod catalog_service;
pub mod course_service;
pub mod order_service;
pub mod reservation_service;
pub mod review_service;
pub mod teacher_service;
pub mod user_service;
