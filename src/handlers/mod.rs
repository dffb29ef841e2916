pub mod admin;
pub mod auth;
pub mod catalog;
pub mod courses;
pub mod orders;
pub mod reservations;
pub mod reviews;
pub mod teachers;
pub mod users;
