pub mod admin;
pub mod catalog;
pub mod course;
pub mod order;
pub mod purchase;
pub mod reservation;
pub mod review;
pub mod teacher;
pub mod user;
