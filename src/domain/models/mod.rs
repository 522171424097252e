pub mod auth;
pub mod booking;
pub mod course;
pub mod user;
