pub mod auth;
pub mod booking;
pub mod course;
pub mod health;
pub mod user;
