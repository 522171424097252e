use std::sync::Arc;
use crate::domain::ports::UserRepository;
use crate::domain::services::{
    auth_service::AuthService, booking_service::BookingService, course_service::CourseService,
};
use crate::config::Config;

#[derive(Clone)]
pub struct AppState {
    pub config: Config,
    pub user_repo: Arc<dyn UserRepository>,
    pub course_service: Arc<CourseService>,
    pub booking_service: Arc<BookingService>,
    pub auth_service: Arc<AuthService>,
}
