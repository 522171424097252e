use crate::domain::models::{
    course::Course,
    booking::{Booking, BookingView, MemberView, ReleasedSeat, TrainerBookingView},
    user::{User, MemberProfile},
};
use crate::error::AppError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CourseRepository: Send + Sync {
    async fn create(&self, course: &Course) -> Result<Course, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Course>, AppError>;
    async fn list_available(&self, now: DateTime<Utc>) -> Result<Vec<Course>, AppError>;
    async fn list_by_trainer(&self, trainer_id: &str) -> Result<Vec<Course>, AppError>;
    /// Rewrites name, schedule, trainer and capacity while keeping occupancy.
    /// Returns `None` when the course is missing or the new capacity is below the
    /// current occupancy.
    async fn update_details(&self, course: &Course) -> Result<Option<Course>, AppError>;
    async fn set_occupancy(&self, id: &str, occupancy: i32) -> Result<(), AppError>;
    /// Recounts active bookings and stores the result, in one transaction.
    /// Returns the course before and after the write.
    async fn reconcile_occupancy(&self, id: &str) -> Result<(Course, Course), AppError>;
    async fn count(&self) -> Result<i64, AppError>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Inserts the booking and takes one seat of its course atomically.
    /// Fails with `NotFound`, `ConcurrencyConflict` (no seat left) or `DuplicateBooking`.
    async fn book_seat(&self, booking: &Booking) -> Result<Booking, AppError>;
    /// Deletes the booking and gives its seat back atomically. `None` when the
    /// booking no longer exists.
    async fn release_seat(&self, id: &str) -> Result<Option<ReleasedSeat>, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError>;
    async fn exists(&self, user_id: &str, course_id: &str) -> Result<bool, AppError>;
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<BookingView>, AppError>;
    async fn list_for_course(&self, course_id: &str) -> Result<Vec<MemberView>, AppError>;
    async fn list_for_trainer(&self, trainer_id: &str) -> Result<Vec<TrainerBookingView>, AppError>;
    async fn count_for_trainer_between(&self, trainer_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<i64, AppError>;
    async fn count_unique_students_for_trainer(&self, trainer_id: &str) -> Result<i64, AppError>;
}

#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: &User) -> Result<User, AppError>;
    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, AppError>;
    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError>;
    async fn save_profile(&self, profile: &MemberProfile) -> Result<MemberProfile, AppError>;
}
