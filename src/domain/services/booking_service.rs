use std::sync::Arc;
use chrono::{Duration, NaiveDate, NaiveTime};
use tracing::{info, warn};

use crate::domain::{
    models::booking::{Booking, BookingView, MemberView, TrainerBookingView, TrainerStats},
    ports::BookingRepository,
    services::course_service::CourseService,
};
use crate::error::AppError;

/// Owns the booking lifecycle and keeps course occupancy equal to the number of
/// active bookings.
pub struct BookingService {
    bookings: Arc<dyn BookingRepository>,
    courses: Arc<CourseService>,
}

impl BookingService {
    pub fn new(bookings: Arc<dyn BookingRepository>, courses: Arc<CourseService>) -> Self {
        Self { bookings, courses }
    }

    /// Reserves one seat of `course_id` for `user_id`.
    ///
    /// The fullness and duplicate checks here give early, precise rejections. The
    /// seat itself is taken by a conditional update inside the repository
    /// transaction, so a racing caller that passed the checks gets
    /// `ConcurrencyConflict` instead of overbooking the course.
    pub async fn book(&self, user_id: &str, course_id: &str) -> Result<Booking, AppError> {
        let course = self.courses.get_by_id(course_id).await?;

        if course.is_full() {
            info!("Booking rejected: course {} is full ({}/{})", course.id, course.occupancy, course.max_capacity);
            return Err(AppError::CourseFull(course.id));
        }

        if self.bookings.exists(user_id, course_id).await? {
            info!("Booking rejected: user {} already booked course {}", user_id, course_id);
            return Err(AppError::DuplicateBooking);
        }

        let booking = Booking::new(user_id.to_string(), course.id.clone());
        match self.bookings.book_seat(&booking).await {
            Ok(created) => {
                info!("Booking confirmed: {} (user {}, course {})", created.id, user_id, course_id);
                Ok(created)
            }
            Err(AppError::ConcurrencyConflict(id)) => {
                warn!("Booking lost the race for the last seat of course {}", id);
                Err(AppError::ConcurrencyConflict(id))
            }
            Err(e) => Err(e),
        }
    }

    /// Deletes a booking and frees its seat.
    pub async fn cancel(&self, booking_id: &str) -> Result<Booking, AppError> {
        let released = self.bookings.release_seat(booking_id).await?
            .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", booking_id)))?;

        if released.floor_hit {
            warn!(
                course_id = %released.booking.course_id,
                booking_id = %booking_id,
                "Occupancy was already zero on cancel; counter and bookings have drifted"
            );
        }

        info!("Booking cancelled: {} (course {})", booking_id, released.booking.course_id);
        Ok(released.booking)
    }

    pub async fn find_booking(&self, booking_id: &str) -> Result<Booking, AppError> {
        self.bookings.find_by_id(booking_id).await?
            .ok_or_else(|| AppError::NotFound(format!("Booking {} not found", booking_id)))
    }

    /// A member's bookings, earliest class first.
    pub async fn list_for_user(&self, user_id: &str) -> Result<Vec<BookingView>, AppError> {
        self.bookings.list_for_user(user_id).await
    }

    pub async fn list_for_course(&self, course_id: &str) -> Result<Vec<MemberView>, AppError> {
        self.courses.get_by_id(course_id).await?;
        self.bookings.list_for_course(course_id).await
    }

    /// Every booking on the trainer's courses, by class time then booking time.
    pub async fn list_for_trainer(&self, trainer_id: &str) -> Result<Vec<TrainerBookingView>, AppError> {
        self.bookings.list_for_trainer(trainer_id).await
    }

    /// Bookings on the trainer's courses scheduled on `date` (UTC day).
    pub async fn count_on_date_for_trainer(&self, trainer_id: &str, date: NaiveDate) -> Result<i64, AppError> {
        let start = date.and_time(NaiveTime::MIN).and_utc();
        let end = start + Duration::days(1);
        self.bookings.count_for_trainer_between(trainer_id, start, end).await
    }

    pub async fn count_unique_students_for_trainer(&self, trainer_id: &str) -> Result<i64, AppError> {
        self.bookings.count_unique_students_for_trainer(trainer_id).await
    }

    pub async fn trainer_stats(&self, trainer_id: &str, date: NaiveDate) -> Result<TrainerStats, AppError> {
        let courses = self.courses.list_by_trainer(trainer_id).await?;
        Ok(TrainerStats {
            course_count: courses.len(),
            bookings_on_date: self.count_on_date_for_trainer(trainer_id, date).await?,
            unique_students: self.count_unique_students_for_trainer(trainer_id).await?,
        })
    }
}
