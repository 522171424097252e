use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct Booking {
    pub id: String,
    pub user_id: String,
    pub course_id: String,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn new(user_id: String, course_id: String) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            user_id,
            course_id,
            created_at: Utc::now(),
        }
    }
}

/// A member's booking joined with the course it reserves.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct BookingView {
    pub id: String,
    pub course_id: String,
    pub course_name: String,
    pub schedule_time: DateTime<Utc>,
    pub trainer_id: String,
    pub booked_at: DateTime<Utc>,
}

/// One attendee row of a course roster.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct MemberView {
    pub booking_id: String,
    pub user_id: String,
    pub display_name: String,
    pub phone: String,
    pub booked_at: DateTime<Utc>,
}

/// A roster row across all courses of one trainer.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct TrainerBookingView {
    pub booking_id: String,
    pub course_id: String,
    pub course_name: String,
    pub schedule_time: DateTime<Utc>,
    pub user_id: String,
    pub display_name: String,
    pub phone: String,
    pub booked_at: DateTime<Utc>,
}

/// Outcome of deleting a booking. `floor_hit` is set when the course counter was
/// already zero and could not be decremented.
#[derive(Debug, Clone)]
pub struct ReleasedSeat {
    pub booking: Booking,
    pub floor_hit: bool,
}

#[derive(Debug, Serialize, Clone, PartialEq)]
pub struct TrainerStats {
    pub course_count: usize,
    pub bookings_on_date: i64,
    pub unique_students: i64,
}
