use crate::domain::{
    models::booking::{Booking, BookingView, MemberView, ReleasedSeat, TrainerBookingView},
    ports::BookingRepository,
};
use crate::error::{is_unique_violation, AppError};
use async_trait::async_trait;
use sqlx::{PgPool, Row};
use chrono::{DateTime, Utc};

pub struct PostgresBookingRepo {
    pool: PgPool,
}

impl PostgresBookingRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl BookingRepository for PostgresBookingRepo {
    async fn book_seat(&self, booking: &Booking) -> Result<Booking, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;

        // The conditional increment locks the course row; a concurrent booker blocks
        // here and re-evaluates the capacity predicate once this transaction ends.
        let claimed = sqlx::query("UPDATE courses SET occupancy = occupancy + 1, updated_at = $1 WHERE id = $2 AND occupancy < max_capacity")
            .bind(Utc::now()).bind(&booking.course_id)
            .execute(&mut *tx).await.map_err(AppError::Database)?;

        if claimed.rows_affected() == 0 {
            let exists = sqlx::query("SELECT 1 FROM courses WHERE id = $1").bind(&booking.course_id).fetch_optional(&mut *tx).await.map_err(AppError::Database)?;
            return Err(match exists {
                Some(_) => AppError::ConcurrencyConflict(booking.course_id.clone()),
                None => AppError::NotFound("Course not found".into()),
            });
        }

        let created = sqlx::query_as::<_, Booking>(
            "INSERT INTO bookings (id, user_id, course_id, created_at) VALUES ($1, $2, $3, $4) RETURNING *"
        )
            .bind(&booking.id).bind(&booking.user_id).bind(&booking.course_id).bind(booking.created_at)
            .fetch_one(&mut *tx).await
            .map_err(|e| if is_unique_violation(&e) { AppError::DuplicateBooking } else { AppError::Database(e) })?;

        tx.commit().await.map_err(AppError::Database)?;
        Ok(created)
    }
    async fn release_seat(&self, id: &str) -> Result<Option<ReleasedSeat>, AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        let Some(deleted) = sqlx::query_as::<_, Booking>("DELETE FROM bookings WHERE id = $1 RETURNING *").bind(id).fetch_optional(&mut *tx).await.map_err(AppError::Database)? else {
            return Ok(None);
        };
        let released = sqlx::query("UPDATE courses SET occupancy = occupancy - 1, updated_at = $1 WHERE id = $2 AND occupancy > 0")
            .bind(Utc::now()).bind(&deleted.course_id)
            .execute(&mut *tx).await.map_err(AppError::Database)?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok(Some(ReleasedSeat { floor_hit: released.rows_affected() == 0, booking: deleted }))
    }
    async fn find_by_id(&self, id: &str) -> Result<Option<Booking>, AppError> {
        sqlx::query_as::<_, Booking>("SELECT * FROM bookings WHERE id = $1").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn exists(&self, user_id: &str, course_id: &str) -> Result<bool, AppError> {
        sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM bookings WHERE user_id = $1 AND course_id = $2)").bind(user_id).bind(course_id).fetch_one(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_for_user(&self, user_id: &str) -> Result<Vec<BookingView>, AppError> {
        sqlx::query_as::<_, BookingView>(
            "SELECT b.id, b.course_id, c.name AS course_name, c.schedule_time, c.trainer_id, b.created_at AS booked_at
             FROM bookings b JOIN courses c ON b.course_id = c.id
             WHERE b.user_id = $1
             ORDER BY c.schedule_time ASC, b.id ASC"
        ).bind(user_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_for_course(&self, course_id: &str) -> Result<Vec<MemberView>, AppError> {
        sqlx::query_as::<_, MemberView>(
            "SELECT b.id AS booking_id, u.id AS user_id,
                    COALESCE(NULLIF(mp.name, ''), NULLIF(u.name, ''), u.phone, u.id) AS display_name,
                    COALESCE(NULLIF(mp.phone, ''), u.phone) AS phone,
                    b.created_at AS booked_at
             FROM bookings b
             JOIN users u ON b.user_id = u.id
             LEFT JOIN member_profiles mp ON mp.user_id = u.id
             WHERE b.course_id = $1
             ORDER BY b.created_at ASC, b.id ASC"
        ).bind(course_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_for_trainer(&self, trainer_id: &str) -> Result<Vec<TrainerBookingView>, AppError> {
        sqlx::query_as::<_, TrainerBookingView>(
            "SELECT b.id AS booking_id, c.id AS course_id, c.name AS course_name, c.schedule_time,
                    u.id AS user_id,
                    COALESCE(NULLIF(mp.name, ''), NULLIF(u.name, ''), u.phone, u.id) AS display_name,
                    COALESCE(NULLIF(mp.phone, ''), u.phone) AS phone,
                    b.created_at AS booked_at
             FROM bookings b
             JOIN courses c ON b.course_id = c.id
             JOIN users u ON b.user_id = u.id
             LEFT JOIN member_profiles mp ON mp.user_id = u.id
             WHERE c.trainer_id = $1
             ORDER BY c.schedule_time ASC, b.created_at ASC, b.id ASC"
        ).bind(trainer_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn count_for_trainer_between(&self, trainer_id: &str, start: DateTime<Utc>, end: DateTime<Utc>) -> Result<i64, AppError> {
        let result = sqlx::query(
            "SELECT COUNT(*) as count FROM bookings b JOIN courses c ON b.course_id = c.id
             WHERE c.trainer_id = $1 AND c.schedule_time >= $2 AND c.schedule_time < $3"
        ).bind(trainer_id).bind(start).bind(end).fetch_one(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.get::<i64, _>("count"))
    }
    async fn count_unique_students_for_trainer(&self, trainer_id: &str) -> Result<i64, AppError> {
        let result = sqlx::query(
            "SELECT COUNT(DISTINCT b.user_id) as count FROM bookings b JOIN courses c ON b.course_id = c.id WHERE c.trainer_id = $1"
        ).bind(trainer_id).fetch_one(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.get::<i64, _>("count"))
    }
}
