use crate::domain::{models::course::Course, ports::CourseRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::{SqlitePool, Row};
use chrono::{DateTime, Utc};

pub struct SqliteCourseRepo {
    pool: SqlitePool,
}

impl SqliteCourseRepo {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CourseRepository for SqliteCourseRepo {
    async fn create(&self, course: &Course) -> Result<Course, AppError> {
        sqlx::query_as::<_, Course>(
            "INSERT INTO courses (id, name, schedule_time, trainer_id, max_capacity, occupancy, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?)
             RETURNING *"
        )
            .bind(&course.id).bind(&course.name).bind(course.schedule_time).bind(&course.trainer_id)
            .bind(course.max_capacity).bind(course.occupancy).bind(course.created_at).bind(course.updated_at)
            .fetch_one(&self.pool).await.map_err(AppError::Database)
    }
    async fn find_by_id(&self, id: &str) -> Result<Option<Course>, AppError> {
        sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = ?").bind(id).fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_available(&self, now: DateTime<Utc>) -> Result<Vec<Course>, AppError> {
        sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE occupancy < max_capacity AND schedule_time > ? ORDER BY schedule_time ASC, id ASC").bind(now).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn list_by_trainer(&self, trainer_id: &str) -> Result<Vec<Course>, AppError> {
        sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE trainer_id = ? ORDER BY schedule_time ASC, id ASC").bind(trainer_id).fetch_all(&self.pool).await.map_err(AppError::Database)
    }
    async fn update_details(&self, course: &Course) -> Result<Option<Course>, AppError> {
        sqlx::query_as::<_, Course>(
            "UPDATE courses SET name=?, schedule_time=?, trainer_id=?, max_capacity=?, updated_at=?
             WHERE id=? AND occupancy <= ?
             RETURNING *"
        )
            .bind(&course.name).bind(course.schedule_time).bind(&course.trainer_id).bind(course.max_capacity)
            .bind(course.updated_at).bind(&course.id).bind(course.max_capacity)
            .fetch_optional(&self.pool).await.map_err(AppError::Database)
    }
    async fn set_occupancy(&self, id: &str, occupancy: i32) -> Result<(), AppError> {
        let result = sqlx::query("UPDATE courses SET occupancy = ?, updated_at = ? WHERE id = ?").bind(occupancy).bind(Utc::now()).bind(id).execute(&self.pool).await.map_err(AppError::Database)?;
        if result.rows_affected() == 0 { return Err(AppError::NotFound("Course not found".into())); }
        Ok(())
    }
    async fn reconcile_occupancy(&self, id: &str) -> Result<(Course, Course), AppError> {
        let mut tx = self.pool.begin().await.map_err(AppError::Database)?;
        // Write first so the transaction holds the write lock before counting.
        let touched = sqlx::query("UPDATE courses SET updated_at = ? WHERE id = ?").bind(Utc::now()).bind(id).execute(&mut *tx).await.map_err(AppError::Database)?;
        if touched.rows_affected() == 0 { return Err(AppError::NotFound("Course not found".into())); }

        let before = sqlx::query_as::<_, Course>("SELECT * FROM courses WHERE id = ?").bind(id).fetch_one(&mut *tx).await.map_err(AppError::Database)?;
        let counted: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM bookings WHERE course_id = ?").bind(id).fetch_one(&mut *tx).await.map_err(AppError::Database)?;
        let after = sqlx::query_as::<_, Course>("UPDATE courses SET occupancy = ? WHERE id = ? RETURNING *").bind(counted as i32).bind(id).fetch_one(&mut *tx).await.map_err(AppError::Database)?;
        tx.commit().await.map_err(AppError::Database)?;
        Ok((before, after))
    }
    async fn count(&self) -> Result<i64, AppError> {
        let result = sqlx::query("SELECT COUNT(*) as count FROM courses").fetch_one(&self.pool).await.map_err(AppError::Database)?;
        Ok(result.get::<i64, _>("count"))
    }
}
