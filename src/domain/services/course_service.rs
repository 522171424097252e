use std::sync::Arc;
use chrono::{DateTime, Utc};
use tracing::{info, warn};

use crate::domain::{
    models::course::{Course, NewCourseParams},
    ports::CourseRepository,
};
use crate::error::AppError;

/// Source of truth for course capacity, occupancy and schedule.
pub struct CourseService {
    repo: Arc<dyn CourseRepository>,
}

impl CourseService {
    pub fn new(repo: Arc<dyn CourseRepository>) -> Self {
        Self { repo }
    }

    pub async fn get_by_id(&self, course_id: &str) -> Result<Course, AppError> {
        self.repo.find_by_id(course_id).await?
            .ok_or_else(|| AppError::NotFound(format!("Course {} not found", course_id)))
    }

    /// Courses with a free seat whose schedule lies after `now`, earliest first.
    pub async fn list_available(&self, now: DateTime<Utc>) -> Result<Vec<Course>, AppError> {
        self.repo.list_available(now).await
    }

    pub async fn list_by_trainer(&self, trainer_id: &str) -> Result<Vec<Course>, AppError> {
        self.repo.list_by_trainer(trainer_id).await
    }

    pub async fn create(&self, params: NewCourseParams) -> Result<Course, AppError> {
        params.validate()?;
        let course = Course::new(params);
        let created = self.repo.create(&course).await?;
        info!("Course created: {} ({}) capacity {}", created.id, created.name, created.max_capacity);
        Ok(created)
    }

    pub async fn update(&self, course_id: &str, params: NewCourseParams) -> Result<Course, AppError> {
        params.validate()?;
        let existing = self.get_by_id(course_id).await?;

        let candidate = Course {
            name: params.name.trim().to_string(),
            schedule_time: params.schedule_time,
            trainer_id: params.trainer_id,
            max_capacity: params.max_capacity,
            updated_at: Utc::now(),
            ..existing
        };

        match self.repo.update_details(&candidate).await? {
            Some(updated) => {
                info!("Course updated: {}", updated.id);
                Ok(updated)
            }
            None => {
                // Either removed meanwhile or capacity now below the booked seats.
                let current = self.get_by_id(course_id).await?;
                Err(AppError::Validation(format!(
                    "Capacity {} is below the {} seats already booked",
                    candidate.max_capacity, current.occupancy
                )))
            }
        }
    }

    /// Writes the occupancy counter. Values outside `0..=max_capacity` are rejected.
    pub async fn set_occupancy(&self, course_id: &str, occupancy: i32) -> Result<(), AppError> {
        let course = self.get_by_id(course_id).await?;
        if occupancy < 0 || occupancy > course.max_capacity {
            return Err(AppError::Validation(format!(
                "Occupancy {} outside 0..={}", occupancy, course.max_capacity
            )));
        }
        self.repo.set_occupancy(course_id, occupancy).await
    }

    /// Recomputes occupancy from the active bookings of the course.
    pub async fn reconcile_occupancy(&self, course_id: &str) -> Result<Course, AppError> {
        let (before, after) = self.repo.reconcile_occupancy(course_id).await?;
        if before.occupancy != after.occupancy {
            warn!(
                course_id = %course_id,
                stored = before.occupancy,
                counted = after.occupancy,
                "Occupancy drift repaired"
            );
        }
        Ok(after)
    }

    pub async fn count(&self) -> Result<i64, AppError> {
        self.repo.count().await
    }
}
