use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use crate::error::AppError;

#[derive(Debug, Serialize, Deserialize, FromRow, Clone, PartialEq)]
pub struct Course {
    pub id: String,
    pub name: String,
    pub schedule_time: DateTime<Utc>,
    pub trainer_id: String,
    pub max_capacity: i32,
    pub occupancy: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

pub struct NewCourseParams {
    pub name: String,
    pub schedule_time: DateTime<Utc>,
    pub trainer_id: String,
    pub max_capacity: i32,
}

impl NewCourseParams {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::Validation("Course name is required".into()));
        }
        if self.trainer_id.trim().is_empty() {
            return Err(AppError::Validation("Trainer is required".into()));
        }
        if self.max_capacity <= 0 {
            return Err(AppError::Validation("Capacity must be a positive number".into()));
        }
        Ok(())
    }
}

impl Course {
    /// A fresh course always starts with nobody booked.
    pub fn new(params: NewCourseParams) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            name: params.name.trim().to_string(),
            schedule_time: params.schedule_time,
            trainer_id: params.trainer_id,
            max_capacity: params.max_capacity,
            occupancy: 0,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn is_full(&self) -> bool {
        self.occupancy >= self.max_capacity
    }
}
