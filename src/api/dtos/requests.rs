use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;

#[derive(Deserialize)]
pub struct LoginRequest {
    pub phone: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct RegisterRequest {
    pub phone: String,
    pub password: String,
    pub name: Option<String>,
}

#[derive(Deserialize)]
pub struct CreateUserRequest {
    pub phone: String,
    pub password: String,
    pub role: String,
    pub name: Option<String>,
    pub profile_name: Option<String>,
    pub profile_phone: Option<String>,
}

#[derive(Deserialize)]
pub struct CourseRequest {
    pub name: String,
    pub schedule_time: DateTime<Utc>,
    pub trainer_id: String,
    pub max_capacity: i32,
}

#[derive(Deserialize)]
pub struct TrainerStatsQuery {
    pub date: Option<NaiveDate>,
}
