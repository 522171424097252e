use serde::Serialize;
use crate::domain::models::{booking::MemberView, course::Course};

#[derive(Serialize)]
pub struct UserCreatedResponse {
    pub id: String,
    pub phone: String,
    pub role: String,
}

#[derive(Serialize)]
pub struct CourseRosterResponse {
    pub course: Course,
    pub members: Vec<MemberView>,
}

#[derive(Serialize)]
pub struct AdminStatsResponse {
    pub course_count: i64,
}
