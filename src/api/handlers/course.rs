use axum::{extract::{State, Path, Query}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::{
    requests::{CourseRequest, TrainerStatsQuery},
    responses::{AdminStatsResponse, CourseRosterResponse},
};
use crate::domain::models::{course::NewCourseParams, user::Role};
use crate::error::AppError;
use std::sync::Arc;
use chrono::Utc;

impl From<CourseRequest> for NewCourseParams {
    fn from(req: CourseRequest) -> Self {
        Self {
            name: req.name,
            schedule_time: req.schedule_time,
            trainer_id: req.trainer_id,
            max_capacity: req.max_capacity,
        }
    }
}

/// Trainer ids on course writes must point at a trainer account.
async fn ensure_trainer(state: &AppState, trainer_id: &str) -> Result<(), AppError> {
    let trainer = state.user_repo.find_by_id(trainer_id).await?
        .ok_or_else(|| AppError::Validation(format!("Trainer {} does not exist", trainer_id)))?;
    if trainer.role() != Some(Role::Trainer) {
        return Err(AppError::Validation(format!("User {} is not a trainer", trainer_id)));
    }
    Ok(())
}

pub async fn list_available_courses(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let courses = state.course_service.list_available(Utc::now()).await?;
    Ok(Json(courses))
}

pub async fn get_course(
    State(state): State<Arc<AppState>>,
    _user: AuthUser,
    Path(course_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let course = state.course_service.get_by_id(&course_id).await?;
    Ok(Json(course))
}

pub async fn create_course(
    State(state): State<Arc<AppState>>,
    admin: AuthUser,
    Json(payload): Json<CourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    admin.require(&[Role::Admin])?;
    let params = NewCourseParams::from(payload);
    params.validate()?;
    ensure_trainer(&state, &params.trainer_id).await?;

    let created = state.course_service.create(params).await?;
    Ok(Json(created))
}

pub async fn update_course(
    State(state): State<Arc<AppState>>,
    admin: AuthUser,
    Path(course_id): Path<String>,
    Json(payload): Json<CourseRequest>,
) -> Result<impl IntoResponse, AppError> {
    admin.require(&[Role::Admin])?;
    let params = NewCourseParams::from(payload);
    params.validate()?;
    ensure_trainer(&state, &params.trainer_id).await?;

    let updated = state.course_service.update(&course_id, params).await?;
    Ok(Json(updated))
}

pub async fn reconcile_course(
    State(state): State<Arc<AppState>>,
    admin: AuthUser,
    Path(course_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    admin.require(&[Role::Admin])?;
    let course = state.course_service.reconcile_occupancy(&course_id).await?;
    Ok(Json(course))
}

pub async fn course_members(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(course_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let caller = user.require(&[Role::Admin, Role::Trainer])?;
    let course = state.course_service.get_by_id(&course_id).await?;
    if caller.role == Role::Trainer && course.trainer_id != caller.id {
        return Err(AppError::Forbidden("Course belongs to another trainer".into()));
    }

    let members = state.booking_service.list_for_course(&course_id).await?;
    Ok(Json(CourseRosterResponse { course, members }))
}

pub async fn trainer_courses(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let trainer = user.require(&[Role::Trainer])?;
    let courses = state.course_service.list_by_trainer(&trainer.id).await?;
    Ok(Json(courses))
}

pub async fn trainer_stats(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Query(query): Query<TrainerStatsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let trainer = user.require(&[Role::Trainer])?;
    let date = query.date.unwrap_or_else(|| Utc::now().date_naive());
    let stats = state.booking_service.trainer_stats(&trainer.id, date).await?;
    Ok(Json(stats))
}

pub async fn admin_stats(
    State(state): State<Arc<AppState>>,
    admin: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    admin.require(&[Role::Admin])?;
    let course_count = state.course_service.count().await?;
    Ok(Json(AdminStatsResponse { course_count }))
}
