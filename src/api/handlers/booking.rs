use axum::{extract::{State, Path}, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::domain::models::user::Role;
use crate::error::AppError;
use std::sync::Arc;
use tracing::info;

pub async fn create_booking(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(course_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let member = user.require(&[Role::Member])?;
    info!("create_booking: member {} requests course {}", member.id, course_id);

    let created = state.booking_service.book(&member.id, &course_id).await?;
    Ok(Json(created))
}

pub async fn list_my_bookings(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let member = user.require(&[Role::Member])?;
    let bookings = state.booking_service.list_for_user(&member.id).await?;
    Ok(Json(bookings))
}

pub async fn cancel_booking(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(booking_id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let caller = user.require(&[Role::Member, Role::Trainer, Role::Admin])?;

    let booking = state.booking_service.find_booking(&booking_id).await?;
    match caller.role {
        Role::Member if booking.user_id != caller.id => {
            return Err(AppError::Forbidden("Booking belongs to another member".into()));
        }
        Role::Trainer => {
            let course = state.course_service.get_by_id(&booking.course_id).await?;
            if course.trainer_id != caller.id {
                return Err(AppError::Forbidden("Booking is on another trainer's course".into()));
            }
        }
        _ => {}
    }

    state.booking_service.cancel(&booking_id).await?;
    info!("cancel_booking: {} cancelled {} by {}", caller.role, booking_id, caller.id);
    Ok(Json(serde_json::json!({"status": "cancelled"})))
}

pub async fn trainer_bookings(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, AppError> {
    let trainer = user.require(&[Role::Trainer])?;
    let bookings = state.booking_service.list_for_trainer(&trainer.id).await?;
    Ok(Json(bookings))
}
