use axum::{extract::State, response::IntoResponse, Json};
use crate::state::AppState;
use crate::api::extractors::auth::AuthUser;
use crate::api::dtos::{requests::CreateUserRequest, responses::UserCreatedResponse};
use crate::domain::models::user::{MemberProfile, Role, User};
use crate::error::AppError;
use std::sync::Arc;
use chrono::Utc;
use tracing::info;

pub async fn create_user(
    State(state): State<Arc<AppState>>,
    admin: AuthUser,
    Json(payload): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    admin.require(&[Role::Admin])?;

    let role: Role = payload.role.parse().map_err(AppError::Validation)?;
    let phone = payload.phone.trim().to_string();
    if phone.is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation("Phone and password are required".into()));
    }
    if state.user_repo.find_by_phone(&phone).await?.is_some() {
        return Err(AppError::Conflict("Phone already registered".into()));
    }

    let password_hash = state.auth_service.hash_password(&payload.password)?;
    let user = User::new(phone, payload.name, password_hash, role);
    let created = state.user_repo.create(&user).await?;

    if payload.profile_name.is_some() || payload.profile_phone.is_some() {
        state.user_repo.save_profile(&MemberProfile {
            user_id: created.id.clone(),
            name: payload.profile_name,
            phone: payload.profile_phone,
            updated_at: Utc::now(),
        }).await?;
    }

    info!("Created {} user: {}", created.role, created.id);

    Ok(Json(UserCreatedResponse {
        id: created.id,
        phone: created.phone,
        role: created.role,
    }))
}
