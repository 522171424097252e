use axum::{extract::State, response::IntoResponse, Json, http::StatusCode};
use crate::state::AppState;
use crate::error::AppError;
use crate::api::dtos::{requests::{LoginRequest, RegisterRequest}, responses::UserCreatedResponse};
use crate::domain::models::{auth::{AuthResponse, UserProfile}, user::{Role, User}};
use std::sync::Arc;
use tower_cookies::{Cookies, Cookie};
use tower_cookies::cookie::SameSite;
use time::Duration;
use tracing::{info, warn};

pub async fn login(
    State(state): State<Arc<AppState>>,
    cookies: Cookies,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let Some(user) = state.auth_service.verify_credentials(&payload.phone, &payload.password).await? else {
        warn!("Rejected login for {}", payload.phone);
        return Err(AppError::Unauthorized);
    };

    let (access_jwt, csrf_token) = state.auth_service.issue_access_token(&user)?;

    let mut access_c = Cookie::new("access_token", access_jwt);
    access_c.set_http_only(true);
    access_c.set_secure(true);
    access_c.set_same_site(SameSite::Strict);
    access_c.set_path("/");
    access_c.set_max_age(Duration::minutes(60));
    cookies.add(access_c);

    info!("User logged in: {}", user.id);

    Ok(Json(AuthResponse {
        csrf_token,
        user: UserProfile {
            id: user.id,
            phone: user.phone,
            name: user.name,
            role: user.role,
        }
    }))
}

/// Self-service sign-up. Always creates a member account.
pub async fn register(
    State(state): State<Arc<AppState>>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    let phone = payload.phone.trim().to_string();
    if phone.is_empty() || payload.password.is_empty() {
        return Err(AppError::Validation("Phone and password are required".into()));
    }
    if state.user_repo.find_by_phone(&phone).await?.is_some() {
        return Err(AppError::Conflict("Phone already registered".into()));
    }

    let password_hash = state.auth_service.hash_password(&payload.password)?;
    let name = payload.name.filter(|n| !n.trim().is_empty());
    let created = state.user_repo.create(&User::new(phone, name, password_hash, Role::Member)).await?;

    info!("Member registered: {}", created.id);

    Ok(Json(UserCreatedResponse {
        id: created.id,
        phone: created.phone,
        role: created.role,
    }))
}

pub async fn logout(cookies: Cookies) -> impl IntoResponse {
    cookies.remove(Cookie::build(("access_token", "")).path("/").into());
    info!("User logged out");
    StatusCode::OK
}
