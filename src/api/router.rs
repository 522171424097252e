use axum::{
    body::Body,
    extract::Request,
    routing::{get, post, delete},
    Router,
};
use std::sync::Arc;
use std::time::Duration;
use crate::state::AppState;
use crate::api::handlers::{health, auth, user, course, booking};
use tower_http::{
    trace::TraceLayer,
    classify::ServerErrorsFailureClass,
};
use tower_cookies::CookieManagerLayer;
use tracing::{info_span, Span, error, info};
use uuid::Uuid;

pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health::health_check))

        // Auth
        .route("/api/v1/auth/login", post(auth::login))
        .route("/api/v1/auth/register", post(auth::register))
        .route("/api/v1/auth/logout", post(auth::logout))

        // Admin
        .route("/api/v1/users", post(user::create_user))
        .route("/api/v1/admin/stats", get(course::admin_stats))

        // Courses
        .route("/api/v1/courses", get(course::list_available_courses).post(course::create_course))
        .route("/api/v1/courses/{course_id}", get(course::get_course).put(course::update_course))
        .route("/api/v1/courses/{course_id}/reconcile", post(course::reconcile_course))
        .route("/api/v1/courses/{course_id}/members", get(course::course_members))

        // Booking
        .route("/api/v1/courses/{course_id}/book", post(booking::create_booking))
        .route("/api/v1/bookings", get(booking::list_my_bookings))
        .route("/api/v1/bookings/{booking_id}", delete(booking::cancel_booking))

        // Trainer dashboard
        .route("/api/v1/trainer/courses", get(course::trainer_courses))
        .route("/api/v1/trainer/stats", get(course::trainer_stats))
        .route("/api/v1/trainer/bookings", get(booking::trainer_bookings))

        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<Body>| {
                    let request_id = Uuid::new_v4().to_string();
                    info_span!(
                        "http_request",
                        request_id = %request_id,
                        method = ?request.method(),
                        uri = ?request.uri(),
                        version = ?request.version(),
                        user_id = tracing::field::Empty,
                    )
                })
                .on_request(|request: &Request<Body>, _span: &Span| {
                    info!("started processing request: {} {}", request.method(), request.uri().path());
                })
                .on_response(|response: &axum::http::Response<Body>, latency: Duration, _span: &Span| {
                    info!(
                        status = response.status().as_u16(),
                        latency_ms = latency.as_millis(),
                        "finished processing request"
                    );
                })
                .on_failure(|error: ServerErrorsFailureClass, _latency: Duration, _span: &Span| {
                    error!("request failed: {:?}", error);
                })
        )
        .layer(CookieManagerLayer::new())
        .with_state(state)
}
