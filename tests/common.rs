#![allow(dead_code)]

use gym_backend::{
    api::router::create_router,
    config::Config,
    domain::models::{
        course::{Course, NewCourseParams},
        user::{MemberProfile, Role, User},
    },
    infra::{
        factory::build_state,
        repositories::{
            sqlite_booking_repo::SqliteBookingRepo,
            sqlite_course_repo::SqliteCourseRepo,
            sqlite_user_repo::SqliteUserRepo,
        },
    },
    state::AppState,
};
use axum::{
    body::Body,
    http::{header, Request, StatusCode},
    Router,
};
use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::{Pool, Sqlite};
use std::str::FromStr;
use std::sync::Arc;
use tower::ServiceExt;
use uuid::Uuid;

pub const ADMIN_PHONE: &str = "13800000000";
pub const TEST_PASSWORD: &str = "s3cret-pass";

pub struct AuthHeaders {
    pub access_token: String,
    pub csrf_token: String,
}

pub struct TestApp {
    pub router: Router,
    pub pool: Pool<Sqlite>,
    pub db_filename: String,
    pub state: Arc<AppState>,
}

impl TestApp {
    pub async fn new() -> Self {
        let db_filename = format!("test_{}.db", Uuid::new_v4());
        let db_url = format!("sqlite://{}?mode=rwc", db_filename);

        let connection_options = SqliteConnectOptions::from_str(&db_url)
            .unwrap()
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .busy_timeout(std::time::Duration::from_secs(10))
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .max_connections(8)
            .connect_with(connection_options)
            .await
            .expect("Failed to connect to test db");

        sqlx::migrate!("./migrations/sqlite")
            .run(&pool)
            .await
            .expect("Failed to migrate test db");

        let priv_key_pem = include_str!("../tests/keys/test_private.pem");
        let pub_key_pem = include_str!("../tests/keys/test_public.pem");

        let config = Config {
            database_url: db_url.clone(),
            port: 0,
            jwt_secret_key: priv_key_pem.to_string(),
            jwt_public_key: pub_key_pem.to_string(),
            auth_issuer: "test-issuer".to_string(),
            admin_phone: None,
            admin_password: None,
        };

        let state = Arc::new(build_state(
            config,
            Arc::new(SqliteUserRepo::new(pool.clone())),
            Arc::new(SqliteCourseRepo::new(pool.clone())),
            Arc::new(SqliteBookingRepo::new(pool.clone())),
        ));

        let router = create_router(state.clone());

        Self {
            router,
            pool,
            db_filename,
            state,
        }
    }

    /// Inserts a user that can log in with `TEST_PASSWORD`.
    pub async fn seed_login_user(&self, phone: &str, role: Role) -> User {
        let hash = self.state.auth_service.hash_password(TEST_PASSWORD).unwrap();
        let user = User::new(phone.to_string(), None, hash, role);
        self.state.user_repo.create(&user).await.unwrap()
    }

    /// Inserts a user without a usable password. Service level tests never log in,
    /// so they skip the argon2 cost.
    pub async fn seed_user(&self, phone: &str, name: Option<&str>, role: Role) -> User {
        let user = User::new(phone.to_string(), name.map(str::to_string), "not-a-hash".to_string(), role);
        self.state.user_repo.create(&user).await.unwrap()
    }

    pub async fn seed_profile(&self, user_id: &str, name: Option<&str>, phone: Option<&str>) {
        self.state.user_repo.save_profile(&MemberProfile {
            user_id: user_id.to_string(),
            name: name.map(str::to_string),
            phone: phone.map(str::to_string),
            updated_at: Utc::now(),
        }).await.unwrap();
    }

    pub async fn seed_course(&self, name: &str, trainer_id: &str, capacity: i32, schedule_time: DateTime<Utc>) -> Course {
        self.state.course_service.create(NewCourseParams {
            name: name.to_string(),
            schedule_time,
            trainer_id: trainer_id.to_string(),
            max_capacity: capacity,
        }).await.unwrap()
    }

    /// A trainer plus a course tomorrow with the given capacity.
    pub async fn seed_trainer_course(&self, capacity: i32) -> (User, Course) {
        let trainer = self.seed_user(&format!("t-{}", Uuid::new_v4()), Some("Coach"), Role::Trainer).await;
        let course = self.seed_course("Spin", &trainer.id, capacity, Utc::now() + Duration::days(1)).await;
        (trainer, course)
    }

    pub async fn course(&self, course_id: &str) -> Course {
        self.state.course_service.get_by_id(course_id).await.unwrap()
    }

    pub async fn booking_rows(&self, course_id: &str) -> i64 {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM bookings WHERE course_id = ?")
            .bind(course_id)
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }

    pub async fn login(&self, phone: &str, password: &str) -> AuthHeaders {
        let payload = serde_json::json!({
            "phone": phone,
            "password": password
        });

        let response = self.router.clone().oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/v1/auth/login")
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(payload.to_string()))
                .unwrap()
        ).await.unwrap();

        if !response.status().is_success() {
            panic!("Login failed in test helper: status {}", response.status());
        }

        let cookies: Vec<String> = response.headers()
            .get_all(header::SET_COOKIE)
            .iter()
            .map(|h| h.to_str().unwrap().to_string())
            .collect();

        let access_token_cookie = cookies.iter()
            .find(|c| c.contains("access_token="))
            .expect("No access_token cookie returned");

        let start = access_token_cookie.find("access_token=").unwrap() + 13;
        let end = access_token_cookie[start..].find(';').unwrap_or(access_token_cookie.len() - start);
        let access_token = access_token_cookie[start..start + end].to_string();

        let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body_json: Value = serde_json::from_slice(&body_bytes).unwrap();
        let csrf_token = body_json["csrf_token"].as_str().expect("No csrf_token in body").to_string();

        AuthHeaders {
            access_token,
            csrf_token,
        }
    }

    /// Sends a request with the session cookie and CSRF header attached.
    pub async fn send(&self, method: &str, uri: &str, auth: Option<&AuthHeaders>, body: Option<Value>) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(auth) = auth {
            builder = builder
                .header(header::COOKIE, format!("access_token={}", auth.access_token))
                .header("X-CSRF-Token", &auth.csrf_token);
        }
        let body = match body {
            Some(json) => {
                builder = builder.header(header::CONTENT_TYPE, "application/json");
                Body::from(json.to_string())
            }
            None => Body::empty(),
        };

        let response = self.router.clone().oneshot(builder.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes).unwrap_or(Value::Null) };
        (status, json)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        let _ = std::fs::remove_file(&self.db_filename);
        let _ = std::fs::remove_file(format!("{}-wal", self.db_filename));
        let _ = std::fs::remove_file(format!("{}-shm", self.db_filename));
    }
}
