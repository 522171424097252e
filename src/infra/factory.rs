use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;
use sqlx::{postgres::{PgPoolOptions, PgConnectOptions}, sqlite::{SqlitePoolOptions, SqliteJournalMode, SqliteConnectOptions}};
use sqlx::{PgPool, SqlitePool, ConnectOptions};
use tracing::{info, error};
use tracing::log::LevelFilter;

use crate::config::Config;
use crate::state::AppState;
use crate::domain::ports::{BookingRepository, CourseRepository, UserRepository};
use crate::domain::services::{
    auth_service::AuthService, booking_service::BookingService, course_service::CourseService,
};
use crate::infra::repositories::{
    postgres_booking_repo::PostgresBookingRepo, postgres_course_repo::PostgresCourseRepo,
    postgres_user_repo::PostgresUserRepo,
    sqlite_booking_repo::SqliteBookingRepo, sqlite_course_repo::SqliteCourseRepo,
    sqlite_user_repo::SqliteUserRepo,
};

pub async fn bootstrap_state(config: &Config) -> AppState {
    let database_url = &config.database_url;

    let (user_repo, course_repo, booking_repo): (Arc<dyn UserRepository>, Arc<dyn CourseRepository>, Arc<dyn BookingRepository>) =
        if database_url.starts_with("postgres://") || database_url.starts_with("postgresql://") {
            info!("Initializing PostgreSQL connection...");

            let mut opts: PgConnectOptions = database_url.parse().expect("Invalid Postgres URL");
            opts = opts.log_statements(LevelFilter::Debug)
                .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

            let pool = PgPoolOptions::new()
                .max_connections(10)
                .acquire_timeout(Duration::from_secs(5))
                .connect_with(opts)
                .await
                .expect("Failed to connect to Postgres");

            run_postgres_migrations(&pool).await;

            (
                Arc::new(PostgresUserRepo::new(pool.clone())),
                Arc::new(PostgresCourseRepo::new(pool.clone())),
                Arc::new(PostgresBookingRepo::new(pool)),
            )
        } else {
            info!("Initializing SQLite connection with WAL Mode...");

            let opts = SqliteConnectOptions::from_str(database_url)
                .expect("Invalid SQLite connection string")
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
                .busy_timeout(Duration::from_secs(5))
                .foreign_keys(true)
                .log_statements(LevelFilter::Debug)
                .log_slow_statements(LevelFilter::Warn, Duration::from_millis(500));

            let pool = SqlitePoolOptions::new()
                .max_connections(5)
                .connect_with(opts)
                .await
                .expect("Failed to connect to SQLite");

            run_sqlite_migrations(&pool).await;

            (
                Arc::new(SqliteUserRepo::new(pool.clone())),
                Arc::new(SqliteCourseRepo::new(pool.clone())),
                Arc::new(SqliteBookingRepo::new(pool)),
            )
        };

    let state = build_state(config.clone(), user_repo, course_repo, booking_repo);

    if let Some((phone, password)) = config.bootstrap_admin()
        && let Err(e) = state.auth_service.ensure_admin(phone, password).await {
        error!("Failed to create bootstrap admin: {:?}", e);
    }

    state
}

/// Wires services over the given repositories.
pub fn build_state(
    config: Config,
    user_repo: Arc<dyn UserRepository>,
    course_repo: Arc<dyn CourseRepository>,
    booking_repo: Arc<dyn BookingRepository>,
) -> AppState {
    let course_service = Arc::new(CourseService::new(course_repo));
    let booking_service = Arc::new(BookingService::new(booking_repo, course_service.clone()));
    let auth_service = Arc::new(AuthService::new(user_repo.clone(), config.clone()));

    AppState {
        config,
        user_repo,
        course_service,
        booking_service,
        auth_service,
    }
}

async fn run_postgres_migrations(pool: &PgPool) {
    sqlx::migrate!("./migrations/postgres")
        .run(pool)
        .await
        .expect("Failed to run Postgres migrations");
}

async fn run_sqlite_migrations(pool: &SqlitePool) {
    sqlx::migrate!("./migrations/sqlite")
        .run(pool)
        .await
        .expect("Failed to run SQLite migrations");
}
