use crate::domain::{models::user::{User, MemberProfile}, ports::UserRepository};
use crate::error::AppError;
use async_trait::async_trait;
use sqlx::PgPool;
use tracing::error;

pub struct PostgresUserRepo {
    pool: PgPool,
}

impl PostgresUserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserRepository for PostgresUserRepo {
    async fn create(&self, user: &User) -> Result<User, AppError> {
        sqlx::query_as::<_, User>(
            "INSERT INTO users (id, phone, name, password_hash, role, status, created_at) VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING id, phone, name, password_hash, role, status, created_at",
        )
            .bind(&user.id)
            .bind(&user.phone)
            .bind(&user.name)
            .bind(&user.password_hash)
            .bind(&user.role)
            .bind(&user.status)
            .bind(user.created_at)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                error!("Postgres user insert failed: {:?}", e);
                AppError::Database(e)
            })
    }

    async fn find_by_phone(&self, phone: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>(
            "SELECT id, phone, name, password_hash, role, status, created_at FROM users WHERE phone = $1",
        )
            .bind(phone)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn find_by_id(&self, id: &str) -> Result<Option<User>, AppError> {
        sqlx::query_as::<_, User>(
            "SELECT id, phone, name, password_hash, role, status, created_at FROM users WHERE id = $1",
        )
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(AppError::Database)
    }

    async fn save_profile(&self, profile: &MemberProfile) -> Result<MemberProfile, AppError> {
        sqlx::query_as::<_, MemberProfile>(
            "INSERT INTO member_profiles (user_id, name, phone, updated_at) VALUES ($1, $2, $3, $4)
             ON CONFLICT (user_id) DO UPDATE SET name = excluded.name, phone = excluded.phone, updated_at = excluded.updated_at
             RETURNING user_id, name, phone, updated_at",
        )
            .bind(&profile.user_id)
            .bind(&profile.name)
            .bind(&profile.phone)
            .bind(profile.updated_at)
            .fetch_one(&self.pool)
            .await
            .map_err(AppError::Database)
    }
}
