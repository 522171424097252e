use std::sync::Arc;
use crate::domain::{
    models::{auth::{Claims, TOKEN_AUDIENCE}, user::{Role, User}},
    ports::UserRepository,
};
use crate::error::AppError;
use crate::config::Config;
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use jsonwebtoken::{encode, EncodingKey, Header, Algorithm};
use uuid::Uuid;
use chrono::{Utc, Duration};
use rand::{distributions::Alphanumeric, rngs::OsRng, Rng};
use tracing::info;

pub struct AuthService {
    users: Arc<dyn UserRepository>,
    config: Config,
    encoding_key: EncodingKey,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserRepository>, config: Config) -> Self {
        let encoding_key = EncodingKey::from_ed_pem(config.jwt_secret_key.as_bytes())
            .expect("Invalid JWT Private Key PEM");

        Self { users, config, encoding_key }
    }

    pub fn hash_password(&self, password: &str) -> Result<String, AppError> {
        let salt = SaltString::generate(&mut OsRng);
        Argon2::default()
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|_| AppError::Internal)
    }

    /// Credential check: the user behind `phone` when `password` matches, `None` otherwise.
    pub async fn verify_credentials(&self, phone: &str, password: &str) -> Result<Option<User>, AppError> {
        let Some(user) = self.users.find_by_phone(phone).await? else {
            return Ok(None);
        };

        let parsed_hash = PasswordHash::new(&user.password_hash)
            .map_err(|_| AppError::Internal)?;

        match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
            Ok(()) if user.status == "ACTIVE" => Ok(Some(user)),
            _ => Ok(None),
        }
    }

    /// Signs a short-lived access token. Returns the token and its CSRF companion.
    pub fn issue_access_token(&self, user: &User) -> Result<(String, String), AppError> {
        let csrf_token: String = rand::thread_rng().sample_iter(&Alphanumeric).take(32).map(char::from).collect();
        let now = Utc::now();
        let exp = (now + Duration::minutes(60)).timestamp() as usize;

        let claims = Claims {
            iss: self.config.auth_issuer.clone(),
            sub: user.id.clone(),
            aud: TOKEN_AUDIENCE.to_string(),
            exp,
            iat: now.timestamp() as usize,
            jti: Uuid::new_v4().to_string(),
            role: user.role.clone(),
            csrf_token: csrf_token.clone(),
        };

        let access_token = encode(&Header::new(Algorithm::EdDSA), &claims, &self.encoding_key)
            .map_err(|e| {
                tracing::error!("JWT encoding failed: {}", e);
                AppError::Internal
            })?;

        Ok((access_token, csrf_token))
    }

    /// Creates the configured admin account on first start.
    pub async fn ensure_admin(&self, phone: &str, password: &str) -> Result<(), AppError> {
        if self.users.find_by_phone(phone).await?.is_some() {
            return Ok(());
        }
        let admin = User::new(phone.to_string(), Some("Administrator".to_string()), self.hash_password(password)?, Role::Admin);
        self.users.create(&admin).await?;
        info!("Bootstrap admin account created: {}", admin.id);
        Ok(())
    }
}
