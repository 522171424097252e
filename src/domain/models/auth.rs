use serde::{Deserialize, Serialize};

pub const TOKEN_AUDIENCE: &str = "gym-frontend";

#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub iss: String,
    pub sub: String,
    pub aud: String,
    pub exp: usize,
    pub iat: usize,
    pub jti: String,

    #[serde(rename = "https://gym-backend.local/claims/role")]
    pub role: String,

    #[serde(rename = "https://gym-backend.local/claims/csrf")]
    pub csrf_token: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub csrf_token: String,
    pub user: UserProfile,
}

#[derive(Serialize)]
pub struct UserProfile {
    pub id: String,
    pub phone: String,
    pub name: Option<String>,
    pub role: String,
}
