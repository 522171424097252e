use serde::{Deserialize, Serialize};
use uuid::Uuid;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Role {
    Admin,
    Trainer,
    Member,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "ADMIN",
            Role::Trainer => "TRAINER",
            Role::Member => "MEMBER",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "ADMIN" => Ok(Role::Admin),
            "TRAINER" => Ok(Role::Trainer),
            "MEMBER" => Ok(Role::Member),
            other => Err(format!("Unknown role: {}", other)),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct User {
    pub id: String,
    pub phone: String,
    pub name: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub role: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn new(phone: String, name: Option<String>, password_hash: String, role: Role) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            phone,
            name,
            password_hash,
            role: role.as_str().to_string(),
            status: "ACTIVE".to_string(),
            created_at: Utc::now(),
        }
    }

    pub fn role(&self) -> Option<Role> {
        self.role.parse().ok()
    }
}

/// Optional member details; when present they take precedence over the account
/// fields on course rosters.
#[derive(Debug, Serialize, Deserialize, FromRow, Clone)]
pub struct MemberProfile {
    pub user_id: String,
    pub name: Option<String>,
    pub phone: Option<String>,
    pub updated_at: DateTime<Utc>,
}
