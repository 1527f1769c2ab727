use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth::AuthKeys;

pub const NAME_MAX_LENGTH: usize = 100;
pub const PASSWORD_MIN_LENGTH: usize = 8;
pub const PASSWORD_MAX_LENGTH: usize = 128;

/// State shared by the admin handlers
#[derive(Clone)]
pub struct AdminState {
    pub db: PgPool,
    pub keys: AuthKeys,
    pub registration_enabled: bool,
}

#[derive(Debug, Clone, sqlx::FromRow)]
pub struct AdminRow {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: String,
    pub role: String,
    pub created_at: DateTime<Utc>,
}

/// Returned by register and login
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AdminSession {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: String,
    pub token: String,
}

impl AdminSession {
    pub fn new(admin: AdminRow, token: String) -> Self {
        Self {
            id: admin.id,
            name: admin.name,
            email: admin.email,
            role: admin.role,
            token,
        }
    }
}
