use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::auth::password::{verify_password, DUMMY_PASSWORD_HASH};
use crate::features::admins::types::{AdminRow, AdminSession, AdminState};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoginAdminCommand {
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum LoginAdminError {
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Failed to verify password")]
    Hashing,
    #[error("Failed to issue token")]
    Token,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<AdminSession, LoginAdminError>> for LoginAdminCommand {}

impl crate::cqrs::middleware::Command for LoginAdminCommand {}

#[tracing::instrument(skip(state, command))]
pub async fn handle(
    state: AdminState,
    command: LoginAdminCommand,
) -> Result<AdminSession, LoginAdminError> {
    let email = command
        .email
        .as_deref()
        .map(|e| e.trim().to_lowercase())
        .filter(|e| !e.is_empty())
        .ok_or(LoginAdminError::InvalidCredentials)?;
    let password = command
        .password
        .filter(|p| !p.is_empty())
        .ok_or(LoginAdminError::InvalidCredentials)?;

    let admin = sqlx::query_as::<_, AdminRow>(
        r#"
        SELECT id, name, email, password_hash, role, created_at
        FROM admins
        WHERE LOWER(email) = $1
        "#,
    )
    .bind(&email)
    .fetch_optional(&state.db)
    .await?;

    // Unknown emails still pay for one argon2 verification
    let stored_hash = admin
        .as_ref()
        .map(|a| a.password_hash.clone())
        .unwrap_or_else(|| DUMMY_PASSWORD_HASH.to_string());
    let verified = tokio::task::spawn_blocking(move || verify_password(&password, &stored_hash))
        .await
        .map_err(|_| LoginAdminError::Hashing)?
        .map_err(|_| LoginAdminError::Hashing)?;

    let admin = match admin {
        Some(admin) if verified => admin,
        _ => {
            tracing::warn!(%email, "Rejected admin login");
            return Err(LoginAdminError::InvalidCredentials);
        }
    };

    let token = state
        .keys
        .issue(admin.id, &admin.email, &admin.role)
        .map_err(|_| LoginAdminError::Token)?;

    tracing::info!(admin_id = %admin.id, "Admin logged in");

    Ok(AdminSession::new(admin, token))
}
