use mediator::Request;
use serde::{Deserialize, Serialize};

use crate::auth::{password::hash_password, ADMIN_ROLE};
use crate::features::admins::types::{
    AdminRow, AdminSession, AdminState, NAME_MAX_LENGTH, PASSWORD_MAX_LENGTH, PASSWORD_MIN_LENGTH,
};
use crate::features::shared::error_helpers::map_unique_violation;
use crate::features::shared::validation::{
    validate_email, validate_required_text, FieldValidationError,
};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegisterAdminCommand {
    pub name: Option<String>,
    pub email: Option<String>,
    #[serde(skip_serializing)]
    pub password: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum RegisterAdminError {
    #[error("Admin registration is disabled")]
    Disabled,
    #[error(transparent)]
    Validation(#[from] FieldValidationError),
    #[error("password must be between {min} and {max} characters")]
    WeakPassword { min: usize, max: usize },
    #[error("An admin with email '{0}' already exists")]
    DuplicateEmail(String),
    #[error("Failed to secure password")]
    Hashing,
    #[error("Failed to issue token")]
    Token,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl Request<Result<AdminSession, RegisterAdminError>> for RegisterAdminCommand {}

impl crate::cqrs::middleware::Command for RegisterAdminCommand {}

/// Validated registration input
#[derive(Debug)]
pub struct NewAdmin {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl RegisterAdminCommand {
    pub fn validate(self) -> Result<NewAdmin, RegisterAdminError> {
        let name = validate_required_text("name", self.name.as_deref(), NAME_MAX_LENGTH)?;
        let email = validate_email(self.email.as_deref())?;

        let password = self.password.unwrap_or_default();
        let length = password.chars().count();
        if !(PASSWORD_MIN_LENGTH..=PASSWORD_MAX_LENGTH).contains(&length) {
            return Err(RegisterAdminError::WeakPassword {
                min: PASSWORD_MIN_LENGTH,
                max: PASSWORD_MAX_LENGTH,
            });
        }

        Ok(NewAdmin {
            name,
            email,
            password,
        })
    }
}

#[tracing::instrument(skip(state, command))]
pub async fn handle(
    state: AdminState,
    command: RegisterAdminCommand,
) -> Result<AdminSession, RegisterAdminError> {
    if !state.registration_enabled {
        return Err(RegisterAdminError::Disabled);
    }

    let NewAdmin {
        name,
        email,
        password,
    } = command.validate()?;

    let password_hash = tokio::task::spawn_blocking(move || hash_password(&password))
        .await
        .map_err(|_| RegisterAdminError::Hashing)?
        .map_err(|_| RegisterAdminError::Hashing)?;

    let admin = sqlx::query_as::<_, AdminRow>(
        r#"
        INSERT INTO admins (name, email, password_hash, role)
        VALUES ($1, $2, $3, $4)
        RETURNING id, name, email, password_hash, role, created_at
        "#,
    )
    .bind(&name)
    .bind(&email)
    .bind(&password_hash)
    .bind(ADMIN_ROLE)
    .fetch_one(&state.db)
    .await
    .map_err(|e| {
        map_unique_violation(e, RegisterAdminError::DuplicateEmail(email.clone()), Into::into)
    })?;

    let token = state
        .keys
        .issue(admin.id, &admin.email, &admin.role)
        .map_err(|_| RegisterAdminError::Token)?;

    tracing::info!(admin_id = %admin.id, email = %admin.email, "Admin registered");

    Ok(AdminSession::new(admin, token))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::test_keys;
    use sqlx::PgPool;

    fn command(name: &str, email: &str, password: &str) -> RegisterAdminCommand {
        RegisterAdminCommand {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            password: Some(password.to_string()),
        }
    }

    fn state(db: PgPool, registration_enabled: bool) -> AdminState {
        AdminState {
            db,
            keys: test_keys(),
            registration_enabled,
        }
    }

    #[test]
    fn test_validate_normalizes_email() {
        let admin = command(" Ada ", "Ada@Example.com", "long enough").validate().unwrap();
        assert_eq!(admin.name, "Ada");
        assert_eq!(admin.email, "ada@example.com");
    }

    #[test]
    fn test_validate_rejects_bad_input() {
        assert!(matches!(
            command("", "ada@example.com", "long enough").validate(),
            Err(RegisterAdminError::Validation(FieldValidationError::Required { field: "name" }))
        ));
        assert!(matches!(
            command("Ada", "not-an-email", "long enough").validate(),
            Err(RegisterAdminError::Validation(_))
        ));
        assert!(matches!(
            command("Ada", "ada@example.com", "short").validate(),
            Err(RegisterAdminError::WeakPassword { .. })
        ));
    }

    #[tokio::test]
    async fn test_disabled_registration_never_touches_database() {
        let db = PgPool::connect_lazy("postgres://localhost:1/unreachable").unwrap();
        let err = handle(state(db, false), command("Ada", "ada@example.com", "long enough"))
            .await
            .unwrap_err();
        assert!(matches!(err, RegisterAdminError::Disabled));
    }

    #[sqlx::test(migrations = "../../migrations")]
    #[ignore = "requires DATABASE_URL"]
    async fn test_register_then_duplicate(pool: PgPool) {
        let session = handle(
            state(pool.clone(), true),
            command("Ada", "ada@example.com", "long enough"),
        )
        .await
        .unwrap();
        assert_eq!(session.role, ADMIN_ROLE);
        assert_eq!(test_keys().verify(&session.token).unwrap().sub, session.id);

        let err = handle(
            state(pool, true),
            command("Ada Again", "ADA@example.com", "long enough"),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RegisterAdminError::DuplicateEmail(_)));
    }
}
