use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};

use crate::api::response::ErrorResponse;

use super::commands::{LoginAdminCommand, LoginAdminError, RegisterAdminCommand, RegisterAdminError};
use super::types::AdminState;

pub fn admins_routes() -> Router<AdminState> {
    Router::new()
        .route("/register", post(register_admin))
        .route("/login", post(login_admin))
}

#[tracing::instrument(skip(state, body))]
async fn register_admin(
    State(state): State<AdminState>,
    body: Result<Json<RegisterAdminCommand>, JsonRejection>,
) -> Result<Response, AdminApiError> {
    let Json(command) = body?;
    let session = super::commands::register::handle(state, command).await?;

    Ok((StatusCode::CREATED, Json(session)).into_response())
}

#[tracing::instrument(skip(state, body))]
async fn login_admin(
    State(state): State<AdminState>,
    body: Result<Json<LoginAdminCommand>, JsonRejection>,
) -> Result<Response, AdminApiError> {
    let Json(command) = body?;
    let session = super::commands::login::handle(state, command).await?;

    Ok((StatusCode::OK, Json(session)).into_response())
}

#[derive(Debug)]
enum AdminApiError {
    BadBody(JsonRejection),
    RegisterError(RegisterAdminError),
    LoginError(LoginAdminError),
}

impl From<JsonRejection> for AdminApiError {
    fn from(err: JsonRejection) -> Self {
        Self::BadBody(err)
    }
}

impl From<RegisterAdminError> for AdminApiError {
    fn from(err: RegisterAdminError) -> Self {
        Self::RegisterError(err)
    }
}

impl From<LoginAdminError> for AdminApiError {
    fn from(err: LoginAdminError) -> Self {
        Self::LoginError(err)
    }
}

impl IntoResponse for AdminApiError {
    fn into_response(self) -> Response {
        let (status, code, message) = match self {
            AdminApiError::BadBody(rejection) => (
                StatusCode::BAD_REQUEST,
                "VALIDATION_ERROR",
                rejection.body_text(),
            ),

            AdminApiError::RegisterError(err) => match err {
                RegisterAdminError::Disabled => {
                    (StatusCode::FORBIDDEN, "FORBIDDEN", err.to_string())
                }
                RegisterAdminError::Validation(_) | RegisterAdminError::WeakPassword { .. } => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", err.to_string())
                }
                RegisterAdminError::DuplicateEmail(_) => {
                    (StatusCode::CONFLICT, "CONFLICT", err.to_string())
                }
                RegisterAdminError::Hashing
                | RegisterAdminError::Token
                | RegisterAdminError::Database(_) => {
                    tracing::error!("Admin registration failed: {}", err);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },

            AdminApiError::LoginError(err) => match err {
                LoginAdminError::InvalidCredentials => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", err.to_string())
                }
                LoginAdminError::Hashing | LoginAdminError::Token | LoginAdminError::Database(_) => {
                    tracing::error!("Admin login failed: {}", err);
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "INTERNAL_ERROR",
                        "An internal error occurred".to_string(),
                    )
                }
            },
        };

        (status, Json(ErrorResponse::new(code, message))).into_response()
    }
}
