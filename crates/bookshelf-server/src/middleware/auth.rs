//! Admin authorization for mutating routes
//!
//! Expects `Authorization: Bearer <token>`. A missing, malformed, or expired
//! token is 401; a valid token without the admin role is 403. Verified
//! claims are placed in the request extensions.

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::auth::{AuthKeys, Claims, TokenError, ADMIN_ROLE};
use crate::error::AppError;

pub async fn require_admin(
    State(keys): State<AuthKeys>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = bearer_token(&request)
        .ok_or_else(|| AppError::Unauthorized("Missing bearer token".to_string()))?;

    let claims = keys.verify(token).map_err(|e| match e {
        TokenError::Expired => AppError::Unauthorized("Session has expired".to_string()),
        _ => AppError::Unauthorized("Invalid token".to_string()),
    })?;

    if claims.role != ADMIN_ROLE {
        tracing::warn!(subject = %claims.sub, role = %claims.role, "Non-admin token rejected");
        return Err(AppError::Forbidden("Admin access required".to_string()));
    }

    tracing::debug!(subject = %claims.sub, "Admin request authorized");
    request.extensions_mut().insert::<Claims>(claims);

    Ok(next.run(request).await)
}

fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::shared::test_helpers::{admin_token, test_keys};
    use axum::{body::Body, http::StatusCode, middleware, routing::post, Extension, Router};
    use tower::ServiceExt;
    use uuid::Uuid;

    fn app() -> Router {
        Router::new()
            .route(
                "/",
                post(|Extension(claims): Extension<Claims>| async move { claims.email }),
            )
            .route_layer(middleware::from_fn_with_state(test_keys(), require_admin))
    }

    async fn status_with(auth: Option<String>) -> StatusCode {
        let mut builder = axum::http::Request::builder().method("POST").uri("/");
        if let Some(value) = auth {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        app()
            .oneshot(builder.body(Body::empty()).unwrap())
            .await
            .unwrap()
            .status()
    }

    #[tokio::test]
    async fn test_admin_token_passes() {
        assert_eq!(
            status_with(Some(format!("Bearer {}", admin_token()))).await,
            StatusCode::OK
        );
    }

    #[tokio::test]
    async fn test_missing_or_invalid_token_is_401() {
        assert_eq!(status_with(None).await, StatusCode::UNAUTHORIZED);
        assert_eq!(
            status_with(Some("Bearer not-a-jwt".to_string())).await,
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_with(Some(format!("Basic {}", admin_token()))).await,
            StatusCode::UNAUTHORIZED
        );

        let foreign = AuthKeys::new("some-other-secret-entirely", 3600)
            .issue(Uuid::new_v4(), "admin@example.com", ADMIN_ROLE)
            .unwrap();
        assert_eq!(
            status_with(Some(format!("Bearer {}", foreign))).await,
            StatusCode::UNAUTHORIZED
        );
    }

    #[tokio::test]
    async fn test_wrong_role_is_403() {
        let token = test_keys()
            .issue(Uuid::new_v4(), "reader@example.com", "reader")
            .unwrap();
        assert_eq!(
            status_with(Some(format!("Bearer {}", token))).await,
            StatusCode::FORBIDDEN
        );
    }
}
