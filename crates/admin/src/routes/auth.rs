//! Authentication route handlers.
//!
//! A single shared password from `ADMIN_PASSWORD`. A correct password sets
//! the session flag checked by [`RequireAdmin`](crate::middleware::RequireAdmin).

use axum::{Json, extract::State};
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tower_sessions::Session;
use tracing::instrument;

use crate::error::{AppError, Result};
use crate::middleware::{clear_admin_flag, is_logged_in, set_admin_flag};
use crate::state::AppState;

/// Login form.
#[derive(Deserialize)]
pub struct LoginRequest {
    pub password: String,
}

impl std::fmt::Debug for LoginRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginRequest")
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// Session login state.
#[derive(Debug, Serialize)]
pub struct AuthStatus {
    pub logged_in: bool,
}

/// Compare two strings in constant time.
///
/// Runtime depends only on the length, not on where the inputs differ.
fn constant_time_compare(a: &str, b: &str) -> bool {
    if a.len() != b.len() {
        return false;
    }

    let mut result: u8 = 0;
    for (x, y) in a.bytes().zip(b.bytes()) {
        result |= x ^ y;
    }
    result == 0
}

/// Check the password and mark the session as logged in.
#[instrument(skip(state, session, request))]
pub async fn login(
    State(state): State<AppState>,
    session: Session,
    Json(request): Json<LoginRequest>,
) -> Result<Json<AuthStatus>> {
    let expected = state.config().password.expose_secret();
    if !constant_time_compare(&request.password, expected) {
        tracing::warn!("admin login failed");
        return Err(AppError::Unauthorized("wrong password".to_string()));
    }

    set_admin_flag(&session).await?;
    tracing::info!("admin logged in");
    Ok(Json(AuthStatus { logged_in: true }))
}

/// Drop the session.
#[instrument(skip(session))]
pub async fn logout(session: Session) -> Result<Json<AuthStatus>> {
    clear_admin_flag(&session).await?;
    Ok(Json(AuthStatus { logged_in: false }))
}

/// Report whether the session is logged in.
#[instrument(skip(session))]
pub async fn status(session: Session) -> Result<Json<AuthStatus>> {
    Ok(Json(AuthStatus {
        logged_in: is_logged_in(&session).await?,
    }))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::StatusCode;
    use serde_json::json;

    use super::*;
    use crate::test_support::{TEST_PASSWORD, TestApp};

    #[test]
    fn test_constant_time_compare() {
        assert!(constant_time_compare("secret", "secret"));
        assert!(!constant_time_compare("secret", "secreT"));
        assert!(!constant_time_compare("secret", "secret2"));
        assert!(constant_time_compare("", ""));
    }

    #[test]
    fn test_login_request_debug_redacts_password() {
        let request = LoginRequest {
            password: "hunter2".to_string(),
        };
        assert!(!format!("{request:?}").contains("hunter2"));
    }

    #[tokio::test]
    async fn test_login_sets_flag() {
        let app = TestApp::new();
        let (status, body) = app.get("/auth/status").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["logged_in"], false);

        let (status, body) = app
            .post("/auth/login", json!({ "password": TEST_PASSWORD }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["logged_in"], true);

        let (_, body) = app.get("/auth/status").await;
        assert_eq!(body["logged_in"], true);
    }

    #[tokio::test]
    async fn test_wrong_password_rejected() {
        let app = TestApp::new();
        let (status, _) = app
            .post("/auth/login", json!({ "password": "not-the-password" }))
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _) = app.get("/api/products").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_logout_revokes_access() {
        let app = TestApp::logged_in().await;
        let (status, _) = app.get("/api/products").await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = app.post("/auth/logout", json!({})).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["logged_in"], false);

        let (status, _) = app.get("/api/products").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }
}
