//! Authentication extractor for admin.
//!
//! Login sets a flag in the session; protected handlers take [`RequireAdmin`]
//! as an argument and never run without it.

use axum::{extract::FromRequestParts, http::request::Parts};
use tower_sessions::Session;

use crate::error::AppError;
use crate::models::keys;

/// Extractor that requires a logged-in admin session.
///
/// Rejects with 401 when the session has no admin flag.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(_admin: RequireAdmin) -> impl IntoResponse {
///     "only for admins"
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct RequireAdmin;

impl<S> FromRequestParts<S> for RequireAdmin
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        // Set by SessionManagerLayer
        let session = parts
            .extensions
            .get::<Session>()
            .ok_or_else(|| AppError::Internal("session layer missing".to_string()))?;

        if is_logged_in(session).await? {
            Ok(Self)
        } else {
            Err(AppError::Unauthorized("login required".to_string()))
        }
    }
}

/// Whether the session carries the admin flag.
///
/// # Errors
///
/// Returns an error if the session cannot be read.
pub async fn is_logged_in(session: &Session) -> Result<bool, tower_sessions::session::Error> {
    Ok(session
        .get::<bool>(keys::ADMIN_LOGGED_IN)
        .await?
        .unwrap_or(false))
}

/// Mark the session as logged in.
///
/// The session id is cycled first so a pre-login id cannot be reused.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_admin_flag(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(keys::ADMIN_LOGGED_IN, true).await
}

/// Drop the admin flag and the rest of the session (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn clear_admin_flag(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
