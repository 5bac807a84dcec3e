//! Session keys for admin authentication.
//!
//! Admin has a single shared password, so the session holds a flag rather
//! than an identity.

/// Session keys for admin authentication data.
pub mod keys {
    /// Set to `true` after a successful login.
    pub const ADMIN_LOGGED_IN: &str = "admin_logged_in";
}
