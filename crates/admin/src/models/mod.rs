//! Session-stored state for admin.

pub mod session;

pub use session::keys;
