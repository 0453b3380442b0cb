//! Accounts, sessions and the authenticated principal.

pub mod db;
pub mod handlers;
pub mod middleware;
pub mod password;

pub use handlers::*;
pub use middleware::{AdminAuth, AuthContext, SESSION_COOKIE_NAME};
