//! Authentication extractors.

use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};
use axum_extra::extract::CookieJar;

use super::db as auth_db;
use crate::db::try_lock;
use crate::domain::{Principal, Role, UserId};
use crate::error::AppError;
use crate::session::is_well_formed_session_id;
use crate::state::AppState;

pub const SESSION_COOKIE_NAME: &str = "lms_session";

/// Authenticated request context.
/// Add this as a handler parameter to require authentication.
#[derive(Debug, Clone)]
pub struct AuthContext {
    pub user_id: UserId,
    pub role: Role,
    /// Token the request authenticated with (needed for logout)
    pub session_id: String,
}

impl AuthContext {
    pub fn principal(&self) -> Principal {
        Principal {
            user_id: self.user_id,
            role: self.role,
        }
    }
}

/// Session token from the cookie, or from an `Authorization: Bearer` header
fn session_token(parts: &Parts) -> Option<String> {
    let jar = CookieJar::from_headers(&parts.headers);
    if let Some(cookie) = jar.get(SESSION_COOKIE_NAME) {
        return Some(cookie.value().to_string());
    }
    parts
        .headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(|t| t.trim().to_string())
}

impl FromRequestParts<AppState> for AuthContext {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let session_id = session_token(parts)
            .filter(|id| is_well_formed_session_id(id))
            .ok_or_else(|| AppError::unauthorized("Please login to access this resource"))?;

        let conn = try_lock(&state.db)?;
        let principal = auth_db::get_session_principal(&conn, &session_id)?
            .ok_or_else(|| AppError::unauthorized("Session expired, please login again"))?;

        Ok(AuthContext {
            user_id: principal.user_id,
            role: principal.role,
            session_id,
        })
    }
}

/// Requires a role that may author courses (admin or superadmin).
pub struct AdminAuth(pub AuthContext);

impl FromRequestParts<AppState> for AdminAuth {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let auth = AuthContext::from_request_parts(parts, state).await?;
        if !auth.role.can_author_courses() {
            return Err(AppError::forbidden("You are not an admin"));
        }
        Ok(AdminAuth(auth))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    fn parts(header: (&str, &str)) -> Parts {
        let (parts, _) = Request::builder()
            .header(header.0, header.1)
            .body(())
            .unwrap()
            .into_parts();
        parts
    }

    #[test]
    fn test_token_from_cookie() {
        let p = parts(("cookie", "lms_session=abc; other=1"));
        assert_eq!(session_token(&p).as_deref(), Some("abc"));
    }

    #[test]
    fn test_token_from_bearer_header() {
        let p = parts(("authorization", "Bearer tok123"));
        assert_eq!(session_token(&p).as_deref(), Some("tok123"));
    }

    #[test]
    fn test_no_token() {
        let p = parts(("authorization", "Basic dXNlcjpwYXNz"));
        assert!(session_token(&p).is_none());
    }
}
