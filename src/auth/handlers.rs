//! Account handlers: register, login, logout, profile.

use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use axum_extra::extract::cookie::{Cookie, CookieJar};
use serde::Deserialize;
use serde_json::json;

use super::db as auth_db;
use super::middleware::{AuthContext, SESSION_COOKIE_NAME};
use super::password;
use crate::db::{try_lock, LogOnError};
use crate::domain::Role;
use crate::error::{AppError, AppResult};
use crate::session::generate_session_id;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    pub phone: Option<String>,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub phone: Option<String>,
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => !local.is_empty() && domain.contains('.') && !email.contains(' '),
        None => false,
    }
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> AppResult<impl IntoResponse> {
    let name = req.name.trim();
    let email = req.email.trim();
    if name.is_empty() || email.is_empty() || req.password.is_empty() {
        return Err(AppError::bad_request("Please enter all fields"));
    }
    if !is_plausible_email(email) {
        return Err(AppError::bad_request("Please enter a valid email"));
    }

    let password_hash = password::hash_password(&req.password)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {}", e)))?;

    let conn = try_lock(&state.db)?;
    if auth_db::email_exists(&conn, email)? {
        return Err(AppError::conflict("User already exists"));
    }
    let phone = req.phone.as_deref().map(str::trim).filter(|p| !p.is_empty());
    let user_id = auth_db::create_user(&conn, name, email, phone, &password_hash, Role::User)?;
    let user = auth_db::get_user_by_id(&conn, user_id)?
        .ok_or_else(|| AppError::internal("User vanished after insert"))?;

    tracing::info!("Registered user {} ({})", user_id, email);
    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User registered", "user": user })),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(req): Json<LoginRequest>,
) -> AppResult<impl IntoResponse> {
    if req.email.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::bad_request("Please enter all fields"));
    }

    let conn = try_lock(&state.db)?;
    let (user, password_hash) = auth_db::get_user_by_email(&conn, req.email.trim())?
        .ok_or_else(|| AppError::unauthorized("Invalid email or password"))?;

    if !password::verify_password(&req.password, &password_hash) {
        return Err(AppError::unauthorized("Invalid email or password"));
    }

    // Log but don't fail on bookkeeping errors
    auth_db::update_last_login(&conn, user.id).log_warn("Failed to update last login");
    let pruned = auth_db::cleanup_expired_sessions(&conn).log_warn_default("Failed to prune sessions");
    if pruned > 0 {
        tracing::debug!("Pruned {} expired sessions", pruned);
    }

    let session_id = generate_session_id();
    let hours = state.config.session_hours;
    auth_db::create_session(&conn, user.id, &session_id, hours)?;
    drop(conn);

    let session_cookie = Cookie::build((SESSION_COOKIE_NAME, session_id.clone()))
        .path("/")
        .http_only(true)
        .secure(false) // Set to true in production with HTTPS
        .max_age(time::Duration::hours(hours))
        .build();

    tracing::info!("User {} logged in", user.id);
    Ok((
        jar.add(session_cookie),
        Json(json!({
            "message": format!("Welcome back {}", user.name),
            "token": session_id,
            "user": user,
        })),
    ))
}

pub async fn logout(
    State(state): State<AppState>,
    auth: AuthContext,
    jar: CookieJar,
) -> AppResult<impl IntoResponse> {
    let conn = try_lock(&state.db)?;
    auth_db::delete_session(&conn, &auth.session_id)?;
    drop(conn);

    let session_cookie = Cookie::build((SESSION_COOKIE_NAME, ""))
        .path("/")
        .max_age(time::Duration::seconds(0))
        .build();

    Ok((
        jar.remove(session_cookie),
        Json(json!({ "message": "Logged out" })),
    ))
}

pub async fn me(State(state): State<AppState>, auth: AuthContext) -> AppResult<impl IntoResponse> {
    let conn = try_lock(&state.db)?;
    let user = auth_db::get_user_by_id(&conn, auth.user_id)?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(Json(json!({ "user": user })))
}

pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthContext,
    Json(req): Json<UpdateProfileRequest>,
) -> AppResult<impl IntoResponse> {
    let name = req.name.as_deref().map(str::trim).filter(|n| !n.is_empty());
    let phone = req.phone.as_deref().map(str::trim).filter(|p| !p.is_empty());
    if name.is_none() && phone.is_none() {
        return Err(AppError::bad_request("Nothing to update"));
    }

    let conn = try_lock(&state.db)?;
    auth_db::update_user_profile(&conn, auth.user_id, name, phone)?;
    let user = auth_db::get_user_by_id(&conn, auth.user_id)?
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(Json(json!({ "message": "Profile updated", "user": user })))
}
