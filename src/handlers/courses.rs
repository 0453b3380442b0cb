//! Course and lecture reads.

use axum::{
  extract::{Path, State},
  response::IntoResponse,
  Json,
};
use serde_json::json;

use crate::auth::{AdminAuth, AuthContext};
use crate::catalog;
use crate::completion;
use crate::db::try_lock;
use crate::domain::{CourseId, LectureId};
use crate::error::AppResult;
use crate::state::AppState;

pub async fn list_courses(State(state): State<AppState>) -> AppResult<impl IntoResponse> {
  let conn = try_lock(&state.db)?;
  let courses = catalog::list_courses(&conn)?;
  Ok(Json(json!({ "courses": courses })))
}

pub async fn get_course(
  State(state): State<AppState>,
  Path(course_id): Path<CourseId>,
) -> AppResult<impl IntoResponse> {
  let conn = try_lock(&state.db)?;
  let course = catalog::get_course(&conn, course_id)?;
  Ok(Json(json!({ "course": course })))
}

pub async fn list_lectures(
  State(state): State<AppState>,
  auth: AuthContext,
  Path(course_id): Path<CourseId>,
) -> AppResult<impl IntoResponse> {
  let conn = try_lock(&state.db)?;
  let lectures = catalog::list_lectures(&conn, &auth.principal(), course_id)?;
  Ok(Json(json!({ "lectures": lectures })))
}

pub async fn get_lecture(
  State(state): State<AppState>,
  auth: AuthContext,
  Path(lecture_id): Path<LectureId>,
) -> AppResult<impl IntoResponse> {
  let conn = try_lock(&state.db)?;
  let lecture = catalog::get_lecture(&conn, &auth.principal(), lecture_id)?;
  Ok(Json(json!({ "lecture": lecture })))
}

pub async fn all_lectures(
  State(state): State<AppState>,
  AdminAuth(auth): AdminAuth,
) -> AppResult<impl IntoResponse> {
  let conn = try_lock(&state.db)?;
  let lectures = catalog::all_lectures(&conn, &auth.principal())?;
  Ok(Json(json!({ "lectures": lectures })))
}

/// Courses the caller is subscribed to, with lecture counts
pub async fn my_courses(State(state): State<AppState>, auth: AuthContext) -> AppResult<impl IntoResponse> {
  let conn = try_lock(&state.db)?;
  let courses = completion::my_courses(&conn, auth.user_id)?;
  Ok(Json(json!({ "courses": courses })))
}
