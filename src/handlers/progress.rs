//! Lecture completion, course progress and the learner dashboard.

use axum::{
  extract::{Query, State},
  http::StatusCode,
  response::IntoResponse,
  Json,
};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::auth::AuthContext;
use crate::catalog;
use crate::completion::{self, CourseProgress, MarkOutcome};
use crate::db::try_lock;
use crate::domain::{CourseId, LectureId, QuizProgressEntry};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressQuery {
  pub course: CourseId,
  pub lecture_id: Option<LectureId>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProgressDetail {
  quiz_passed: bool,
  completed_lectures: Vec<LectureId>,
  quiz_progress: Vec<QuizProgressEntry>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProgressResponse {
  course_progress_percentage: u32,
  completed_lectures: Vec<LectureId>,
  all_lectures: usize,
  /// Empty until a progress record exists
  progress: Vec<ProgressDetail>,
}

impl From<CourseProgress> for ProgressResponse {
  fn from(p: CourseProgress) -> Self {
    let progress = if p.has_record {
      vec![ProgressDetail {
        quiz_passed: p.quiz_all_passed,
        completed_lectures: p.completed_lectures.clone(),
        quiz_progress: p.quiz_progress,
      }]
    } else {
      Vec::new()
    };
    Self {
      course_progress_percentage: p.percentage,
      completed_lectures: p.completed_lectures,
      all_lectures: p.total_lectures,
      progress,
    }
  }
}

pub async fn mark_complete(
  State(state): State<AppState>,
  auth: AuthContext,
  Query(query): Query<ProgressQuery>,
) -> AppResult<impl IntoResponse> {
  let lecture_id = query
    .lecture_id
    .ok_or_else(|| AppError::bad_request("lectureId is required"))?;

  let conn = try_lock(&state.db)?;
  catalog::ensure_lecture_access(&conn, &auth.principal(), query.course)?;
  let response = match completion::mark_complete(&conn, auth.user_id, query.course, lecture_id)? {
    MarkOutcome::Added => (StatusCode::CREATED, Json(json!({ "message": "New progress added" }))),
    MarkOutcome::AlreadyRecorded => (StatusCode::OK, Json(json!({ "message": "Progress already recorded" }))),
  };
  Ok(response)
}

pub async fn get_progress(
  State(state): State<AppState>,
  auth: AuthContext,
  Query(query): Query<ProgressQuery>,
) -> AppResult<impl IntoResponse> {
  let conn = try_lock(&state.db)?;
  let progress = completion::get_progress(&conn, auth.user_id, query.course)?;
  Ok(Json(ProgressResponse::from(progress)))
}

pub async fn dashboard(State(state): State<AppState>, auth: AuthContext) -> AppResult<impl IntoResponse> {
  let conn = try_lock(&state.db)?;
  Ok(Json(completion::dashboard(&conn, auth.user_id)?))
}

pub async fn completed_courses(
  State(state): State<AppState>,
  auth: AuthContext,
) -> AppResult<impl IntoResponse> {
  let conn = try_lock(&state.db)?;
  let completed = completion::completed_courses(&conn, auth.user_id)?;
  Ok(Json(json!({ "completedCourses": completed })))
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::domain::QuizResult;

  fn progress(has_record: bool) -> CourseProgress {
    CourseProgress {
      percentage: if has_record { 50 } else { 0 },
      completed_lectures: if has_record { vec![3] } else { Vec::new() },
      total_lectures: 2,
      quiz_all_passed: has_record,
      quiz_progress: if has_record {
        vec![QuizProgressEntry::new(3, QuizResult { score: 2, passed: true })]
      } else {
        Vec::new()
      },
      has_record,
    }
  }

  #[test]
  fn test_response_without_record() {
    let json = serde_json::to_value(ProgressResponse::from(progress(false))).unwrap();
    assert_eq!(json["courseProgressPercentage"], 0);
    assert_eq!(json["allLectures"], 2);
    assert_eq!(json["completedLectures"], json!([]));
    assert_eq!(json["progress"], json!([]));
  }

  #[test]
  fn test_response_with_record() {
    let json = serde_json::to_value(ProgressResponse::from(progress(true))).unwrap();
    assert_eq!(json["courseProgressPercentage"], 50);
    assert_eq!(json["completedLectures"], json!([3]));
    assert_eq!(json["progress"][0]["quizPassed"], true);
    assert_eq!(json["progress"][0]["completedLectures"], json!([3]));
    assert_eq!(json["progress"][0]["quizProgress"].as_array().unwrap().len(), 1);
  }
}
