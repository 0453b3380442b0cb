//! Quiz reading, submission and authoring.

use axum::{
  extract::{Path, State},
  response::IntoResponse,
  Json,
};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth::{AdminAuth, AuthContext};
use crate::catalog;
use crate::completion::quiz::{self, INVALID_QUIZ};
use crate::db::try_lock;
use crate::domain::{scalar_text, LectureId, QuizQuestion};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SubmitRequest {
  #[serde(default)]
  pub answers: Vec<Value>,
}

/// Questions from a `{ "quiz": [...] }` body
fn questions_from(body: &Value) -> AppResult<Vec<QuizQuestion>> {
  let quiz = body.get("quiz").ok_or_else(|| AppError::bad_request(INVALID_QUIZ))?;
  serde_json::from_value(quiz.clone()).map_err(|e| {
    tracing::debug!("Rejected quiz payload: {}", e);
    AppError::bad_request(INVALID_QUIZ)
  })
}

pub async fn get_quiz(
  State(state): State<AppState>,
  auth: AuthContext,
  Path(lecture_id): Path<LectureId>,
) -> AppResult<impl IntoResponse> {
  let conn = try_lock(&state.db)?;
  let quiz = quiz::get_quiz(&conn, &auth.principal(), lecture_id)?;
  Ok(Json(json!({ "quiz": quiz })))
}

pub async fn submit_quiz(
  State(state): State<AppState>,
  auth: AuthContext,
  Path(lecture_id): Path<LectureId>,
  Json(req): Json<SubmitRequest>,
) -> AppResult<impl IntoResponse> {
  let answers: Vec<Option<String>> = req.answers.iter().map(scalar_text).collect();

  let conn = try_lock(&state.db)?;
  catalog::accessible_lecture(&conn, &auth.principal(), lecture_id)?;
  let outcome = quiz::submit_quiz(&conn, auth.user_id, lecture_id, &answers)?;
  let message = if outcome.passed {
    "Quiz passed!"
  } else {
    "Quiz failed. Try again."
  };
  Ok(Json(json!({
    "total": outcome.total,
    "correct": outcome.score,
    "passed": outcome.passed,
    "message": message,
  })))
}

pub async fn create_quiz(
  State(state): State<AppState>,
  AdminAuth(auth): AdminAuth,
  Path(lecture_id): Path<LectureId>,
  Json(body): Json<Value>,
) -> AppResult<impl IntoResponse> {
  let questions = questions_from(&body)?;
  let conn = try_lock(&state.db)?;
  let quiz = quiz::add_quiz_questions(&conn, &auth.principal(), lecture_id, questions)?;
  Ok(Json(json!({ "message": "Quiz added successfully", "quiz": quiz })))
}

pub async fn update_quiz(
  State(state): State<AppState>,
  AdminAuth(auth): AdminAuth,
  Path(lecture_id): Path<LectureId>,
  Json(body): Json<Value>,
) -> AppResult<impl IntoResponse> {
  let questions = questions_from(&body)?;
  let conn = try_lock(&state.db)?;
  let quiz = quiz::replace_quiz(&conn, &auth.principal(), lecture_id, questions)?;
  Ok(Json(json!({ "message": "Quiz updated successfully", "quiz": quiz })))
}

pub async fn clear_quiz(
  State(state): State<AppState>,
  AdminAuth(auth): AdminAuth,
  Path(lecture_id): Path<LectureId>,
) -> AppResult<impl IntoResponse> {
  let conn = try_lock(&state.db)?;
  quiz::clear_quiz(&conn, &auth.principal(), lecture_id)?;
  Ok(Json(json!({ "message": "Quiz deleted successfully" })))
}

/// Latest attempt of every user for one lecture
pub async fn quiz_results(
  State(state): State<AppState>,
  AdminAuth(auth): AdminAuth,
  Path(lecture_id): Path<LectureId>,
) -> AppResult<impl IntoResponse> {
  let conn = try_lock(&state.db)?;
  let results = quiz::quiz_results_for_lecture(&conn, &auth.principal(), lecture_id)?;
  Ok(Json(json!({ "results": results })))
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_questions_from_body() {
    let body = json!({ "quiz": [{ "question": "2+2?", "options": ["4", "5"], "correctAnswer": "4" }] });
    let questions = questions_from(&body).unwrap();
    assert_eq!(questions.len(), 1);
    assert_eq!(questions[0].correct_answer, "4");

    let body = json!({ "quiz": [{ "question": "2+2?", "options": [4, 5], "correctAnswer": 4 }] });
    let questions = questions_from(&body).unwrap();
    assert_eq!(questions[0].correct_answer, "4");
    assert_eq!(questions[0].options, vec!["4", "5"]);

    for bad in [json!({}), json!({ "quiz": "nope" }), json!({ "quiz": [{ "options": [] }] })] {
      let err = questions_from(&bad).unwrap_err();
      assert_eq!(err.to_string(), INVALID_QUIZ);
    }
  }
}
