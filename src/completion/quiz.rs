//! Quiz scoring, submission and authoring.
//!
//! Answers are compared index by index against each question's correct
//! answer after trimming, NFC normalization and case folding. A quiz is
//! passed with at least half of the answers right, rounded up.

use rusqlite::Connection;
use serde::Serialize;
use unicode_normalization::UnicodeNormalization;

use crate::catalog::{accessible_lecture, owned_lecture};
use crate::db::{self, LectureQuizResult};
use crate::domain::{LectureId, Principal, PublicQuizQuestion, QuizQuestion, QuizResult, UserId};
use crate::error::{AppError, AppResult};

pub const NO_QUIZ: &str = "No quiz found for this lecture";
pub const INVALID_QUIZ: &str = "Quiz data invalid";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct QuizOutcome {
  pub total: usize,
  pub score: u32,
  pub passed: bool,
}

impl QuizOutcome {
  pub fn result(&self) -> QuizResult {
    QuizResult {
      score: self.score,
      passed: self.passed,
    }
  }
}

/// Quiz as shown to a caller: authors get the answer key, learners do not
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum QuizView {
  Full(Vec<QuizQuestion>),
  Public(Vec<PublicQuizQuestion>),
}

/// Canonical form used to compare an answer with the key
pub fn normalize_answer(input: &str) -> String {
  input.trim().nfc().collect::<String>().to_lowercase()
}

/// Minimum score needed to pass a quiz of `len` questions
pub fn pass_threshold(len: usize) -> usize {
  len.div_ceil(2)
}

pub fn evaluate(quiz: &[QuizQuestion], answers: &[Option<String>]) -> QuizOutcome {
  let score = quiz
    .iter()
    .zip(answers.iter())
    .filter(|(question, answer)| match answer {
      Some(given) => normalize_answer(given) == normalize_answer(&question.correct_answer),
      None => false,
    })
    .count();

  QuizOutcome {
    total: quiz.len(),
    score: score as u32,
    passed: score >= pass_threshold(quiz.len()),
  }
}

/// Score a submission and record it as the user's latest attempt
pub fn submit_quiz(
  conn: &Connection,
  user_id: UserId,
  lecture_id: LectureId,
  answers: &[Option<String>],
) -> AppResult<QuizOutcome> {
  let lecture = db::get_lecture_by_id(conn, lecture_id)?
    .ok_or_else(|| AppError::not_found("Lecture not found"))?;
  if !lecture.has_quiz() {
    return Err(AppError::bad_request(NO_QUIZ));
  }

  let outcome = evaluate(&lecture.quiz, answers);
  db::upsert_quiz_result(conn, user_id, lecture_id, outcome.result())?;

  tracing::info!(
    "User {} scored {}/{} on lecture {} (passed: {})",
    user_id,
    outcome.score,
    outcome.total,
    lecture_id,
    outcome.passed
  );
  Ok(outcome)
}

// ==================== Authoring ====================

fn validate_questions(questions: &[QuizQuestion]) -> AppResult<()> {
  if questions.is_empty() {
    return Err(AppError::bad_request(INVALID_QUIZ));
  }
  let all_valid = questions
    .iter()
    .all(|q| !q.question.trim().is_empty() && !q.correct_answer.trim().is_empty());
  if !all_valid {
    return Err(AppError::bad_request(INVALID_QUIZ));
  }
  Ok(())
}

/// Append questions to a lecture's quiz; returns the whole quiz
pub fn add_quiz_questions(
  conn: &Connection,
  principal: &Principal,
  lecture_id: LectureId,
  questions: Vec<QuizQuestion>,
) -> AppResult<Vec<QuizQuestion>> {
  validate_questions(&questions)?;
  let (lecture, _) = owned_lecture(conn, principal, lecture_id)?;

  let mut quiz = lecture.quiz;
  quiz.extend(questions);
  db::set_quiz(conn, lecture_id, &quiz)?;
  Ok(quiz)
}

pub fn replace_quiz(
  conn: &Connection,
  principal: &Principal,
  lecture_id: LectureId,
  questions: Vec<QuizQuestion>,
) -> AppResult<Vec<QuizQuestion>> {
  validate_questions(&questions)?;
  owned_lecture(conn, principal, lecture_id)?;
  db::set_quiz(conn, lecture_id, &questions)?;
  Ok(questions)
}

/// Remove the quiz; the lecture no longer gates completion
pub fn clear_quiz(conn: &Connection, principal: &Principal, lecture_id: LectureId) -> AppResult<()> {
  let (lecture, _) = owned_lecture(conn, principal, lecture_id)?;
  if !lecture.has_quiz() {
    return Err(AppError::not_found(NO_QUIZ));
  }
  db::set_quiz(conn, lecture_id, &[])?;
  Ok(())
}

pub fn get_quiz(conn: &Connection, principal: &Principal, lecture_id: LectureId) -> AppResult<QuizView> {
  let lecture = accessible_lecture(conn, principal, lecture_id)?;
  if !lecture.has_quiz() {
    return Err(AppError::not_found(NO_QUIZ));
  }

  if principal.role.can_author_courses() {
    Ok(QuizView::Full(lecture.quiz))
  } else {
    Ok(QuizView::Public(lecture.quiz.iter().map(PublicQuizQuestion::from).collect()))
  }
}

/// Every learner's latest result for a lecture (course owner only)
pub fn quiz_results_for_lecture(
  conn: &Connection,
  principal: &Principal,
  lecture_id: LectureId,
) -> AppResult<Vec<LectureQuizResult>> {
  owned_lecture(conn, principal, lecture_id)?;
  Ok(db::quiz_results_for_lecture(conn, lecture_id)?)
}
