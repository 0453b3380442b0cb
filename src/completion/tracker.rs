//! Per-user, per-course lecture completion with the quiz gate.

use rusqlite::Connection;
use std::collections::HashSet;

use crate::db;
use crate::domain::{CourseId, LectureId, QuizProgressEntry, UserId};
use crate::error::{AppError, AppResult};

pub const QUIZ_GATE: &str = "You must pass the quiz to complete this lecture.";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    AlreadyRecorded,
    Added,
}

/// Completion state of one user in one course
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CourseProgress {
    pub percentage: u32,
    /// Completed lecture ids in completion order
    pub completed_lectures: Vec<LectureId>,
    pub total_lectures: usize,
    /// Every quiz-bearing lecture has a passing result
    pub quiz_all_passed: bool,
    pub quiz_progress: Vec<QuizProgressEntry>,
    /// False until the first completion or enrollment creates a record
    pub has_record: bool,
}

impl CourseProgress {
    pub fn is_fully_complete(&self) -> bool {
        is_fully_complete(self.completed_lectures.len(), self.total_lectures)
    }
}

/// Completed share of a course in whole percent, rounded half up
pub fn completion_percentage(completed: usize, total: usize) -> u32 {
    if total == 0 {
        return 0;
    }
    let rounded = (completed * 200 + total) / (2 * total);
    rounded.min(100) as u32
}

/// A course counts as complete only when it has lectures and all are done
pub fn is_fully_complete(completed: usize, total: usize) -> bool {
    total > 0 && completed == total
}

/// Mark a lecture complete for (user, course).
///
/// Checks run before any write; the write itself runs in one transaction so
/// concurrent calls leave exactly one entry.
pub fn mark_complete(
    conn: &Connection,
    user_id: UserId,
    course_id: CourseId,
    lecture_id: LectureId,
) -> AppResult<MarkOutcome> {
    let lecture = db::get_lecture_by_id(conn, lecture_id)?
        .ok_or_else(|| AppError::not_found("Lecture not found"))?;
    if db::get_course_by_id(conn, course_id)?.is_none() {
        return Err(AppError::not_found("Course not found"));
    }
    if lecture.course_id != course_id {
        return Err(AppError::bad_request("Lecture does not belong to this course"));
    }

    let tx = conn.unchecked_transaction()?;
    if db::is_lecture_completed(&tx, user_id, course_id, lecture_id)? {
        return Ok(MarkOutcome::AlreadyRecorded);
    }

    if lecture.has_quiz() {
        let passed = db::get_quiz_result(&tx, user_id, lecture_id)?
            .map(|r| r.passed)
            .unwrap_or(false);
        if !passed {
            return Err(AppError::precondition(QUIZ_GATE));
        }
    }

    let progress_id = db::ensure_progress(&tx, user_id, course_id)?;
    let added = db::add_completed_lecture(&tx, progress_id, lecture_id)?;
    tx.commit()?;

    if added {
        tracing::info!("User {} completed lecture {} of course {}", user_id, lecture_id, course_id);
        Ok(MarkOutcome::Added)
    } else {
        Ok(MarkOutcome::AlreadyRecorded)
    }
}

pub fn get_progress(conn: &Connection, user_id: UserId, course_id: CourseId) -> AppResult<CourseProgress> {
    if db::get_course_by_id(conn, course_id)?.is_none() {
        return Err(AppError::not_found("Course not found"));
    }

    let lectures = db::list_lectures_for_course(conn, course_id)?;
    let lecture_ids: HashSet<LectureId> = lectures.iter().map(|l| l.id).collect();

    let progress_id = db::find_progress_id(conn, user_id, course_id)?;
    let completed_lectures: Vec<LectureId> = match progress_id {
        Some(id) => db::completed_lectures(conn, id)?
            .into_iter()
            .filter(|l| lecture_ids.contains(l))
            .collect(),
        None => Vec::new(),
    };

    let quiz_progress = db::quiz_results_for_course(conn, user_id, course_id)?;
    let passed: HashSet<LectureId> = quiz_progress
        .iter()
        .filter(|e| e.passed)
        .map(|e| e.lecture_id)
        .collect();
    let quiz_all_passed = lectures
        .iter()
        .filter(|l| l.has_quiz())
        .all(|l| passed.contains(&l.id));

    Ok(CourseProgress {
        percentage: completion_percentage(completed_lectures.len(), lectures.len()),
        total_lectures: lectures.len(),
        completed_lectures,
        quiz_all_passed,
        quiz_progress,
        has_record: progress_id.is_some(),
    })
}
