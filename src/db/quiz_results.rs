//! Latest quiz attempt per (user, lecture)

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result};
use serde::Serialize;

use crate::domain::{CourseId, LectureId, QuizProgressEntry, QuizResult, UserId};

/// A learner's result for one lecture, for the course owner's view
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LectureQuizResult {
    pub user_id: UserId,
    pub name: String,
    pub email: String,
    pub score: u32,
    pub passed: bool,
}

/// Store a quiz attempt. The latest attempt replaces any earlier one.
pub fn upsert_quiz_result(
    conn: &Connection,
    user_id: UserId,
    lecture_id: LectureId,
    result: QuizResult,
) -> Result<()> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        r#"
    INSERT INTO quiz_results (user_id, lecture_id, score, passed, updated_at)
    VALUES (?1, ?2, ?3, ?4, ?5)
    ON CONFLICT(user_id, lecture_id) DO UPDATE SET
      score = excluded.score,
      passed = excluded.passed,
      updated_at = excluded.updated_at
    "#,
        params![user_id, lecture_id, result.score, result.passed, now],
    )?;
    Ok(())
}

pub fn get_quiz_result(conn: &Connection, user_id: UserId, lecture_id: LectureId) -> Result<Option<QuizResult>> {
    conn.query_row(
        "SELECT score, passed FROM quiz_results WHERE user_id = ?1 AND lecture_id = ?2",
        params![user_id, lecture_id],
        |row| {
            Ok(QuizResult {
                score: row.get(0)?,
                passed: row.get(1)?,
            })
        },
    )
    .optional()
}

/// Quiz results of a user for the lectures of one course
pub fn quiz_results_for_course(
    conn: &Connection,
    user_id: UserId,
    course_id: CourseId,
) -> Result<Vec<QuizProgressEntry>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT q.lecture_id, q.score, q.passed
    FROM quiz_results q
    JOIN lectures l ON l.id = q.lecture_id
    WHERE q.user_id = ?1 AND l.course_id = ?2
    ORDER BY l.position, l.id
    "#,
    )?;
    let entries = stmt
        .query_map(params![user_id, course_id], |row| {
            Ok(QuizProgressEntry::new(
                row.get(0)?,
                QuizResult {
                    score: row.get(1)?,
                    passed: row.get(2)?,
                },
            ))
        })?
        .collect::<Result<Vec<_>>>()?;
    Ok(entries)
}

pub fn quiz_results_for_lecture(conn: &Connection, lecture_id: LectureId) -> Result<Vec<LectureQuizResult>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT u.id, u.name, u.email, q.score, q.passed
    FROM quiz_results q
    JOIN users u ON u.id = q.user_id
    WHERE q.lecture_id = ?1
    ORDER BY q.updated_at DESC
    "#,
    )?;
    let results = stmt
        .query_map(params![lecture_id], |row| {
            Ok(LectureQuizResult {
                user_id: row.get(0)?,
                name: row.get(1)?,
                email: row.get(2)?,
                score: row.get(3)?,
                passed: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>>>()?;
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::testing::TestEnv;

    #[test]
    fn test_latest_attempt_wins() {
        let env = TestEnv::new().unwrap();
        let admin = env.user("Ada", Role::Admin);
        let learner = env.user("Lin", Role::User);
        let course = env.course(admin, "Rust", 0);
        let lecture = env.lecture_with_quiz(course, "Quiz", 2);

        assert!(get_quiz_result(&env.conn, learner, lecture).unwrap().is_none());

        upsert_quiz_result(&env.conn, learner, lecture, QuizResult { score: 2, passed: true }).unwrap();
        upsert_quiz_result(&env.conn, learner, lecture, QuizResult { score: 0, passed: false }).unwrap();

        assert_eq!(
            get_quiz_result(&env.conn, learner, lecture).unwrap(),
            Some(QuizResult { score: 0, passed: false })
        );
    }

    #[test]
    fn test_results_scoped_to_course() {
        let env = TestEnv::new().unwrap();
        let admin = env.user("Ada", Role::Admin);
        let learner = env.user("Lin", Role::User);
        let rust = env.course(admin, "Rust", 0);
        let go = env.course(admin, "Go", 0);
        let rust_quiz = env.lecture_with_quiz(rust, "Rust quiz", 1);
        let go_quiz = env.lecture_with_quiz(go, "Go quiz", 1);

        upsert_quiz_result(&env.conn, learner, rust_quiz, QuizResult { score: 1, passed: true }).unwrap();
        upsert_quiz_result(&env.conn, learner, go_quiz, QuizResult { score: 0, passed: false }).unwrap();

        let entries = quiz_results_for_course(&env.conn, learner, rust).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].lecture_id, rust_quiz);
        assert!(entries[0].passed);
    }

    #[test]
    fn test_results_for_lecture_include_learner() {
        let env = TestEnv::new().unwrap();
        let admin = env.user("Ada", Role::Admin);
        let learner = env.user("Lin", Role::User);
        let course = env.course(admin, "Rust", 0);
        let lecture = env.lecture_with_quiz(course, "Quiz", 2);
        upsert_quiz_result(&env.conn, learner, lecture, QuizResult { score: 1, passed: true }).unwrap();

        let results = quiz_results_for_lecture(&env.conn, lecture).unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "Lin");
        assert_eq!(results[0].email, "lin@example.com");
        assert_eq!(results[0].score, 1);
    }

    #[test]
    fn test_lecture_deletion_drops_results() {
        let env = TestEnv::new().unwrap();
        let admin = env.user("Ada", Role::Admin);
        let learner = env.user("Lin", Role::User);
        let course = env.course(admin, "Rust", 0);
        let lecture = env.lecture_with_quiz(course, "Quiz", 1);
        upsert_quiz_result(&env.conn, learner, lecture, QuizResult { score: 1, passed: true }).unwrap();

        crate::db::delete_lecture(&env.conn, lecture).unwrap();
        assert!(get_quiz_result(&env.conn, learner, lecture).unwrap().is_none());
    }
}
