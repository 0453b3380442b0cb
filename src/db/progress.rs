//! Per (user, course) progress records and their completed-lecture sets

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result};

use crate::domain::{CourseId, LectureId, UserId};

/// Get or create the progress record for (user, course).
///
/// Every creation path goes through here so there is never more than one
/// record per pair.
pub fn ensure_progress(conn: &Connection, user_id: UserId, course_id: CourseId) -> Result<i64> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT OR IGNORE INTO progress (user_id, course_id, created_at) VALUES (?1, ?2, ?3)",
        params![user_id, course_id, now],
    )?;
    conn.query_row(
        "SELECT id FROM progress WHERE user_id = ?1 AND course_id = ?2",
        params![user_id, course_id],
        |row| row.get(0),
    )
}

pub fn find_progress_id(conn: &Connection, user_id: UserId, course_id: CourseId) -> Result<Option<i64>> {
    conn.query_row(
        "SELECT id FROM progress WHERE user_id = ?1 AND course_id = ?2",
        params![user_id, course_id],
        |row| row.get(0),
    )
    .optional()
}

/// Append a lecture to the completed set. Returns false if it was already there.
pub fn add_completed_lecture(conn: &Connection, progress_id: i64, lecture_id: LectureId) -> Result<bool> {
    let now = Utc::now().to_rfc3339();
    let count = conn.execute(
        "INSERT OR IGNORE INTO progress_lectures (progress_id, lecture_id, completed_at) VALUES (?1, ?2, ?3)",
        params![progress_id, lecture_id, now],
    )?;
    Ok(count > 0)
}

/// Completed lectures in the order they were completed
pub fn completed_lectures(conn: &Connection, progress_id: i64) -> Result<Vec<LectureId>> {
    let mut stmt =
        conn.prepare("SELECT lecture_id FROM progress_lectures WHERE progress_id = ?1 ORDER BY seq")?;
    let ids = stmt
        .query_map(params![progress_id], |row| row.get(0))?
        .collect::<Result<Vec<LectureId>>>()?;
    Ok(ids)
}

pub fn is_lecture_completed(
    conn: &Connection,
    user_id: UserId,
    course_id: CourseId,
    lecture_id: LectureId,
) -> Result<bool> {
    let count: i64 = conn.query_row(
        r#"
    SELECT COUNT(*)
    FROM progress_lectures pl
    JOIN progress p ON p.id = pl.progress_id
    WHERE p.user_id = ?1 AND p.course_id = ?2 AND pl.lecture_id = ?3
    "#,
        params![user_id, course_id, lecture_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Number of completed lectures for (user, course); 0 without a record
pub fn count_completed(conn: &Connection, user_id: UserId, course_id: CourseId) -> Result<i64> {
    conn.query_row(
        r#"
    SELECT COUNT(pl.lecture_id)
    FROM progress p
    LEFT JOIN progress_lectures pl ON pl.progress_id = p.id
    WHERE p.user_id = ?1 AND p.course_id = ?2
    "#,
        params![user_id, course_id],
        |row| row.get(0),
    )
}
