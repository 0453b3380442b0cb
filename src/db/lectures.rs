//! Lecture CRUD and quiz storage

use chrono::Utc;
use rusqlite::{params, types::Type, Connection, OptionalExtension, Result, Row};

use crate::domain::{CourseId, Lecture, LectureId, QuizQuestion};

use super::parse_timestamp;

#[derive(Debug, Clone)]
pub struct NewLecture {
    pub title: String,
    pub description: String,
    pub video: Option<String>,
}

/// Partial update; `None` leaves the column untouched
#[derive(Debug, Clone, Default)]
pub struct LectureUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub video: Option<String>,
}

const LECTURE_COLUMNS: &str = "id, course_id, title, description, video, position, quiz, created_at";

fn row_to_lecture(row: &Row) -> Result<Lecture> {
    let quiz_json: String = row.get(6)?;
    let quiz: Vec<QuizQuestion> = serde_json::from_str(&quiz_json)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(6, Type::Text, Box::new(e)))?;
    let created_at: String = row.get(7)?;
    Ok(Lecture {
        id: row.get(0)?,
        course_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        video: row.get(4)?,
        position: row.get(5)?,
        quiz,
        created_at: parse_timestamp(&created_at),
    })
}

/// Append a lecture to the end of its course
pub fn insert_lecture(conn: &Connection, course_id: CourseId, lecture: &NewLecture) -> Result<LectureId> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        r#"
    INSERT INTO lectures (course_id, title, description, video, position, quiz, created_at)
    VALUES (?1, ?2, ?3, ?4,
            (SELECT COALESCE(MAX(position), 0) + 1 FROM lectures WHERE course_id = ?1),
            '[]', ?5)
    "#,
        params![course_id, lecture.title, lecture.description, lecture.video, now],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_lecture_by_id(conn: &Connection, id: LectureId) -> Result<Option<Lecture>> {
    conn.query_row(
        &format!("SELECT {} FROM lectures WHERE id = ?1", LECTURE_COLUMNS),
        params![id],
        row_to_lecture,
    )
    .optional()
}

/// Lectures of a course in display order
pub fn list_lectures_for_course(conn: &Connection, course_id: CourseId) -> Result<Vec<Lecture>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM lectures WHERE course_id = ?1 ORDER BY position, id",
        LECTURE_COLUMNS
    ))?;
    let lectures = stmt
        .query_map(params![course_id], row_to_lecture)?
        .collect::<Result<Vec<_>>>()?;
    Ok(lectures)
}

pub fn list_all_lectures(conn: &Connection) -> Result<Vec<Lecture>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM lectures ORDER BY course_id, position, id",
        LECTURE_COLUMNS
    ))?;
    let lectures = stmt
        .query_map([], row_to_lecture)?
        .collect::<Result<Vec<_>>>()?;
    Ok(lectures)
}

pub fn count_lectures_for_course(conn: &Connection, course_id: CourseId) -> Result<i64> {
    conn.query_row(
        "SELECT COUNT(*) FROM lectures WHERE course_id = ?1",
        params![course_id],
        |row| row.get(0),
    )
}

pub fn count_lectures(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM lectures", [], |row| row.get(0))
}

/// Video paths of every lecture in a course (for media cleanup)
pub fn list_lecture_videos(conn: &Connection, course_id: CourseId) -> Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT video FROM lectures WHERE course_id = ?1 AND video IS NOT NULL")?;
    let videos = stmt
        .query_map(params![course_id], |row| row.get(0))?
        .collect::<Result<Vec<String>>>()?;
    Ok(videos)
}

pub fn update_lecture(conn: &Connection, id: LectureId, update: &LectureUpdate) -> Result<()> {
    conn.execute(
        r#"
    UPDATE lectures SET
      title = COALESCE(?1, title),
      description = COALESCE(?2, description),
      video = COALESCE(?3, video)
    WHERE id = ?4
    "#,
        params![update.title, update.description, update.video, id],
    )?;
    Ok(())
}

/// Replace the stored quiz. An empty slice clears it.
pub fn set_quiz(conn: &Connection, id: LectureId, quiz: &[QuizQuestion]) -> Result<()> {
    let json = serde_json::to_string(quiz)
        .map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;
    conn.execute("UPDATE lectures SET quiz = ?1 WHERE id = ?2", params![json, id])?;
    Ok(())
}

/// Delete a lecture. Completion entries and quiz results cascade.
pub fn delete_lecture(conn: &Connection, id: LectureId) -> Result<bool> {
    let count = conn.execute("DELETE FROM lectures WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::testing::{sample_quiz, TestEnv};

    #[test]
    fn test_lectures_append_in_order() {
        let env = TestEnv::new().unwrap();
        let admin = env.user("Ada", Role::Admin);
        let course = env.course(admin, "Rust", 0);
        let first = env.lecture(course, "One");
        let second = env.lecture(course, "Two");

        let lectures = list_lectures_for_course(&env.conn, course).unwrap();
        assert_eq!(lectures.iter().map(|l| l.id).collect::<Vec<_>>(), vec![first, second]);
        assert_eq!(lectures[0].position, 1);
        assert_eq!(lectures[1].position, 2);
        assert_eq!(count_lectures_for_course(&env.conn, course).unwrap(), 2);
    }

    #[test]
    fn test_positions_are_per_course() {
        let env = TestEnv::new().unwrap();
        let admin = env.user("Ada", Role::Admin);
        let a = env.course(admin, "A", 0);
        let b = env.course(admin, "B", 0);
        env.lecture(a, "A1");
        let b1 = env.lecture(b, "B1");

        assert_eq!(get_lecture_by_id(&env.conn, b1).unwrap().unwrap().position, 1);
        assert_eq!(count_lectures(&env.conn).unwrap(), 2);
    }

    #[test]
    fn test_quiz_roundtrip_and_clear() {
        let env = TestEnv::new().unwrap();
        let admin = env.user("Ada", Role::Admin);
        let course = env.course(admin, "Rust", 0);
        let id = env.lecture_with_quiz(course, "Quizzed", 3);

        let lecture = get_lecture_by_id(&env.conn, id).unwrap().unwrap();
        assert_eq!(lecture.quiz, sample_quiz(3));
        assert!(lecture.has_quiz());

        set_quiz(&env.conn, id, &[]).unwrap();
        assert!(!get_lecture_by_id(&env.conn, id).unwrap().unwrap().has_quiz());
    }

    #[test]
    fn test_corrupt_quiz_is_an_error() {
        let env = TestEnv::new().unwrap();
        let admin = env.user("Ada", Role::Admin);
        let course = env.course(admin, "Rust", 0);
        let id = env.lecture(course, "Broken");
        env.conn
            .execute("UPDATE lectures SET quiz = 'not json' WHERE id = ?1", params![id])
            .unwrap();

        assert!(get_lecture_by_id(&env.conn, id).is_err());
    }

    #[test]
    fn test_update_and_delete_lecture() {
        let env = TestEnv::new().unwrap();
        let admin = env.user("Ada", Role::Admin);
        let course = env.course(admin, "Rust", 0);
        let id = env.lecture(course, "Draft");

        let update = LectureUpdate {
            video: Some("/uploads/v.mp4".into()),
            ..Default::default()
        };
        update_lecture(&env.conn, id, &update).unwrap();
        let lecture = get_lecture_by_id(&env.conn, id).unwrap().unwrap();
        assert_eq!(lecture.title, "Draft");
        assert_eq!(lecture.video.as_deref(), Some("/uploads/v.mp4"));
        assert_eq!(list_lecture_videos(&env.conn, course).unwrap(), vec!["/uploads/v.mp4"]);

        assert!(delete_lecture(&env.conn, id).unwrap());
        assert!(get_lecture_by_id(&env.conn, id).unwrap().is_none());
    }
}
