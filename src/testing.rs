//! Test utilities for database setup.
//!
//! Provides a migrated database in a temporary directory plus small seeding
//! helpers, so tests never duplicate schema SQL.

use rusqlite::Connection;
use std::path::Path;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;

use crate::auth::db::create_user;
use crate::db::{insert_course, insert_lecture, set_quiz, DbPool, NewCourse, NewLecture};
use crate::domain::{CourseId, LectureId, QuizQuestion, Role, UserId};

/// Test environment with lms.db initialized by the real migrations.
pub struct TestEnv {
    /// Temporary directory (kept alive for database file persistence)
    pub temp: TempDir,
    /// Connection with the full schema and foreign keys enabled
    pub conn: Connection,
}

impl TestEnv {
    pub fn new() -> rusqlite::Result<Self> {
        let temp =
            TempDir::new().map_err(|e| rusqlite::Error::ToSqlConversionFailure(Box::new(e)))?;

        let conn = Connection::open(temp.path().join("lms.db"))?;
        crate::db::configure(&conn, std::time::Duration::from_millis(500))?;
        crate::db::run_migrations(&conn)?;

        Ok(Self { temp, conn })
    }

    /// Get the temporary directory path for creating test files.
    pub fn path(&self) -> &Path {
        self.temp.path()
    }

    /// A second connection to the same database, shaped like the server's pool
    pub fn pool(&self) -> DbPool {
        let conn = Connection::open(self.temp.path().join("lms.db")).unwrap();
        crate::db::configure(&conn, std::time::Duration::from_millis(500)).unwrap();
        Arc::new(Mutex::new(conn))
    }

    /// Insert a user with a throwaway password hash
    pub fn user(&self, name: &str, role: Role) -> UserId {
        let email = format!("{}@example.com", name.to_lowercase().replace(' ', "."));
        create_user(&self.conn, name, &email, None, "not-a-real-hash", role).unwrap()
    }

    pub fn course(&self, owner: UserId, title: &str, price: i64) -> CourseId {
        let course = NewCourse {
            title: title.to_string(),
            description: format!("{} description", title),
            category: "Programming".to_string(),
            image: None,
            price,
            duration: 10,
        };
        insert_course(&self.conn, &course, owner).unwrap()
    }

    pub fn lecture(&self, course: CourseId, title: &str) -> LectureId {
        let lecture = NewLecture {
            title: title.to_string(),
            description: format!("{} notes", title),
            video: None,
        };
        insert_lecture(&self.conn, course, &lecture).unwrap()
    }

    /// Lecture with a quiz whose answers are "a1", "a2", ...
    pub fn lecture_with_quiz(&self, course: CourseId, title: &str, questions: usize) -> LectureId {
        let id = self.lecture(course, title);
        set_quiz(&self.conn, id, &sample_quiz(questions)).unwrap();
        id
    }
}

/// Quiz with `n` questions; the answer to question i is `a{i+1}`
pub fn sample_quiz(n: usize) -> Vec<QuizQuestion> {
    (1..=n)
        .map(|i| QuizQuestion {
            question: format!("Question {}?", i),
            options: vec![format!("a{}", i), "wrong".to_string()],
            correct_answer: format!("a{}", i),
        })
        .collect()
}
