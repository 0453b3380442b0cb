//! Course CRUD and listing queries

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result, Row};

use crate::config::UNKNOWN_INSTRUCTOR;
use crate::domain::{Course, CourseId, CourseListing, UserId};

use super::parse_timestamp;

/// Fields supplied when creating a course
#[derive(Debug, Clone)]
pub struct NewCourse {
    pub title: String,
    pub description: String,
    pub category: String,
    pub image: Option<String>,
    pub price: i64,
    pub duration: i64,
}

/// Partial update; `None` leaves the column untouched
#[derive(Debug, Clone, Default)]
pub struct CourseUpdate {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub image: Option<String>,
    pub price: Option<i64>,
    pub duration: Option<i64>,
}

impl CourseUpdate {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.category.is_none()
            && self.image.is_none()
            && self.price.is_none()
            && self.duration.is_none()
    }
}

const COURSE_COLUMNS: &str =
    "c.id, c.title, c.description, c.category, c.image, c.price, c.duration, c.created_by, c.created_at";

fn row_to_course(row: &Row) -> Result<Course> {
    let created_at: String = row.get(8)?;
    Ok(Course {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        category: row.get(3)?,
        image: row.get(4)?,
        price: row.get(5)?,
        duration: row.get(6)?,
        created_by: row.get(7)?,
        created_at: parse_timestamp(&created_at),
    })
}

pub fn insert_course(conn: &Connection, course: &NewCourse, created_by: UserId) -> Result<CourseId> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        r#"
    INSERT INTO courses (title, description, category, image, price, duration, created_by, created_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
    "#,
        params![
            course.title,
            course.description,
            course.category,
            course.image,
            course.price,
            course.duration,
            created_by,
            now,
        ],
    )?;
    Ok(conn.last_insert_rowid())
}

pub fn get_course_by_id(conn: &Connection, id: CourseId) -> Result<Option<Course>> {
    conn.query_row(
        &format!("SELECT {} FROM courses c WHERE c.id = ?1", COURSE_COLUMNS),
        params![id],
        row_to_course,
    )
    .optional()
}

/// All courses, newest first, with the owner's display name
pub fn list_courses(conn: &Connection) -> Result<Vec<CourseListing>> {
    let mut stmt = conn.prepare(&format!(
        r#"
    SELECT {}, u.name
    FROM courses c
    LEFT JOIN users u ON u.id = c.created_by
    ORDER BY c.created_at DESC, c.id DESC
    "#,
        COURSE_COLUMNS
    ))?;
    let courses = stmt
        .query_map([], |row| {
            let instructor: Option<String> = row.get(9)?;
            Ok(CourseListing {
                course: row_to_course(row)?,
                instructor: instructor.unwrap_or_else(|| UNKNOWN_INSTRUCTOR.to_string()),
            })
        })?
        .collect::<Result<Vec<_>>>()?;
    Ok(courses)
}

/// Display name of a course owner; "Unknown" when the owner is gone
pub fn instructor_name(conn: &Connection, created_by: Option<UserId>) -> Result<String> {
    let Some(user_id) = created_by else {
        return Ok(UNKNOWN_INSTRUCTOR.to_string());
    };
    let name: Option<String> = conn
        .query_row("SELECT name FROM users WHERE id = ?1", params![user_id], |row| row.get(0))
        .optional()?;
    Ok(name.unwrap_or_else(|| UNKNOWN_INSTRUCTOR.to_string()))
}

pub fn update_course(conn: &Connection, id: CourseId, update: &CourseUpdate) -> Result<()> {
    conn.execute(
        r#"
    UPDATE courses SET
      title = COALESCE(?1, title),
      description = COALESCE(?2, description),
      category = COALESCE(?3, category),
      image = COALESCE(?4, image),
      price = COALESCE(?5, price),
      duration = COALESCE(?6, duration)
    WHERE id = ?7
    "#,
        params![
            update.title,
            update.description,
            update.category,
            update.image,
            update.price,
            update.duration,
            id,
        ],
    )?;
    Ok(())
}

/// Delete a course. Lectures, subscriptions and progress cascade; payments stay.
pub fn delete_course(conn: &Connection, id: CourseId) -> Result<bool> {
    let count = conn.execute("DELETE FROM courses WHERE id = ?1", params![id])?;
    Ok(count > 0)
}

pub fn count_courses(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM courses", [], |row| row.get(0))
}
