//! Certificate issuance for fully completed courses.

use chrono::Utc;
use rusqlite::Connection;

use super::tracker::get_progress;
use crate::auth::db::get_user_by_id;
use crate::db;
use crate::domain::{CourseId, UserId};
use crate::error::{AppError, AppResult};
use crate::services::CertificateData;

pub const NOT_ENROLLED: &str = "You are not enrolled in this course";
pub const NOT_COMPLETED: &str = "Complete every lecture of this course to get a certificate";

/// Last six digits of an id, zero padded
fn short_id(id: i64) -> String {
    let padded = format!("{:06}", id);
    padded[padded.len() - 6..].to_string()
}

pub fn certificate_id(user_id: UserId, course_id: CourseId) -> String {
    format!("{}-{}", short_id(user_id), short_id(course_id))
}

/// Upper-case the first letter of every space separated word
pub fn capitalize_words(name: &str) -> String {
    name.split(' ')
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

/// Build certificate data for a user who completed every lecture of a course
pub fn issue_certificate(
    conn: &Connection,
    user_id: UserId,
    course_id: CourseId,
    verify_base: &str,
) -> AppResult<CertificateData> {
    let user = get_user_by_id(conn, user_id)?;
    let course = db::get_course_by_id(conn, course_id)?;
    let (Some(user), Some(course)) = (user, course) else {
        return Err(AppError::not_found("User or Course not found"));
    };

    if !db::is_subscribed(conn, user_id, course_id)? {
        return Err(AppError::forbidden(NOT_ENROLLED));
    }
    if !get_progress(conn, user_id, course_id)?.is_fully_complete() {
        return Err(AppError::precondition(NOT_COMPLETED));
    }

    Ok(CertificateData {
        certificate_id: certificate_id(user_id, course_id),
        recipient: capitalize_words(&user.name),
        course_title: course.title,
        verify_url: format!("{}/{}/{}", verify_base.trim_end_matches('/'), user_id, course_id),
        issued_at: Utc::now(),
    })
}
