//! Course and lecture management, access rules and admin operations.

pub mod admin;
pub mod courses;
pub mod lectures;

use rusqlite::Connection;

use crate::db::{self, LogOnError};
use crate::domain::{Course, CourseId, Lecture, LectureId, Principal};
use crate::error::{AppError, AppResult};
use crate::services::MediaStore;

pub use admin::{list_users, stats, update_role, PlatformStats};
pub use courses::{create_course, delete_course, get_course, list_courses, update_course, CourseDraft};
pub use lectures::{add_lecture, all_lectures, delete_lecture, get_lecture, list_lectures, update_lecture, LectureDraft};

pub const NOT_SUBSCRIBED: &str = "You have not subscribed to this course";
pub const NOT_OWNER: &str = "You are not the owner of this course";

/// An uploaded file as received from a multipart form
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: String,
    pub bytes: Vec<u8>,
}

pub fn require_author(principal: &Principal) -> AppResult<()> {
    if !principal.role.can_author_courses() {
        return Err(AppError::forbidden("You are not an admin"));
    }
    Ok(())
}

/// Load a course the principal owns
pub fn owned_course(conn: &Connection, principal: &Principal, course_id: CourseId) -> AppResult<Course> {
    require_author(principal)?;
    let course = db::get_course_by_id(conn, course_id)?
        .ok_or_else(|| AppError::not_found("Course not found"))?;
    if !course.is_owned_by(principal.user_id) {
        return Err(AppError::forbidden(NOT_OWNER));
    }
    Ok(course)
}

/// Load a lecture whose course the principal owns
pub fn owned_lecture(
    conn: &Connection,
    principal: &Principal,
    lecture_id: LectureId,
) -> AppResult<(Lecture, Course)> {
    require_author(principal)?;
    let lecture = db::get_lecture_by_id(conn, lecture_id)?
        .ok_or_else(|| AppError::not_found("Lecture not found"))?;
    let course = owned_course(conn, principal, lecture.course_id)?;
    Ok((lecture, course))
}

/// Lecture content is visible to admins and to subscribers of the course
pub fn ensure_lecture_access(conn: &Connection, principal: &Principal, course_id: CourseId) -> AppResult<()> {
    if principal.role.can_view_all_lectures() {
        return Ok(());
    }
    if !db::is_subscribed(conn, principal.user_id, course_id)? {
        return Err(AppError::forbidden(NOT_SUBSCRIBED));
    }
    Ok(())
}

/// Load a lecture the principal may view
pub fn accessible_lecture(conn: &Connection, principal: &Principal, lecture_id: LectureId) -> AppResult<Lecture> {
    let lecture = db::get_lecture_by_id(conn, lecture_id)?
        .ok_or_else(|| AppError::not_found("Lecture not found"))?;
    ensure_lecture_access(conn, principal, lecture.course_id)?;
    Ok(lecture)
}

/// Best-effort removal of media that is no longer referenced
pub(crate) async fn discard_media(media: &dyn MediaStore, paths: &[String]) {
    for path in paths {
        media.remove(path).await.log_warn("Failed to remove stored media");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::testing::TestEnv;

    #[test]
    fn test_owned_course_checks() {
        let env = TestEnv::new().unwrap();
        let owner = env.user("Ada", Role::Admin);
        let other = env.user("Bob", Role::Admin);
        let learner = env.user("Lin", Role::User);
        let course = env.course(owner, "Rust", 0);

        let p = |user_id, role| Principal { user_id, role };
        assert!(owned_course(&env.conn, &p(owner, Role::Admin), course).is_ok());
        assert_eq!(
            owned_course(&env.conn, &p(other, Role::Admin), course).unwrap_err().to_string(),
            NOT_OWNER
        );
        assert!(matches!(
            owned_course(&env.conn, &p(learner, Role::User), course).unwrap_err(),
            AppError::Forbidden(_)
        ));
        assert!(matches!(
            owned_course(&env.conn, &p(owner, Role::Admin), 999).unwrap_err(),
            AppError::NotFound(_)
        ));
    }

    #[test]
    fn test_lecture_access_rules() {
        let env = TestEnv::new().unwrap();
        let owner = env.user("Ada", Role::Admin);
        let learner = env.user("Lin", Role::User);
        let course = env.course(owner, "Rust", 0);

        let admin = Principal { user_id: owner, role: Role::Admin };
        let user = Principal { user_id: learner, role: Role::User };
        assert!(ensure_lecture_access(&env.conn, &admin, course).is_ok());
        assert_eq!(
            ensure_lecture_access(&env.conn, &user, course).unwrap_err().to_string(),
            NOT_SUBSCRIBED
        );

        db::add_subscription(&env.conn, learner, course).unwrap();
        assert!(ensure_lecture_access(&env.conn, &user, course).is_ok());
    }
}
