//! Course-level and dashboard-level completion across a user's subscriptions.

use rusqlite::Connection;
use serde::Serialize;

use super::tracker::{completion_percentage, is_fully_complete};
use crate::auth::db::get_user_by_id;
use crate::db;
use crate::domain::{Course, CourseId, User, UserId};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EnrolledCourse {
    pub id: CourseId,
    pub title: String,
    pub image: Option<String>,
    pub price: i64,
    pub duration: i64,
    pub instructor: String,
    pub total_lectures: usize,
    pub watched_lectures: usize,
    pub progress_percentage: u32,
    pub is_completed: bool,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedCourse {
    pub course_id: CourseId,
    pub title: String,
    pub completed_lectures: usize,
    pub total_lectures: usize,
}

#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardStats {
    pub total_courses: usize,
    pub completed_courses: usize,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Dashboard {
    pub user: User,
    pub stats: DashboardStats,
    pub enrolled_courses: Vec<EnrolledCourse>,
}

fn enrolled_course(conn: &Connection, user_id: UserId, course: Course) -> AppResult<EnrolledCourse> {
    let total = db::count_lectures_for_course(conn, course.id)? as usize;
    let watched = (db::count_completed(conn, user_id, course.id)? as usize).min(total);
    let instructor = db::instructor_name(conn, course.created_by)?;
    Ok(EnrolledCourse {
        id: course.id,
        title: course.title,
        image: course.image,
        price: course.price,
        duration: course.duration,
        instructor,
        total_lectures: total,
        watched_lectures: watched,
        progress_percentage: completion_percentage(watched, total),
        is_completed: is_fully_complete(watched, total),
    })
}

/// Subscribed courses with lecture counts, in enrollment order.
/// Subscriptions whose course no longer exists are skipped.
pub fn my_courses(conn: &Connection, user_id: UserId) -> AppResult<Vec<EnrolledCourse>> {
    let mut courses = Vec::new();
    for course_id in db::list_subscribed_course_ids(conn, user_id)? {
        match db::get_course_by_id(conn, course_id)? {
            Some(course) => courses.push(enrolled_course(conn, user_id, course)?),
            None => tracing::warn!("User {} subscribed to missing course {}", user_id, course_id),
        }
    }
    Ok(courses)
}

pub fn completed_courses(conn: &Connection, user_id: UserId) -> AppResult<Vec<CompletedCourse>> {
    Ok(my_courses(conn, user_id)?
        .into_iter()
        .filter(|c| c.is_completed)
        .map(|c| CompletedCourse {
            course_id: c.id,
            title: c.title,
            completed_lectures: c.watched_lectures,
            total_lectures: c.total_lectures,
        })
        .collect())
}

pub fn dashboard(conn: &Connection, user_id: UserId) -> AppResult<Dashboard> {
    let user = get_user_by_id(conn, user_id)?.ok_or_else(|| AppError::not_found("User not found"))?;
    let enrolled_courses = my_courses(conn, user_id)?;
    let stats = DashboardStats {
        total_courses: enrolled_courses.len(),
        completed_courses: enrolled_courses.iter().filter(|c| c.is_completed).count(),
    };
    Ok(Dashboard {
        user,
        stats,
        enrolled_courses,
    })
}
