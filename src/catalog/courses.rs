//! Course authoring and public course queries.

use rusqlite::Connection;

use super::{discard_media, owned_course, require_author, Upload};
use crate::db::{self, try_lock, CourseUpdate, DbPool, NewCourse};
use crate::domain::{Course, CourseId, CourseListing, Principal};
use crate::error::{AppError, AppResult};
use crate::services::{MediaKind, MediaStore};

pub const MISSING_FIELDS: &str = "Please enter all fields";
/// Prices are charged in minor units, so they must survive `* 100`.
pub const MAX_PRICE: i64 = i64::MAX / 100;

/// Course fields as submitted by an author. Blank text counts as absent.
#[derive(Debug, Clone, Default)]
pub struct CourseDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub price: Option<i64>,
    pub duration: Option<i64>,
    pub image: Option<Upload>,
}

fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

fn check_numbers(draft: &CourseDraft) -> AppResult<()> {
    if draft.price.is_some_and(|p| p < 0) {
        return Err(AppError::bad_request("Price cannot be negative"));
    }
    if draft.price.is_some_and(|p| p > MAX_PRICE) {
        return Err(AppError::bad_request("Price is too large"));
    }
    if draft.duration.is_some_and(|d| d < 0) {
        return Err(AppError::bad_request("Duration cannot be negative"));
    }
    Ok(())
}

fn load_course(conn: &Connection, course_id: CourseId) -> AppResult<Course> {
    db::get_course_by_id(conn, course_id)?.ok_or_else(|| AppError::not_found("Course not found"))
}

async fn store_image(media: &dyn MediaStore, upload: Option<Upload>) -> AppResult<Option<String>> {
    match upload {
        Some(file) => Ok(Some(media.store(MediaKind::Image, &file.file_name, file.bytes).await?)),
        None => Ok(None),
    }
}

/// Create a course owned by the caller. The image is stored before the
/// record is written and removed again if the write fails.
pub async fn create_course(
    pool: &DbPool,
    media: &dyn MediaStore,
    principal: &Principal,
    draft: CourseDraft,
) -> AppResult<Course> {
    require_author(principal)?;
    check_numbers(&draft)?;
    let (Some(title), Some(description), Some(category), Some(price), Some(duration)) = (
        non_blank(&draft.title),
        non_blank(&draft.description),
        non_blank(&draft.category),
        draft.price,
        draft.duration,
    ) else {
        return Err(AppError::bad_request(MISSING_FIELDS));
    };

    let image = store_image(media, draft.image).await?;
    let new_course = NewCourse {
        title,
        description,
        category,
        image: image.clone(),
        price,
        duration,
    };

    let created = {
        let conn = try_lock(pool)?;
        db::insert_course(&conn, &new_course, principal.user_id)
            .map_err(AppError::from)
            .and_then(|id| load_course(&conn, id))
    };
    match created {
        Ok(course) => {
            tracing::info!("User {} created course {} ({})", principal.user_id, course.id, course.title);
            Ok(course)
        }
        Err(e) => {
            discard_media(media, image.as_slice()).await;
            Err(e)
        }
    }
}

/// Partial update by the owner. A new image replaces the old one.
pub async fn update_course(
    pool: &DbPool,
    media: &dyn MediaStore,
    principal: &Principal,
    course_id: CourseId,
    draft: CourseDraft,
) -> AppResult<Course> {
    check_numbers(&draft)?;
    let previous_image = {
        let conn = try_lock(pool)?;
        owned_course(&conn, principal, course_id)?.image
    };

    let image = store_image(media, draft.image).await?;
    let update = CourseUpdate {
        title: non_blank(&draft.title),
        description: non_blank(&draft.description),
        category: non_blank(&draft.category),
        image: image.clone(),
        price: draft.price,
        duration: draft.duration,
    };
    if update.is_empty() {
        let conn = try_lock(pool)?;
        return load_course(&conn, course_id);
    }

    let updated = {
        let conn = try_lock(pool)?;
        db::update_course(&conn, course_id, &update)
            .map_err(AppError::from)
            .and_then(|()| load_course(&conn, course_id))
    };
    match updated {
        Ok(course) => {
            if image.is_some() {
                discard_media(media, previous_image.as_slice()).await;
            }
            Ok(course)
        }
        Err(e) => {
            discard_media(media, image.as_slice()).await;
            Err(e)
        }
    }
}

/// Delete a course with its lectures, subscriptions and progress.
/// Payments are kept. Media files are removed best effort.
pub async fn delete_course(
    pool: &DbPool,
    media: &dyn MediaStore,
    principal: &Principal,
    course_id: CourseId,
) -> AppResult<()> {
    let orphaned = {
        let conn = try_lock(pool)?;
        let course = owned_course(&conn, principal, course_id)?;
        let mut paths = db::list_lecture_videos(&conn, course_id)?;
        paths.extend(course.image);
        db::delete_course(&conn, course_id)?;
        paths
    };
    discard_media(media, &orphaned).await;
    tracing::info!("User {} deleted course {}", principal.user_id, course_id);
    Ok(())
}

pub fn list_courses(conn: &Connection) -> AppResult<Vec<CourseListing>> {
    Ok(db::list_courses(conn)?)
}

pub fn get_course(conn: &Connection, course_id: CourseId) -> AppResult<CourseListing> {
    let course = load_course(conn, course_id)?;
    let instructor = db::instructor_name(conn, course.created_by)?;
    Ok(CourseListing { course, instructor })
}
