//! Lecture authoring and subscriber-facing lecture queries.

use rusqlite::Connection;

use super::{accessible_lecture, discard_media, ensure_lecture_access, owned_course, owned_lecture, require_author, Upload};
use crate::db::{self, try_lock, DbPool, LectureUpdate, NewLecture};
use crate::domain::{CourseId, Lecture, LectureId, LectureView, Principal};
use crate::error::{AppError, AppResult};
use crate::services::{MediaKind, MediaStore};

#[derive(Debug, Clone, Default)]
pub struct LectureDraft {
    pub title: Option<String>,
    pub description: Option<String>,
    pub video: Option<Upload>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string()).filter(|v| !v.is_empty())
}

fn load_lecture(conn: &Connection, lecture_id: LectureId) -> AppResult<Lecture> {
    db::get_lecture_by_id(conn, lecture_id)?.ok_or_else(|| AppError::not_found("Lecture not found"))
}

async fn store_video(media: &dyn MediaStore, upload: Option<Upload>) -> AppResult<Option<String>> {
    match upload {
        Some(file) => Ok(Some(media.store(MediaKind::Video, &file.file_name, file.bytes).await?)),
        None => Ok(None),
    }
}

/// Append a lecture to a course the caller owns
pub async fn add_lecture(
    pool: &DbPool,
    media: &dyn MediaStore,
    principal: &Principal,
    course_id: CourseId,
    draft: LectureDraft,
) -> AppResult<Lecture> {
    {
        let conn = try_lock(pool)?;
        owned_course(&conn, principal, course_id)?;
    }
    let (Some(title), Some(description)) = (non_blank(draft.title), non_blank(draft.description)) else {
        return Err(AppError::bad_request(super::courses::MISSING_FIELDS));
    };

    let video = store_video(media, draft.video).await?;
    let new_lecture = NewLecture {
        title,
        description,
        video: video.clone(),
    };

    let created = {
        let conn = try_lock(pool)?;
        db::insert_lecture(&conn, course_id, &new_lecture)
            .map_err(AppError::from)
            .and_then(|id| load_lecture(&conn, id))
    };
    match created {
        Ok(lecture) => {
            tracing::info!("Added lecture {} to course {}", lecture.id, course_id);
            Ok(lecture)
        }
        Err(e) => {
            discard_media(media, video.as_slice()).await;
            Err(e)
        }
    }
}

pub async fn update_lecture(
    pool: &DbPool,
    media: &dyn MediaStore,
    principal: &Principal,
    lecture_id: LectureId,
    draft: LectureDraft,
) -> AppResult<Lecture> {
    let previous_video = {
        let conn = try_lock(pool)?;
        owned_lecture(&conn, principal, lecture_id)?.0.video
    };

    let video = store_video(media, draft.video).await?;
    let update = LectureUpdate {
        title: non_blank(draft.title),
        description: non_blank(draft.description),
        video: video.clone(),
    };

    let updated = {
        let conn = try_lock(pool)?;
        db::update_lecture(&conn, lecture_id, &update)
            .map_err(AppError::from)
            .and_then(|()| load_lecture(&conn, lecture_id))
    };
    match updated {
        Ok(lecture) => {
            if video.is_some() {
                discard_media(media, previous_video.as_slice()).await;
            }
            Ok(lecture)
        }
        Err(e) => {
            discard_media(media, video.as_slice()).await;
            Err(e)
        }
    }
}

/// Delete a lecture. Completion entries and quiz results go with it.
pub async fn delete_lecture(
    pool: &DbPool,
    media: &dyn MediaStore,
    principal: &Principal,
    lecture_id: LectureId,
) -> AppResult<()> {
    let video = {
        let conn = try_lock(pool)?;
        let (lecture, _) = owned_lecture(&conn, principal, lecture_id)?;
        db::delete_lecture(&conn, lecture_id)?;
        lecture.video
    };
    discard_media(media, video.as_slice()).await;
    tracing::info!("User {} deleted lecture {}", principal.user_id, lecture_id);
    Ok(())
}

pub fn list_lectures(conn: &Connection, principal: &Principal, course_id: CourseId) -> AppResult<Vec<LectureView>> {
    if db::get_course_by_id(conn, course_id)?.is_none() {
        return Err(AppError::not_found("Course not found"));
    }
    ensure_lecture_access(conn, principal, course_id)?;
    Ok(db::list_lectures_for_course(conn, course_id)?
        .into_iter()
        .map(LectureView::from)
        .collect())
}

pub fn get_lecture(conn: &Connection, principal: &Principal, lecture_id: LectureId) -> AppResult<LectureView> {
    Ok(accessible_lecture(conn, principal, lecture_id)?.into())
}

/// Every lecture on the platform (admin)
pub fn all_lectures(conn: &Connection, principal: &Principal) -> AppResult<Vec<LectureView>> {
    require_author(principal)?;
    Ok(db::list_all_lectures(conn)?
        .into_iter()
        .map(LectureView::from)
        .collect())
}
