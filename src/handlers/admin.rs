//! Course authoring (multipart forms) and user administration.

use std::collections::HashMap;

use axum::{
  extract::{Multipart, Path, State},
  http::StatusCode,
  response::IntoResponse,
  Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::auth::AdminAuth;
use crate::catalog::{self, CourseDraft, LectureDraft, Upload};
use crate::db::try_lock;
use crate::domain::{CourseId, LectureId, UserId};
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Name of the multipart field carrying the image or video
const FILE_FIELD: &str = "file";

/// Text fields plus at most one file from a multipart body
#[derive(Debug, Default)]
struct Form {
  fields: HashMap<String, String>,
  file: Option<Upload>,
}

impl Form {
  fn text(&mut self, key: &str) -> Option<String> {
    self.fields.remove(key)
  }

  /// Optional integer field; blank means absent
  fn number(&self, key: &str) -> AppResult<Option<i64>> {
    match self.fields.get(key).map(|v| v.trim()) {
      None | Some("") => Ok(None),
      Some(raw) => raw
        .parse()
        .map(Some)
        .map_err(|_| AppError::bad_request(format!("Invalid {}: {}", key, raw))),
    }
  }

  fn course_draft(mut self) -> AppResult<CourseDraft> {
    Ok(CourseDraft {
      price: self.number("price")?,
      duration: self.number("duration")?,
      title: self.text("title"),
      description: self.text("description"),
      category: self.text("category"),
      image: self.file,
    })
  }

  fn lecture_draft(mut self) -> LectureDraft {
    LectureDraft {
      title: self.text("title"),
      description: self.text("description"),
      video: self.file,
    }
  }
}

async fn read_form(mut multipart: Multipart) -> AppResult<Form> {
  let mut form = Form::default();
  while let Some(field) = multipart
    .next_field()
    .await
    .map_err(|e| AppError::bad_request(format!("Invalid form data: {}", e)))?
  {
    let name = field.name().unwrap_or_default().to_string();
    if name == FILE_FIELD {
      let file_name = field.file_name().unwrap_or_default().to_string();
      let bytes = field
        .bytes()
        .await
        .map_err(|e| AppError::bad_request(format!("Failed to read upload: {}", e)))?;
      // Browsers send an empty part when no file was picked
      if !bytes.is_empty() {
        form.file = Some(Upload {
          file_name,
          bytes: bytes.to_vec(),
        });
      }
    } else {
      let value = field
        .text()
        .await
        .map_err(|e| AppError::bad_request(format!("Invalid form field {}: {}", name, e)))?;
      form.fields.insert(name, value);
    }
  }
  Ok(form)
}

pub async fn create_course(
  State(state): State<AppState>,
  AdminAuth(auth): AdminAuth,
  multipart: Multipart,
) -> AppResult<impl IntoResponse> {
  let draft = read_form(multipart).await?.course_draft()?;
  let course = catalog::create_course(&state.db, state.media.as_ref(), &auth.principal(), draft).await?;
  Ok((
    StatusCode::CREATED,
    Json(json!({ "message": "Course Created Successfully", "course": course })),
  ))
}

pub async fn update_course(
  State(state): State<AppState>,
  AdminAuth(auth): AdminAuth,
  Path(course_id): Path<CourseId>,
  multipart: Multipart,
) -> AppResult<impl IntoResponse> {
  let draft = read_form(multipart).await?.course_draft()?;
  let course =
    catalog::update_course(&state.db, state.media.as_ref(), &auth.principal(), course_id, draft).await?;
  Ok(Json(json!({ "message": "Course updated successfully", "course": course })))
}

pub async fn delete_course(
  State(state): State<AppState>,
  AdminAuth(auth): AdminAuth,
  Path(course_id): Path<CourseId>,
) -> AppResult<impl IntoResponse> {
  catalog::delete_course(&state.db, state.media.as_ref(), &auth.principal(), course_id).await?;
  Ok(Json(json!({ "message": "Course Deleted" })))
}

pub async fn add_lecture(
  State(state): State<AppState>,
  AdminAuth(auth): AdminAuth,
  Path(course_id): Path<CourseId>,
  multipart: Multipart,
) -> AppResult<impl IntoResponse> {
  let draft = read_form(multipart).await?.lecture_draft();
  let lecture =
    catalog::add_lecture(&state.db, state.media.as_ref(), &auth.principal(), course_id, draft).await?;
  Ok((
    StatusCode::CREATED,
    Json(json!({ "message": "Lecture Added", "lecture": lecture })),
  ))
}

pub async fn update_lecture(
  State(state): State<AppState>,
  AdminAuth(auth): AdminAuth,
  Path(lecture_id): Path<LectureId>,
  multipart: Multipart,
) -> AppResult<impl IntoResponse> {
  let draft = read_form(multipart).await?.lecture_draft();
  let lecture =
    catalog::update_lecture(&state.db, state.media.as_ref(), &auth.principal(), lecture_id, draft).await?;
  Ok(Json(json!({ "message": "Lecture updated successfully", "lecture": lecture })))
}

pub async fn delete_lecture(
  State(state): State<AppState>,
  AdminAuth(auth): AdminAuth,
  Path(lecture_id): Path<LectureId>,
) -> AppResult<impl IntoResponse> {
  catalog::delete_lecture(&state.db, state.media.as_ref(), &auth.principal(), lecture_id).await?;
  Ok(Json(json!({ "message": "Lecture Deleted" })))
}

pub async fn stats(State(state): State<AppState>, AdminAuth(auth): AdminAuth) -> AppResult<impl IntoResponse> {
  let conn = try_lock(&state.db)?;
  let stats = catalog::stats(&conn, &auth.principal())?;
  Ok(Json(json!({ "stats": stats })))
}

pub async fn list_users(
  State(state): State<AppState>,
  AdminAuth(auth): AdminAuth,
) -> AppResult<impl IntoResponse> {
  let conn = try_lock(&state.db)?;
  let users = catalog::list_users(&conn, &auth.principal())?;
  Ok(Json(json!({ "users": users })))
}

#[derive(Deserialize)]
pub struct RoleRequest {
  #[serde(default)]
  pub role: String,
}

pub async fn update_role(
  State(state): State<AppState>,
  AdminAuth(auth): AdminAuth,
  Path(user_id): Path<UserId>,
  Json(req): Json<RoleRequest>,
) -> AppResult<impl IntoResponse> {
  let conn = try_lock(&state.db)?;
  let user = catalog::update_role(&conn, &auth.principal(), user_id, &req.role)?;
  Ok(Json(json!({ "message": "Role updated", "user": user })))
}
