use axum::{
  extract::{Path, State},
  http::header,
  response::IntoResponse,
};

use crate::auth::AuthContext;
use crate::completion;
use crate::db::try_lock;
use crate::domain::CourseId;
use crate::error::AppResult;
use crate::state::AppState;

/// Completion certificate as a downloadable document
pub async fn certificate(
  State(state): State<AppState>,
  auth: AuthContext,
  Path(course_id): Path<CourseId>,
) -> AppResult<impl IntoResponse> {
  let data = {
    let conn = try_lock(&state.db)?;
    completion::issue_certificate(&conn, auth.user_id, course_id, &state.config.certificate_verify_base)?
  };
  let rendered = state.certificates.render(&data)?;
  tracing::info!("Issued certificate {} to user {}", data.certificate_id, auth.user_id);

  Ok((
    [
      (header::CONTENT_TYPE, rendered.content_type.to_string()),
      (
        header::CONTENT_DISPOSITION,
        format!("attachment; filename=\"{}\"", rendered.file_name),
      ),
    ],
    rendered.body,
  ))
}
