use axum::{extract::State, response::IntoResponse, Json};
use serde::Deserialize;

use crate::error::AppResult;
use crate::services::faq;
use crate::state::AppState;

#[derive(Deserialize)]
pub struct AskRequest {
  #[serde(default)]
  pub question: String,
}

pub async fn ask(State(state): State<AppState>, Json(req): Json<AskRequest>) -> AppResult<impl IntoResponse> {
  let outcome = faq::ask(&state.db, state.answers.as_ref(), &req.question).await?;
  Ok(Json(outcome))
}
