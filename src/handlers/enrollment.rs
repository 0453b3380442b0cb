//! Checkout, payment verification and free enrollment.

use axum::{
  extract::{Path, State},
  http::StatusCode,
  response::IntoResponse,
  Json,
};
use serde::Deserialize;
use serde_json::json;

use crate::auth::AuthContext;
use crate::completion::{self, PaymentProof, VerifyOutcome};
use crate::db::try_lock;
use crate::domain::CourseId;
use crate::error::{AppError, AppResult};
use crate::state::AppState;

/// Gateway callback fields. The gateway's own `razorpay_*` names are accepted too.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyRequest {
  #[serde(default, alias = "razorpay_order_id")]
  pub order_id: String,
  #[serde(default, alias = "razorpay_payment_id")]
  pub payment_id: String,
  #[serde(default, alias = "razorpay_signature")]
  pub signature: String,
}

pub async fn checkout(
  State(state): State<AppState>,
  auth: AuthContext,
  Path(course_id): Path<CourseId>,
) -> AppResult<impl IntoResponse> {
  let checkout = completion::checkout(&state.db, state.payments.as_ref(), auth.user_id, course_id).await?;
  Ok((StatusCode::CREATED, Json(checkout)))
}

pub async fn verify_payment(
  State(state): State<AppState>,
  auth: AuthContext,
  Path(course_id): Path<CourseId>,
  Json(req): Json<VerifyRequest>,
) -> AppResult<impl IntoResponse> {
  if req.order_id.is_empty() || req.payment_id.is_empty() || req.signature.is_empty() {
    return Err(AppError::bad_request(completion::enrollment::PAYMENT_FAILED));
  }
  let proof = PaymentProof {
    order_id: req.order_id,
    payment_id: req.payment_id,
    signature: req.signature,
  };

  let conn = try_lock(&state.db)?;
  let outcome = completion::verify_payment(&conn, state.payments.as_ref(), auth.user_id, course_id, &proof)?;
  if outcome == VerifyOutcome::AlreadyRecorded {
    tracing::debug!("Order {} was already verified", proof.order_id);
  }
  Ok(Json(json!({ "message": "Course Purchased Successfully" })))
}

pub async fn enroll_free(
  State(state): State<AppState>,
  auth: AuthContext,
  Path(course_id): Path<CourseId>,
) -> AppResult<impl IntoResponse> {
  let conn = try_lock(&state.db)?;
  completion::enroll_free(&conn, auth.user_id, course_id)?;
  Ok(Json(json!({ "message": "Enrolled successfully" })))
}
