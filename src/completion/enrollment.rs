//! Enrollment: payment-verified and free paths, both ending subscribed.

use rusqlite::Connection;
use serde::Serialize;

use crate::db::{self, try_lock, DbPool, NewPayment};
use crate::domain::{Course, CourseId, UserId};
use crate::error::{AppError, AppResult};
use crate::services::{Order, PaymentGateway};

pub const ALREADY_PURCHASED: &str = "You already have this course";
pub const ALREADY_ENROLLED: &str = "Already enrolled in this course";
pub const PAYMENT_FAILED: &str = "Payment Failed";
pub const INVALID_PRICE: &str = "Course price cannot be charged";

#[derive(Debug, Clone, Serialize)]
pub struct Checkout {
    pub order: Order,
    pub course: Course,
}

/// What the client sends back after paying
#[derive(Debug, Clone)]
pub struct PaymentProof {
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    Enrolled,
    /// The same order was verified before; nothing changed
    AlreadyRecorded,
}

/// Price in minor currency units
fn order_amount(course: &Course) -> AppResult<i64> {
    course
        .price
        .checked_mul(100)
        .filter(|amount| *amount >= 0)
        .ok_or_else(|| AppError::bad_request(INVALID_PRICE))
}

fn find_course(conn: &Connection, course_id: CourseId) -> AppResult<Course> {
    db::get_course_by_id(conn, course_id)?.ok_or_else(|| AppError::not_found("Course not found"))
}

/// Open a gateway order for a course the user does not own yet
pub async fn checkout(
    pool: &DbPool,
    gateway: &dyn PaymentGateway,
    user_id: UserId,
    course_id: CourseId,
) -> AppResult<Checkout> {
    let course = {
        let conn = try_lock(pool)?;
        let course = find_course(&conn, course_id)?;
        if db::is_subscribed(&conn, user_id, course_id)? {
            return Err(AppError::precondition(ALREADY_PURCHASED));
        }
        course
    };

    let amount = order_amount(&course)?;
    let receipt = format!("rcpt_{}_{}", user_id, course_id);
    let order = gateway.create_order(amount, &receipt).await?;
    Ok(Checkout { order, course })
}

/// Verify the gateway signature, then record payment, subscription and
/// progress record in one transaction.
pub fn verify_payment(
    conn: &Connection,
    gateway: &dyn PaymentGateway,
    user_id: UserId,
    course_id: CourseId,
    proof: &PaymentProof,
) -> AppResult<VerifyOutcome> {
    let course = find_course(conn, course_id)?;
    let amount = order_amount(&course)?;

    if !gateway.verify_signature(&proof.order_id, &proof.payment_id, &proof.signature) {
        tracing::warn!("Rejected payment signature for order {} (user {})", proof.order_id, user_id);
        return Err(AppError::bad_request(PAYMENT_FAILED));
    }

    if let Some(existing) = db::get_payment_by_order(conn, &proof.order_id)? {
        if existing.user_id != user_id || existing.course_id != course_id {
            tracing::warn!("Order {} replayed for a different enrollment", proof.order_id);
            return Err(AppError::bad_request(PAYMENT_FAILED));
        }
    }

    let tx = conn.unchecked_transaction()?;
    let recorded = db::insert_payment(
        &tx,
        &NewPayment {
            user_id,
            course_id,
            order_id: &proof.order_id,
            payment_id: &proof.payment_id,
            signature: &proof.signature,
            amount,
        },
    )?;
    db::add_subscription(&tx, user_id, course_id)?;
    db::ensure_progress(&tx, user_id, course_id)?;
    tx.commit()?;

    if recorded {
        tracing::info!("User {} purchased course {} (order {})", user_id, course_id, proof.order_id);
        Ok(VerifyOutcome::Enrolled)
    } else {
        Ok(VerifyOutcome::AlreadyRecorded)
    }
}

/// Enroll without payment. The progress record is created lazily.
pub fn enroll_free(conn: &Connection, user_id: UserId, course_id: CourseId) -> AppResult<()> {
    find_course(conn, course_id)?;
    if !db::add_subscription(conn, user_id, course_id)? {
        return Err(AppError::precondition(ALREADY_ENROLLED));
    }
    tracing::info!("User {} enrolled in course {}", user_id, course_id);
    Ok(())
}
