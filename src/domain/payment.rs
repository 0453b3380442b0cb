use chrono::{DateTime, Utc};
use serde::Serialize;

use super::{CourseId, UserId};

/// Audit record of a verified transaction. Never updated or deleted.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payment {
    pub id: i64,
    pub user_id: UserId,
    pub course_id: CourseId,
    pub order_id: String,
    pub payment_id: String,
    pub signature: String,
    /// Amount in minor currency units
    pub amount: i64,
    pub created_at: DateTime<Utc>,
}
