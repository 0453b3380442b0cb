//! Append-only payment audit log

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result, Row};

use crate::domain::{CourseId, Payment, UserId};

use super::parse_timestamp;

#[derive(Debug, Clone)]
pub struct NewPayment<'a> {
    pub user_id: UserId,
    pub course_id: CourseId,
    pub order_id: &'a str,
    pub payment_id: &'a str,
    pub signature: &'a str,
    pub amount: i64,
}

fn row_to_payment(row: &Row) -> Result<Payment> {
    let created_at: String = row.get(7)?;
    Ok(Payment {
        id: row.get(0)?,
        user_id: row.get(1)?,
        course_id: row.get(2)?,
        order_id: row.get(3)?,
        payment_id: row.get(4)?,
        signature: row.get(5)?,
        amount: row.get(6)?,
        created_at: parse_timestamp(&created_at),
    })
}

/// Record a payment. Returns false when the order id was already recorded.
pub fn insert_payment(conn: &Connection, payment: &NewPayment) -> Result<bool> {
    let now = Utc::now().to_rfc3339();
    let count = conn.execute(
        r#"
    INSERT OR IGNORE INTO payments (user_id, course_id, order_id, payment_id, signature, amount, created_at)
    VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
    "#,
        params![
            payment.user_id,
            payment.course_id,
            payment.order_id,
            payment.payment_id,
            payment.signature,
            payment.amount,
            now,
        ],
    )?;
    Ok(count > 0)
}

pub fn get_payment_by_order(conn: &Connection, order_id: &str) -> Result<Option<Payment>> {
    conn.query_row(
        r#"
    SELECT id, user_id, course_id, order_id, payment_id, signature, amount, created_at
    FROM payments WHERE order_id = ?1
    "#,
        params![order_id],
        row_to_payment,
    )
    .optional()
}

pub fn list_payments_for_user(conn: &Connection, user_id: UserId) -> Result<Vec<Payment>> {
    let mut stmt = conn.prepare(
        r#"
    SELECT id, user_id, course_id, order_id, payment_id, signature, amount, created_at
    FROM payments WHERE user_id = ?1 ORDER BY id
    "#,
    )?;
    let payments = stmt
        .query_map(params![user_id], row_to_payment)?
        .collect::<Result<Vec<_>>>()?;
    Ok(payments)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::testing::TestEnv;

    fn payment(user_id: UserId, course_id: CourseId) -> NewPayment<'static> {
        NewPayment {
            user_id,
            course_id,
            order_id: "order_abc",
            payment_id: "pay_123",
            signature: "sig",
            amount: 49900,
        }
    }

    #[test]
    fn test_duplicate_order_is_ignored() {
        let env = TestEnv::new().unwrap();
        let admin = env.user("Ada", Role::Admin);
        let learner = env.user("Lin", Role::User);
        let course = env.course(admin, "Rust", 499);

        assert!(insert_payment(&env.conn, &payment(learner, course)).unwrap());
        assert!(!insert_payment(&env.conn, &payment(learner, course)).unwrap());
        assert_eq!(list_payments_for_user(&env.conn, learner).unwrap().len(), 1);

        let stored = get_payment_by_order(&env.conn, "order_abc").unwrap().unwrap();
        assert_eq!(stored.amount, 49900);
        assert_eq!(stored.payment_id, "pay_123");
    }

    #[test]
    fn test_payments_survive_course_deletion() {
        let env = TestEnv::new().unwrap();
        let admin = env.user("Ada", Role::Admin);
        let learner = env.user("Lin", Role::User);
        let course = env.course(admin, "Rust", 499);
        insert_payment(&env.conn, &payment(learner, course)).unwrap();

        crate::db::delete_course(&env.conn, course).unwrap();
        let payments = list_payments_for_user(&env.conn, learner).unwrap();
        assert_eq!(payments.len(), 1);
        assert_eq!(payments[0].course_id, course);
    }
}
