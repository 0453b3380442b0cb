//! User course subscriptions (insertion ordered, no duplicates)

use chrono::Utc;
use rusqlite::{params, Connection, Result};

use crate::domain::{CourseId, UserId};

/// Add a subscription if absent. Returns true when a row was inserted.
pub fn add_subscription(conn: &Connection, user_id: UserId, course_id: CourseId) -> Result<bool> {
    let now = Utc::now().to_rfc3339();
    let count = conn.execute(
        "INSERT OR IGNORE INTO subscriptions (user_id, course_id, created_at) VALUES (?1, ?2, ?3)",
        params![user_id, course_id, now],
    )?;
    Ok(count > 0)
}

pub fn is_subscribed(conn: &Connection, user_id: UserId, course_id: CourseId) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM subscriptions WHERE user_id = ?1 AND course_id = ?2",
        params![user_id, course_id],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

/// Subscribed course ids in enrollment order
pub fn list_subscribed_course_ids(conn: &Connection, user_id: UserId) -> Result<Vec<CourseId>> {
    let mut stmt = conn.prepare("SELECT course_id FROM subscriptions WHERE user_id = ?1 ORDER BY id")?;
    let ids = stmt
        .query_map(params![user_id], |row| row.get(0))?
        .collect::<Result<Vec<CourseId>>>()?;
    Ok(ids)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::Role;
    use crate::testing::TestEnv;

    #[test]
    fn test_subscription_is_a_set() {
        let env = TestEnv::new().unwrap();
        let admin = env.user("Ada", Role::Admin);
        let learner = env.user("Lin", Role::User);
        let course = env.course(admin, "Rust", 0);

        assert!(!is_subscribed(&env.conn, learner, course).unwrap());
        assert!(add_subscription(&env.conn, learner, course).unwrap());
        assert!(!add_subscription(&env.conn, learner, course).unwrap());
        assert!(is_subscribed(&env.conn, learner, course).unwrap());
        assert_eq!(list_subscribed_course_ids(&env.conn, learner).unwrap(), vec![course]);
    }

    #[test]
    fn test_subscriptions_keep_enrollment_order() {
        let env = TestEnv::new().unwrap();
        let admin = env.user("Ada", Role::Admin);
        let learner = env.user("Lin", Role::User);
        let first = env.course(admin, "First", 0);
        let second = env.course(admin, "Second", 0);

        add_subscription(&env.conn, learner, second).unwrap();
        add_subscription(&env.conn, learner, first).unwrap();
        assert_eq!(
            list_subscribed_course_ids(&env.conn, learner).unwrap(),
            vec![second, first]
        );
    }

    #[test]
    fn test_course_deletion_removes_subscription() {
        let env = TestEnv::new().unwrap();
        let admin = env.user("Ada", Role::Admin);
        let learner = env.user("Lin", Role::User);
        let course = env.course(admin, "Rust", 0);
        add_subscription(&env.conn, learner, course).unwrap();

        crate::db::delete_course(&env.conn, course).unwrap();
        assert!(list_subscribed_course_ids(&env.conn, learner).unwrap().is_empty());
    }
}
