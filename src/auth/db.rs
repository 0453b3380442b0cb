//! Account database operations (users and sessions tables).
//!
//! The tables themselves are created by the migrations in `crate::db::schema`.

use chrono::{Duration, Utc};
use rusqlite::{params, Connection, OptionalExtension, Result, Row};

use crate::config::DEFAULT_AVATAR;
use crate::db::parse_timestamp;
use crate::domain::{Principal, Role, User, UserId};

const USER_COLUMNS: &str = "id, name, email, phone, role, avatar, created_at";

fn row_to_user(row: &Row) -> Result<User> {
    let role: String = row.get(4)?;
    let created_at: String = row.get(6)?;
    Ok(User {
        id: row.get(0)?,
        name: row.get(1)?,
        email: row.get(2)?,
        phone: row.get(3)?,
        role: Role::from_str(&role),
        avatar: row.get(5)?,
        created_at: parse_timestamp(&created_at),
    })
}

// ==================== Users ====================

/// Create a new user, returns the user ID
pub fn create_user(
    conn: &Connection,
    name: &str,
    email: &str,
    phone: Option<&str>,
    password_hash: &str,
    role: Role,
) -> Result<UserId> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        r#"INSERT INTO users (name, email, phone, password_hash, role, avatar, created_at)
           VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"#,
        params![name, email, phone, password_hash, role.as_str(), DEFAULT_AVATAR, now],
    )?;
    Ok(conn.last_insert_rowid())
}

/// Get user by e-mail (case-insensitive), returns (user, password_hash)
pub fn get_user_by_email(conn: &Connection, email: &str) -> Result<Option<(User, String)>> {
    conn.query_row(
        &format!("SELECT {}, password_hash FROM users WHERE email = ?1", USER_COLUMNS),
        params![email],
        |row| Ok((row_to_user(row)?, row.get(7)?)),
    )
    .optional()
}

/// Check if an e-mail is already registered
pub fn email_exists(conn: &Connection, email: &str) -> Result<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM users WHERE email = ?1",
        params![email],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

pub fn get_user_by_id(conn: &Connection, user_id: UserId) -> Result<Option<User>> {
    conn.query_row(
        &format!("SELECT {} FROM users WHERE id = ?1", USER_COLUMNS),
        params![user_id],
        row_to_user,
    )
    .optional()
}

/// All users except `exclude`, newest first
pub fn list_users_except(conn: &Connection, exclude: UserId) -> Result<Vec<User>> {
    let mut stmt = conn.prepare(&format!(
        "SELECT {} FROM users WHERE id != ?1 ORDER BY created_at DESC, id DESC",
        USER_COLUMNS
    ))?;
    let users = stmt
        .query_map(params![exclude], row_to_user)?
        .collect::<Result<Vec<_>>>()?;
    Ok(users)
}

/// Set user role. Returns false if the user does not exist.
pub fn set_user_role(conn: &Connection, user_id: UserId, role: Role) -> Result<bool> {
    let count = conn.execute(
        "UPDATE users SET role = ?1 WHERE id = ?2",
        params![role.as_str(), user_id],
    )?;
    Ok(count > 0)
}

/// Update profile fields; `None` leaves the column untouched
pub fn update_user_profile(
    conn: &Connection,
    user_id: UserId,
    name: Option<&str>,
    phone: Option<&str>,
) -> Result<()> {
    conn.execute(
        "UPDATE users SET name = COALESCE(?1, name), phone = COALESCE(?2, phone) WHERE id = ?3",
        params![name, phone, user_id],
    )?;
    Ok(())
}

/// Update user's last login timestamp
pub fn update_last_login(conn: &Connection, user_id: UserId) -> Result<()> {
    let now = Utc::now().to_rfc3339();
    conn.execute(
        "UPDATE users SET last_login_at = ?1 WHERE id = ?2",
        params![now, user_id],
    )?;
    Ok(())
}

pub fn count_users(conn: &Connection) -> Result<i64> {
    conn.query_row("SELECT COUNT(*) FROM users", [], |row| row.get(0))
}

// ==================== Sessions ====================

/// Create a new session
pub fn create_session(
    conn: &Connection,
    user_id: UserId,
    session_id: &str,
    duration_hours: i64,
) -> Result<()> {
    let now = Utc::now();
    let expires = now + Duration::hours(duration_hours);
    conn.execute(
        "INSERT INTO sessions (id, user_id, created_at, expires_at, last_access_at) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            session_id,
            user_id,
            now.to_rfc3339(),
            expires.to_rfc3339(),
            now.to_rfc3339()
        ],
    )?;
    Ok(())
}

/// Validate a session and resolve the principal behind it
pub fn get_session_principal(conn: &Connection, session_id: &str) -> Result<Option<Principal>> {
    let now = Utc::now().to_rfc3339();
    let principal = conn
        .query_row(
            r#"
        SELECT u.id, u.role
        FROM sessions s
        JOIN users u ON s.user_id = u.id
        WHERE s.id = ?1 AND s.expires_at > ?2
    "#,
            params![session_id, now],
            |row| {
                let role: String = row.get(1)?;
                Ok(Principal {
                    user_id: row.get(0)?,
                    role: Role::from_str(&role),
                })
            },
        )
        .optional()?;

    if principal.is_some() {
        // Update last access time
        let _ = conn.execute(
            "UPDATE sessions SET last_access_at = ?1 WHERE id = ?2",
            params![now, session_id],
        );
    }
    Ok(principal)
}

/// Delete a session (logout)
pub fn delete_session(conn: &Connection, session_id: &str) -> Result<()> {
    conn.execute("DELETE FROM sessions WHERE id = ?1", params![session_id])?;
    Ok(())
}

/// Cleanup expired sessions, returns count of deleted sessions
pub fn cleanup_expired_sessions(conn: &Connection) -> Result<usize> {
    let now = Utc::now().to_rfc3339();
    let count = conn.execute("DELETE FROM sessions WHERE expires_at < ?1", params![now])?;
    Ok(count)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestEnv;

    #[test]
    fn test_create_and_lookup_user() {
        let env = TestEnv::new().unwrap();
        let id = create_user(&env.conn, "Lin", "lin@example.com", Some("555"), "hash", Role::User).unwrap();

        let user = get_user_by_id(&env.conn, id).unwrap().unwrap();
        assert_eq!(user.name, "Lin");
        assert_eq!(user.role, Role::User);
        assert_eq!(user.avatar, DEFAULT_AVATAR);

        let (by_email, hash) = get_user_by_email(&env.conn, "LIN@example.com").unwrap().unwrap();
        assert_eq!(by_email.id, id);
        assert_eq!(hash, "hash");
    }

    #[test]
    fn test_email_unique_case_insensitive() {
        let env = TestEnv::new().unwrap();
        create_user(&env.conn, "Lin", "lin@example.com", None, "h", Role::User).unwrap();
        assert!(email_exists(&env.conn, "Lin@Example.com").unwrap());
        assert!(create_user(&env.conn, "Other", "LIN@example.com", None, "h", Role::User).is_err());
    }

    #[test]
    fn test_set_role_and_profile() {
        let env = TestEnv::new().unwrap();
        let id = env.user("Lin", Role::User);

        assert!(set_user_role(&env.conn, id, Role::Admin).unwrap());
        assert!(!set_user_role(&env.conn, 999, Role::Admin).unwrap());

        update_user_profile(&env.conn, id, None, Some("123")).unwrap();
        let user = get_user_by_id(&env.conn, id).unwrap().unwrap();
        assert_eq!(user.role, Role::Admin);
        assert_eq!(user.name, "Lin");
        assert_eq!(user.phone.as_deref(), Some("123"));
    }

    #[test]
    fn test_unknown_stored_role_reads_as_user() {
        let env = TestEnv::new().unwrap();
        let id = env.user("Lin", Role::Admin);
        env.conn
            .execute("UPDATE users SET role = 'owner' WHERE id = ?1", params![id])
            .unwrap();
        assert_eq!(get_user_by_id(&env.conn, id).unwrap().unwrap().role, Role::User);
    }

    #[test]
    fn test_list_users_excludes_caller() {
        let env = TestEnv::new().unwrap();
        let admin = env.user("Ada", Role::Admin);
        env.user("Lin", Role::User);
        env.user("Sam", Role::User);

        let users = list_users_except(&env.conn, admin).unwrap();
        assert_eq!(users.len(), 2);
        assert!(users.iter().all(|u| u.id != admin));
        assert_eq!(count_users(&env.conn).unwrap(), 3);
    }

    #[test]
    fn test_session_lifecycle() {
        let env = TestEnv::new().unwrap();
        let id = env.user("Lin", Role::User);
        create_session(&env.conn, id, "sess-1", 1).unwrap();

        let principal = get_session_principal(&env.conn, "sess-1").unwrap().unwrap();
        assert_eq!(principal.user_id, id);
        assert_eq!(principal.role, Role::User);

        delete_session(&env.conn, "sess-1").unwrap();
        assert!(get_session_principal(&env.conn, "sess-1").unwrap().is_none());
    }

    #[test]
    fn test_expired_session_rejected_and_cleaned() {
        let env = TestEnv::new().unwrap();
        let id = env.user("Lin", Role::User);
        create_session(&env.conn, id, "old", -1).unwrap();

        assert!(get_session_principal(&env.conn, "old").unwrap().is_none());
        assert_eq!(cleanup_expired_sessions(&env.conn).unwrap(), 1);
    }

    #[test]
    fn test_session_sees_role_changes() {
        let env = TestEnv::new().unwrap();
        let id = env.user("Lin", Role::User);
        create_session(&env.conn, id, "sess", 1).unwrap();
        set_user_role(&env.conn, id, Role::SuperAdmin).unwrap();
        assert_eq!(
            get_session_principal(&env.conn, "sess").unwrap().unwrap().role,
            Role::SuperAdmin
        );
    }
}
