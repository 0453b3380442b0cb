//! Platform statistics and user administration.

use rusqlite::Connection;
use serde::Serialize;

use super::require_author;
use crate::auth::db as users;
use crate::db;
use crate::domain::{Principal, Role, User, UserId};
use crate::error::{AppError, AppResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub total_courses: i64,
    pub total_lectures: i64,
    pub total_users: i64,
}

pub fn stats(conn: &Connection, principal: &Principal) -> AppResult<PlatformStats> {
    require_author(principal)?;
    Ok(PlatformStats {
        total_courses: db::count_courses(conn)?,
        total_lectures: db::count_lectures(conn)?,
        total_users: users::count_users(conn)?,
    })
}

/// Every account except the caller's
pub fn list_users(conn: &Connection, principal: &Principal) -> AppResult<Vec<User>> {
    require_author(principal)?;
    Ok(users::list_users_except(conn, principal.user_id)?)
}

/// Change another user's role. Superadmin only.
pub fn update_role(conn: &Connection, principal: &Principal, user_id: UserId, role: &str) -> AppResult<User> {
    if !principal.role.can_assign_roles() {
        return Err(AppError::forbidden("This endpoint is assigned to superadmin only"));
    }
    let role = role.trim();
    if role.is_empty() {
        return Err(AppError::bad_request("Role is required"));
    }
    let role = Role::parse(role).ok_or_else(|| AppError::bad_request(format!("Unknown role: {}", role)))?;

    if !users::set_user_role(conn, user_id, role)? {
        return Err(AppError::not_found("User not found"));
    }
    tracing::info!("User {} set role of user {} to {}", principal.user_id, user_id, role.as_str());
    users::get_user_by_id(conn, user_id)?.ok_or_else(|| AppError::not_found("User not found"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestEnv;

    #[test]
    fn test_stats_counts_everything() {
        let env = TestEnv::new().unwrap();
        let admin = env.user("Ada", Role::Admin);
        env.user("Lin", Role::User);
        let course = env.course(admin, "Rust", 0);
        env.lecture(course, "L1");
        env.lecture(course, "L2");

        let stats = stats(&env.conn, &Principal { user_id: admin, role: Role::Admin }).unwrap();
        assert_eq!(
            stats,
            PlatformStats {
                total_courses: 1,
                total_lectures: 2,
                total_users: 2
            }
        );
    }

    #[test]
    fn test_list_users_excludes_caller() {
        let env = TestEnv::new().unwrap();
        let admin = env.user("Ada", Role::Admin);
        let learner = env.user("Lin", Role::User);

        let listed = list_users(&env.conn, &Principal { user_id: admin, role: Role::Admin }).unwrap();
        assert_eq!(listed.iter().map(|u| u.id).collect::<Vec<_>>(), vec![learner]);
        assert!(list_users(&env.conn, &Principal { user_id: learner, role: Role::User }).is_err());
    }

    #[test]
    fn test_update_role_rules() {
        let env = TestEnv::new().unwrap();
        let root = env.user("Root", Role::SuperAdmin);
        let admin = env.user("Ada", Role::Admin);
        let learner = env.user("Lin", Role::User);
        let superadmin = Principal { user_id: root, role: Role::SuperAdmin };

        let err = update_role(&env.conn, &Principal { user_id: admin, role: Role::Admin }, learner, "admin")
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        assert!(matches!(
            update_role(&env.conn, &superadmin, learner, "").unwrap_err(),
            AppError::BadRequest(_)
        ));
        assert!(matches!(
            update_role(&env.conn, &superadmin, learner, "wizard").unwrap_err(),
            AppError::BadRequest(_)
        ));
        assert!(matches!(
            update_role(&env.conn, &superadmin, 999, "admin").unwrap_err(),
            AppError::NotFound(_)
        ));

        let promoted = update_role(&env.conn, &superadmin, learner, "admin").unwrap();
        assert_eq!(promoted.role, Role::Admin);
    }
}
