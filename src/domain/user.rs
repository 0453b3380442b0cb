use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{LectureId, UserId};

/// Account role. Ordered by privilege.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
    SuperAdmin,
}

impl Role {
    /// Parse a stored role; unknown strings fall back to `User`
    pub fn from_str(s: &str) -> Self {
        match s {
            "admin" => Self::Admin,
            "superadmin" => Self::SuperAdmin,
            _ => Self::User,
        }
    }

    /// Strict parse for role assignment requests
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "user" => Some(Self::User),
            "admin" => Some(Self::Admin),
            "superadmin" => Some(Self::SuperAdmin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Admin => "admin",
            Self::SuperAdmin => "superadmin",
        }
    }

    /// May create courses, lectures and quizzes (ownership still applies per course)
    pub fn can_author_courses(&self) -> bool {
        *self >= Self::Admin
    }

    /// May read lectures of courses without a subscription
    pub fn can_view_all_lectures(&self) -> bool {
        *self >= Self::Admin
    }

    pub fn can_assign_roles(&self) -> bool {
        *self == Self::SuperAdmin
    }
}

/// The authenticated identity every core operation runs as.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Principal {
    pub user_id: UserId,
    pub role: Role,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub role: Role,
    pub avatar: String,
    pub created_at: DateTime<Utc>,
}

/// Latest quiz attempt of a user for one lecture
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizResult {
    pub score: u32,
    pub passed: bool,
}

/// One entry of a user's quiz progress, serialized as an explicit pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizProgressEntry {
    pub lecture_id: LectureId,
    pub score: u32,
    pub passed: bool,
}

impl QuizProgressEntry {
    pub fn new(lecture_id: LectureId, result: QuizResult) -> Self {
        Self {
            lecture_id,
            score: result.score,
            passed: result.passed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_from_str_known() {
        assert_eq!(Role::from_str("user"), Role::User);
        assert_eq!(Role::from_str("admin"), Role::Admin);
        assert_eq!(Role::from_str("superadmin"), Role::SuperAdmin);
    }

    #[test]
    fn test_role_from_str_unknown_is_user() {
        assert_eq!(Role::from_str("root"), Role::User);
        assert_eq!(Role::from_str(""), Role::User);
    }

    #[test]
    fn test_role_parse_is_strict() {
        assert_eq!(Role::parse(" Admin "), Some(Role::Admin));
        assert_eq!(Role::parse("SUPERADMIN"), Some(Role::SuperAdmin));
        assert_eq!(Role::parse("moderator"), None);
    }

    #[test]
    fn test_role_as_str_roundtrip() {
        for role in [Role::User, Role::Admin, Role::SuperAdmin] {
            assert_eq!(Role::from_str(role.as_str()), role);
        }
    }

    #[test]
    fn test_capability_table() {
        assert!(!Role::User.can_author_courses());
        assert!(Role::Admin.can_author_courses());
        assert!(Role::SuperAdmin.can_author_courses());

        assert!(!Role::User.can_view_all_lectures());
        assert!(Role::Admin.can_view_all_lectures());

        assert!(!Role::User.can_assign_roles());
        assert!(!Role::Admin.can_assign_roles());
        assert!(Role::SuperAdmin.can_assign_roles());
    }

    #[test]
    fn test_quiz_progress_entry_serializes_as_pair() {
        let entry = QuizProgressEntry::new(7, QuizResult { score: 2, passed: true });
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["lectureId"], 7);
        assert_eq!(json["score"], 2);
        assert_eq!(json["passed"], true);
    }
}
