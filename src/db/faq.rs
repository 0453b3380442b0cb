//! FAQ answer cache

use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension, Result};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Faq {
    pub id: i64,
    pub question: String,
    pub answer: String,
    pub is_ai_answered: bool,
    pub created_at: String,
}

/// Cached answer for an exact (already trimmed) question
pub fn find_faq_answer(conn: &Connection, question: &str) -> Result<Option<String>> {
    conn.query_row(
        "SELECT answer FROM faqs WHERE question = ?1",
        params![question],
        |row| row.get(0),
    )
    .optional()
}

/// Store an answer. Returns false if the question was already cached.
pub fn insert_faq(conn: &Connection, question: &str, answer: &str, is_ai_answered: bool) -> Result<bool> {
    let now = Utc::now().to_rfc3339();
    let count = conn.execute(
        "INSERT OR IGNORE INTO faqs (question, answer, is_ai_answered, created_at) VALUES (?1, ?2, ?3, ?4)",
        params![question, answer, is_ai_answered, now],
    )?;
    Ok(count > 0)
}

pub fn list_faqs(conn: &Connection) -> Result<Vec<Faq>> {
    let mut stmt =
        conn.prepare("SELECT id, question, answer, is_ai_answered, created_at FROM faqs ORDER BY id")?;
    let faqs = stmt
        .query_map([], |row| {
            Ok(Faq {
                id: row.get(0)?,
                question: row.get(1)?,
                answer: row.get(2)?,
                is_ai_answered: row.get(3)?,
                created_at: row.get(4)?,
            })
        })?
        .collect::<Result<Vec<_>>>()?;
    Ok(faqs)
}

const FIXED_FAQS: &[(&str, &str)] = &[
    (
        "How do I enroll in a new course?",
        "Open the course page and choose Enroll. Paid courses go through checkout first; free courses are added to your account right away.",
    ),
    (
        "How do I reset my password?",
        "Contact support from the login page and we will help you regain access to your account.",
    ),
    (
        "Where can I find course materials?",
        "Every lecture of a course you are enrolled in is listed on the course page, in order.",
    ),
    (
        "How do I complete a lecture that has a quiz?",
        "Submit the quiz and answer at least half of the questions correctly, then mark the lecture as complete.",
    ),
    (
        "How do I get my certificate?",
        "Once every lecture of a course is marked complete, the certificate becomes available from the course page.",
    ),
    (
        "How do I contact my instructor?",
        "The instructor's name is shown on each course page; reach out through the contact details in the course description.",
    ),
];

/// Insert the built-in FAQs that are not present yet. Returns how many were added.
pub fn seed_faqs(conn: &Connection) -> Result<usize> {
    let mut added = 0;
    for (question, answer) in FIXED_FAQS {
        if insert_faq(conn, question, answer, false)? {
            added += 1;
        }
    }
    if added > 0 {
        tracing::info!("Seeded {} FAQ entries", added);
    }
    Ok(added)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::TestEnv;

    #[test]
    fn test_seed_is_idempotent() {
        let env = TestEnv::new().unwrap();
        assert_eq!(seed_faqs(&env.conn).unwrap(), FIXED_FAQS.len());
        assert_eq!(seed_faqs(&env.conn).unwrap(), 0);
        let faqs = list_faqs(&env.conn).unwrap();
        assert_eq!(faqs.len(), FIXED_FAQS.len());
        assert!(faqs.iter().all(|f| !f.is_ai_answered));
    }

    #[test]
    fn test_find_is_exact_match() {
        let env = TestEnv::new().unwrap();
        insert_faq(&env.conn, "What is Rust?", "A language.", true).unwrap();
        assert_eq!(
            find_faq_answer(&env.conn, "What is Rust?").unwrap().as_deref(),
            Some("A language.")
        );
        assert!(find_faq_answer(&env.conn, "what is rust").unwrap().is_none());
    }

    #[test]
    fn test_insert_does_not_overwrite() {
        let env = TestEnv::new().unwrap();
        assert!(insert_faq(&env.conn, "Q", "first", false).unwrap());
        assert!(!insert_faq(&env.conn, "Q", "second", true).unwrap());
        assert_eq!(find_faq_answer(&env.conn, "Q").unwrap().as_deref(), Some("first"));
    }
}
