//! Session token generation.
//!
//! Tokens identify rows in the `sessions` table and travel either in the
//! session cookie or as a bearer token.

/// Length of generated session tokens
pub const SESSION_ID_LEN: usize = 32;

/// Generate a new session ID
pub fn generate_session_id() -> String {
  use rand::Rng;
  let mut rng = rand::rng();
  (0..SESSION_ID_LEN)
    .map(|_| {
      let idx = rng.random_range(0..36);
      if idx < 10 {
        (b'0' + idx) as char
      } else {
        (b'a' + idx - 10) as char
      }
    })
    .collect()
}

/// Cheap shape check before touching the database
pub fn is_well_formed_session_id(id: &str) -> bool {
  id.len() == SESSION_ID_LEN && id.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase())
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn test_generated_ids_are_well_formed() {
    for _ in 0..20 {
      assert!(is_well_formed_session_id(&generate_session_id()));
    }
  }

  #[test]
  fn test_generated_ids_differ() {
    assert_ne!(generate_session_id(), generate_session_id());
  }

  #[test]
  fn test_rejects_malformed_ids() {
    assert!(!is_well_formed_session_id(""));
    assert!(!is_well_formed_session_id("ABC"));
    assert!(!is_well_formed_session_id(&"x".repeat(31)));
    assert!(!is_well_formed_session_id(&format!("{}!", "a".repeat(31))));
  }
}
