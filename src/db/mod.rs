pub mod courses;
pub mod faq;
pub mod lectures;
pub mod payments;
pub mod progress;
pub mod quiz_results;
pub mod schema;
pub mod subscriptions;

use rusqlite::{Connection, Result};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

// Re-export all public items from submodules
pub use courses::*;
pub use faq::*;
pub use lectures::*;
pub use payments::*;
pub use progress::*;
pub use quiz_results::*;
pub use schema::run_migrations;
pub use subscriptions::*;

pub type DbPool = Arc<Mutex<Connection>>;

/// Extension trait for logging errors before discarding them
pub trait LogOnError<T> {
  /// Log the error at warn level and return None
  fn log_warn(self, context: &str) -> Option<T>;
  /// Log the error at warn level and return the default
  fn log_warn_default(self, context: &str) -> T
  where
    T: Default;
}

impl<T, E: std::fmt::Display> LogOnError<T> for std::result::Result<T, E> {
  fn log_warn(self, context: &str) -> Option<T> {
    match self {
      Ok(v) => Some(v),
      Err(e) => {
        tracing::warn!("{}: {}", context, e);
        None
      }
    }
  }

  fn log_warn_default(self, context: &str) -> T
  where
    T: Default,
  {
    match self {
      Ok(v) => v,
      Err(e) => {
        tracing::warn!("{}: {}", context, e);
        T::default()
      }
    }
  }
}

/// Error returned when database lock cannot be acquired
#[derive(Debug)]
pub struct DbLockError;

impl std::fmt::Display for DbLockError {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "Database unavailable")
  }
}

impl std::error::Error for DbLockError {}

/// Try to acquire the database lock, returning an error if poisoned
pub fn try_lock(pool: &DbPool) -> std::result::Result<MutexGuard<'_, Connection>, DbLockError> {
  pool.lock().map_err(|_: PoisonError<_>| {
    tracing::error!("Database mutex poisoned - a thread panicked while holding the lock");
    DbLockError
  })
}

/// Apply per-connection settings. Foreign keys drive the lecture and progress cascades.
pub fn configure(conn: &Connection, busy_timeout: Duration) -> Result<()> {
  conn.busy_timeout(busy_timeout)?;
  conn.pragma_update(None, "foreign_keys", "ON")?;
  Ok(())
}

pub fn init_db(path: &Path, busy_timeout: Duration) -> Result<DbPool> {
  if let Some(parent) = path.parent() {
    std::fs::create_dir_all(parent).log_warn("Could not create database directory");
  }

  let conn = Connection::open(path)?;
  configure(&conn, busy_timeout)?;
  run_migrations(&conn)?;
  Ok(Arc::new(Mutex::new(conn)))
}

/// Shared row helper: parse an RFC 3339 column, falling back to now on bad data
pub(crate) fn parse_timestamp(raw: &str) -> chrono::DateTime<chrono::Utc> {
  chrono::DateTime::parse_from_rfc3339(raw)
    .map(|dt| dt.with_timezone(&chrono::Utc))
    .log_warn("Invalid stored timestamp")
    .unwrap_or_else(chrono::Utc::now)
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::testing::TestEnv;

  #[test]
  fn test_init_db_creates_parent_dirs() {
    let env = TestEnv::new().unwrap();
    let path = env.path().join("nested").join("lms.db");
    let pool = init_db(&path, Duration::from_millis(100)).unwrap();
    assert!(path.exists());
    let conn = try_lock(&pool).unwrap();
    let fk: i64 = conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0)).unwrap();
    assert_eq!(fk, 1);
  }

  #[test]
  fn test_init_db_twice_is_idempotent() {
    let env = TestEnv::new().unwrap();
    let path = env.path().join("lms.db");
    drop(init_db(&path, Duration::from_millis(100)).unwrap());
    let pool = init_db(&path, Duration::from_millis(100)).unwrap();
    let conn = try_lock(&pool).unwrap();
    assert_eq!(schema::get_schema_version(&conn).unwrap(), schema::DB_VERSION);
  }

  #[test]
  fn test_log_warn_default() {
    let bad: std::result::Result<i64, String> = Err("boom".into());
    assert_eq!(bad.log_warn_default("ctx"), 0);
    let good: std::result::Result<i64, String> = Ok(7);
    assert_eq!(good.log_warn("ctx"), Some(7));
  }

  #[test]
  fn test_parse_timestamp_roundtrip() {
    let now = chrono::Utc::now();
    let parsed = parse_timestamp(&now.to_rfc3339());
    assert_eq!(parsed.timestamp(), now.timestamp());
  }
}
