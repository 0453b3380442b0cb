//! Project path functions - single source of truth for on-disk locations.
//!
//! ## Environment Variables
//!
//! - `DATA_DIR`: Override the base data directory (default: "data")
//!
//! Explicit `DATABASE_PATH` / `UPLOADS_DIR` settings in config.rs take
//! precedence over the paths derived here.

use std::env;
use std::sync::OnceLock;

/// Lazily initialized data directory from DATA_DIR env var
static DATA_DIR_VALUE: OnceLock<String> = OnceLock::new();

/// Get the base data directory (from DATA_DIR env var or default "data")
pub fn data_dir() -> &'static str {
    DATA_DIR_VALUE.get_or_init(|| env::var("DATA_DIR").unwrap_or_else(|_| "data".to_string()))
}

/// SQLite database path
pub fn db_path() -> String {
    format!("{}/lms.db", data_dir())
}

/// Root directory for uploaded media (course images, lecture videos)
pub fn uploads_dir() -> String {
    format!("{}/uploads", data_dir())
}
