//! JSON handlers for the `/api` surface.
//!
//! Handlers stay thin: extract, lock, call into `catalog` / `completion`,
//! shape the response. The database lock is released before any await.

pub mod admin;
pub mod certificate;
pub mod courses;
pub mod enrollment;
pub mod faq;
pub mod progress;
pub mod quiz;

pub use admin::{
  add_lecture, create_course, delete_course, delete_lecture, list_users, stats, update_course,
  update_lecture, update_role,
};
pub use certificate::certificate;
pub use courses::{all_lectures, get_course, get_lecture, list_courses, list_lectures, my_courses};
pub use enrollment::{checkout, enroll_free, verify_payment};
pub use faq::ask;
pub use progress::{completed_courses, dashboard, get_progress, mark_complete};
pub use quiz::{clear_quiz, create_quiz, get_quiz, quiz_results, submit_quiz, update_quiz};
