//! The completion engine: quiz scoring, quiz-gated lecture completion,
//! course and dashboard aggregation, enrollment and certificates.
//!
//! Every operation here is synchronous over a `&Connection` except the ones
//! that call out to the payment gateway.

pub mod aggregator;
pub mod certificate;
pub mod enrollment;
pub mod quiz;
pub mod tracker;

pub use aggregator::{completed_courses, dashboard, my_courses};
pub use certificate::issue_certificate;
pub use enrollment::{checkout, enroll_free, verify_payment, PaymentProof, VerifyOutcome};
pub use quiz::{evaluate, submit_quiz, QuizOutcome};
pub use tracker::{get_progress, mark_complete, CourseProgress, MarkOutcome};
