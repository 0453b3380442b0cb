pub mod course;
pub mod payment;
pub mod user;

pub use course::*;
pub use payment::*;
pub use user::*;

pub type UserId = i64;
pub type CourseId = i64;
pub type LectureId = i64;
