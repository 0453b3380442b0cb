use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use super::{CourseId, LectureId, UserId};

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: CourseId,
    pub title: String,
    pub description: String,
    pub category: String,
    pub image: Option<String>,
    /// Price in whole currency units
    pub price: i64,
    /// Duration in hours
    pub duration: i64,
    /// Owner; None once the owning account is gone
    pub created_by: Option<UserId>,
    pub created_at: DateTime<Utc>,
}

impl Course {
    pub fn is_owned_by(&self, user_id: UserId) -> bool {
        self.created_by == Some(user_id)
    }
}

/// Course with its owner's display name, for listings
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseListing {
    #[serde(flatten)]
    pub course: Course,
    pub instructor: String,
}

/// Text form of a JSON scalar. Numbers and booleans compare by their text;
/// null, arrays and objects have none.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn text_from_scalar<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Value::deserialize(deserializer)?;
    scalar_text(&value).ok_or_else(|| serde::de::Error::custom(format!("expected text, got {}", value)))
}

fn texts_from_scalars<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    Vec::<Value>::deserialize(deserializer)?
        .iter()
        .map(|value| {
            scalar_text(value).ok_or_else(|| serde::de::Error::custom(format!("expected text, got {}", value)))
        })
        .collect()
}

/// A single quiz question. `correct_answer` is compared case-insensitively.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestion {
    #[serde(alias = "prompt")]
    pub question: String,
    #[serde(default, deserialize_with = "texts_from_scalars")]
    pub options: Vec<String>,
    #[serde(deserialize_with = "text_from_scalar")]
    pub correct_answer: String,
}

/// Question as shown to learners (no answer key)
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicQuizQuestion {
    pub question: String,
    pub options: Vec<String>,
}

impl From<&QuizQuestion> for PublicQuizQuestion {
    fn from(q: &QuizQuestion) -> Self {
        Self {
            question: q.question.clone(),
            options: q.options.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Lecture {
    pub id: LectureId,
    pub course_id: CourseId,
    pub title: String,
    pub description: String,
    pub video: Option<String>,
    pub position: i64,
    #[serde(skip)]
    pub quiz: Vec<QuizQuestion>,
    pub created_at: DateTime<Utc>,
}

impl Lecture {
    /// A lecture with a quiz needs a passing result before it counts as complete
    pub fn has_quiz(&self) -> bool {
        !self.quiz.is_empty()
    }
}

/// Lecture as returned by the API: quiz presence without the answer key
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LectureView {
    #[serde(flatten)]
    pub lecture: Lecture,
    pub has_quiz: bool,
    pub quiz_length: usize,
}

impl From<Lecture> for LectureView {
    fn from(lecture: Lecture) -> Self {
        let has_quiz = lecture.has_quiz();
        let quiz_length = lecture.quiz.len();
        Self {
            lecture,
            has_quiz,
            quiz_length,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lecture(quiz: Vec<QuizQuestion>) -> Lecture {
        Lecture {
            id: 1,
            course_id: 1,
            title: "Intro".into(),
            description: "Basics".into(),
            video: None,
            position: 1,
            quiz,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_has_quiz() {
        assert!(!lecture(vec![]).has_quiz());
        let q = QuizQuestion {
            question: "2+2?".into(),
            options: vec!["3".into(), "4".into()],
            correct_answer: "4".into(),
        };
        assert!(lecture(vec![q]).has_quiz());
    }

    #[test]
    fn test_question_accepts_prompt_alias() {
        let q: QuizQuestion =
            serde_json::from_str(r#"{"prompt": "Capital of France?", "correctAnswer": "Paris"}"#)
                .unwrap();
        assert_eq!(q.question, "Capital of France?");
        assert!(q.options.is_empty());
    }

    #[test]
    fn test_scalar_answers_become_text() {
        let q: QuizQuestion = serde_json::from_value(serde_json::json!({
            "question": "2+2?",
            "options": [3, 4, "five"],
            "correctAnswer": 4
        }))
        .unwrap();
        assert_eq!(q.correct_answer, "4");
        assert_eq!(q.options, vec!["3", "4", "five"]);

        let q: QuizQuestion =
            serde_json::from_str(r#"{"question": "Is Rust safe?", "correctAnswer": true}"#).unwrap();
        assert_eq!(q.correct_answer, "true");

        assert!(serde_json::from_str::<QuizQuestion>(r#"{"question": "?", "correctAnswer": null}"#).is_err());
        assert!(serde_json::from_str::<QuizQuestion>(r#"{"question": "?", "correctAnswer": ["a"]}"#).is_err());
    }

    #[test]
    fn test_scalar_text() {
        assert_eq!(scalar_text(&serde_json::json!("Paris")), Some("Paris".to_string()));
        assert_eq!(scalar_text(&serde_json::json!(4)), Some("4".to_string()));
        assert_eq!(scalar_text(&serde_json::json!(true)), Some("true".to_string()));
        assert_eq!(scalar_text(&Value::Null), None);
        assert_eq!(scalar_text(&serde_json::json!(["a"])), None);
    }

    #[test]
    fn test_lecture_view_hides_answer_key() {
        let q = QuizQuestion {
            question: "2+2?".into(),
            options: vec![],
            correct_answer: "4".into(),
        };
        let view = LectureView::from(lecture(vec![q]));
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["hasQuiz"], true);
        assert_eq!(json["quizLength"], 1);
        assert!(json.get("quiz").is_none());
    }

    #[test]
    fn test_course_ownership() {
        let course = Course {
            id: 1,
            title: "Rust".into(),
            description: "Systems".into(),
            category: "Programming".into(),
            image: None,
            price: 100,
            duration: 10,
            created_by: Some(3),
            created_at: Utc::now(),
        };
        assert!(course.is_owned_by(3));
        assert!(!course.is_owned_by(4));

        let orphan = Course { created_by: None, ..course };
        assert!(!orphan.is_owned_by(3));
    }
}
