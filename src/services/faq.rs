//! FAQ answers: cached first, then the answer provider.

use async_trait::async_trait;
use serde::Serialize;

use super::ServiceError;
use crate::db::{self, try_lock, DbPool};
use crate::error::{AppError, AppResult};

#[async_trait]
pub trait AnswerProvider: Send + Sync {
    async fn answer(&self, question: &str) -> Result<String, ServiceError>;
}

/// Provider used when no answer backend is configured
pub struct DisabledAnswerProvider;

#[async_trait]
impl AnswerProvider for DisabledAnswerProvider {
    async fn answer(&self, _question: &str) -> Result<String, ServiceError> {
        Err(ServiceError::Provider("No answer provider configured".to_string()))
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AskOutcome {
    pub answer: String,
    pub cached: bool,
}

/// Answer a question from the cache, falling back to the provider and
/// caching what it returns. The database lock is never held across the
/// provider call.
pub async fn ask(pool: &DbPool, provider: &dyn AnswerProvider, question: &str) -> AppResult<AskOutcome> {
    let question = question.trim();
    if question.is_empty() {
        return Err(AppError::bad_request("Question is required"));
    }

    let cached = {
        let conn = try_lock(pool)?;
        db::find_faq_answer(&conn, question)?
    };
    if let Some(answer) = cached {
        tracing::debug!("Serving cached answer for: {}", question);
        return Ok(AskOutcome { answer, cached: true });
    }

    tracing::info!("No cached answer, asking provider for: {}", question);
    let answer = provider.answer(question).await?;
    let answer = answer.trim().to_string();
    if answer.is_empty() {
        return Err(AppError::internal("Answer provider returned an empty answer"));
    }

    let conn = try_lock(pool)?;
    db::insert_faq(&conn, question, &answer, true)?;
    Ok(AskOutcome { answer, cached: false })
}
