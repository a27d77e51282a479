use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::FromRow;
use thiserror::Error;

use crate::catalog::Question;

pub mod postgres;

#[cfg(test)]
pub(crate) mod memory;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("row not found")]
    NotFound,

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Clone, FromRow)]
pub struct SessionRecord {
    pub id: String,
    pub telegram_user: String,
    pub created_at: DateTime<Utc>,
}

/// A persisted answer. `is_correct` is NULL between the optimistic insert and
/// the verdict update.
#[derive(Debug, Clone, FromRow)]
pub struct AnswerRecord {
    pub id: i64,
    pub session_id: String,
    pub telegram_user: String,
    pub question_id: i32,
    pub answer_id: i32,
    pub is_correct: Option<bool>,
    pub created_at: DateTime<Utc>,
}

pub struct NewAnswer<'a> {
    pub session_id: &'a str,
    pub user_key: &'a str,
    pub question_id: i32,
    pub option_id: i32,
}

#[async_trait]
pub trait SessionStore {
    /// Idempotent: creating an existing session id is a no-op.
    async fn create_session(&self, session_id: &str, user_key: &str) -> Result<(), StoreError>;

    async fn find_session(
        &self,
        session_id: &str,
        user_key: &str,
    ) -> Result<Option<SessionRecord>, StoreError>;

    async fn latest_session_id(&self, user_key: &str) -> Result<Option<String>, StoreError>;
}

#[async_trait]
pub trait ProgressStore {
    /// Callers treat a missing row as index 0; see the driver.
    async fn progress(&self, session_id: &str) -> Result<Option<i32>, StoreError>;

    /// Upsert: one progress row per session.
    async fn set_progress(
        &self,
        session_id: &str,
        user_key: &str,
        question_index: i32,
    ) -> Result<(), StoreError>;
}

#[async_trait]
pub trait AnswerStore {
    /// Appends a pending answer (verdict NULL). The session/question
    /// relationship is validated by the caller, not here.
    async fn record_answer(&self, answer: NewAnswer<'_>) -> Result<i64, StoreError>;

    async fn update_correctness(&self, answer_id: i64, is_correct: bool) -> Result<(), StoreError>;

    async fn answers_for_session(&self, session_id: &str) -> Result<Vec<AnswerRecord>, StoreError>;

    async fn history_for_user(&self, user_key: &str) -> Result<Vec<AnswerRecord>, StoreError>;
}

#[async_trait]
pub trait QuestionSource {
    async fn load_questions(&self) -> Result<Vec<Question>, StoreError>;
}
