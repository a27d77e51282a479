//! In-memory store used by unit tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Utc;

use super::{
    AnswerRecord, AnswerStore, NewAnswer, ProgressStore, SessionRecord, SessionStore, StoreError,
};

#[derive(Default)]
struct Inner {
    sessions: Vec<SessionRecord>,
    progress: HashMap<String, (String, i32)>,
    answers: Vec<AnswerRecord>,
    next_answer_id: i64,
}

#[derive(Default)]
pub(crate) struct MemoryStore {
    inner: Mutex<Inner>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn session_count(&self) -> usize {
        self.inner.lock().unwrap().sessions.len()
    }

    pub(crate) fn progress_rows(&self) -> usize {
        self.inner.lock().unwrap().progress.len()
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn create_session(&self, session_id: &str, user_key: &str) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        if inner.sessions.iter().any(|s| s.id == session_id) {
            return Ok(());
        }
        inner.sessions.push(SessionRecord {
            id: session_id.to_owned(),
            telegram_user: user_key.to_owned(),
            created_at: Utc::now(),
        });
        Ok(())
    }

    async fn find_session(
        &self,
        session_id: &str,
        user_key: &str,
    ) -> Result<Option<SessionRecord>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .sessions
            .iter()
            .find(|s| s.id == session_id && s.telegram_user == user_key)
            .cloned())
    }

    async fn latest_session_id(&self, user_key: &str) -> Result<Option<String>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .sessions
            .iter()
            .rev()
            .find(|s| s.telegram_user == user_key)
            .map(|s| s.id.clone()))
    }
}

#[async_trait]
impl ProgressStore for MemoryStore {
    async fn progress(&self, session_id: &str) -> Result<Option<i32>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner.progress.get(session_id).map(|(_, index)| *index))
    }

    async fn set_progress(
        &self,
        session_id: &str,
        user_key: &str,
        question_index: i32,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner
            .progress
            .insert(session_id.to_owned(), (user_key.to_owned(), question_index));
        Ok(())
    }
}

#[async_trait]
impl AnswerStore for MemoryStore {
    async fn record_answer(&self, answer: NewAnswer<'_>) -> Result<i64, StoreError> {
        let mut inner = self.inner.lock().unwrap();
        inner.next_answer_id += 1;
        let id = inner.next_answer_id;
        inner.answers.push(AnswerRecord {
            id,
            session_id: answer.session_id.to_owned(),
            telegram_user: answer.user_key.to_owned(),
            question_id: answer.question_id,
            answer_id: answer.option_id,
            is_correct: None,
            created_at: Utc::now(),
        });
        Ok(id)
    }

    async fn update_correctness(&self, answer_id: i64, is_correct: bool) -> Result<(), StoreError> {
        let mut inner = self.inner.lock().unwrap();
        let record = inner
            .answers
            .iter_mut()
            .find(|a| a.id == answer_id)
            .ok_or(StoreError::NotFound)?;
        record.is_correct = Some(is_correct);
        Ok(())
    }

    async fn answers_for_session(&self, session_id: &str) -> Result<Vec<AnswerRecord>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .answers
            .iter()
            .filter(|a| a.session_id == session_id)
            .cloned()
            .collect())
    }

    async fn history_for_user(&self, user_key: &str) -> Result<Vec<AnswerRecord>, StoreError> {
        let inner = self.inner.lock().unwrap();
        Ok(inner
            .answers
            .iter()
            .filter(|a| a.telegram_user == user_key)
            .cloned()
            .collect())
    }
}
