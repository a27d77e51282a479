use async_trait::async_trait;
use sqlx::postgres::PgPool;
use sqlx::types::Json;
use sqlx::FromRow;

use crate::catalog::{Question, QuestionOption};

use super::{
    AnswerRecord, AnswerStore, NewAnswer, ProgressStore, QuestionSource, SessionRecord,
    SessionStore, StoreError,
};

pub struct Connection {
    pool: PgPool,
}

impl Connection {
    pub async fn connect(connection_string: &str) -> Self {
        let pool = PgPool::connect(connection_string)
            .await
            .expect("Failed to connect to database");
        Self { pool }
    }

    pub async fn run_migrations(&self) {
        sqlx::migrate!()
            .run(&self.pool)
            .await
            .expect("Migrations failed.");
    }
}

#[async_trait]
impl SessionStore for Connection {
    async fn create_session(&self, session_id: &str, user_key: &str) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO sessions (id, telegram_user) VALUES ($1, $2) ON CONFLICT (id) DO NOTHING",
        )
        .bind(session_id)
        .bind(user_key)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn find_session(
        &self,
        session_id: &str,
        user_key: &str,
    ) -> Result<Option<SessionRecord>, StoreError> {
        let session = sqlx::query_as::<_, SessionRecord>(
            "SELECT id, telegram_user, created_at FROM sessions WHERE id = $1 AND telegram_user = $2",
        )
        .bind(session_id)
        .bind(user_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(session)
    }

    async fn latest_session_id(&self, user_key: &str) -> Result<Option<String>, StoreError> {
        let id = sqlx::query_scalar::<_, String>(
            "SELECT id FROM sessions WHERE telegram_user = $1 ORDER BY created_at DESC LIMIT 1",
        )
        .bind(user_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(id)
    }
}

#[async_trait]
impl ProgressStore for Connection {
    async fn progress(&self, session_id: &str) -> Result<Option<i32>, StoreError> {
        let index = sqlx::query_scalar::<_, i32>(
            "SELECT current_question FROM progress WHERE session_id = $1",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(index)
    }

    async fn set_progress(
        &self,
        session_id: &str,
        user_key: &str,
        question_index: i32,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO progress (session_id, telegram_user, current_question, updated_at)
             VALUES ($1, $2, $3, now())
             ON CONFLICT (session_id)
             DO UPDATE SET current_question = EXCLUDED.current_question, updated_at = now()",
        )
        .bind(session_id)
        .bind(user_key)
        .bind(question_index)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl AnswerStore for Connection {
    async fn record_answer(&self, answer: NewAnswer<'_>) -> Result<i64, StoreError> {
        let id = sqlx::query_scalar::<_, i64>(
            "INSERT INTO answers (session_id, telegram_user, question_id, answer_id, is_correct)
             VALUES ($1, $2, $3, $4, NULL)
             RETURNING id",
        )
        .bind(answer.session_id)
        .bind(answer.user_key)
        .bind(answer.question_id)
        .bind(answer.option_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(id)
    }

    async fn update_correctness(&self, answer_id: i64, is_correct: bool) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE answers SET is_correct = $1 WHERE id = $2")
            .bind(is_correct)
            .bind(answer_id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }

        Ok(())
    }

    async fn answers_for_session(&self, session_id: &str) -> Result<Vec<AnswerRecord>, StoreError> {
        let records = sqlx::query_as::<_, AnswerRecord>(
            "SELECT id, session_id, telegram_user, question_id, answer_id, is_correct, created_at
             FROM answers
             WHERE session_id = $1
             ORDER BY created_at ASC, id ASC",
        )
        .bind(session_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }

    async fn history_for_user(&self, user_key: &str) -> Result<Vec<AnswerRecord>, StoreError> {
        let records = sqlx::query_as::<_, AnswerRecord>(
            "SELECT id, session_id, telegram_user, question_id, answer_id, is_correct, created_at
             FROM answers
             WHERE telegram_user = $1
             ORDER BY created_at ASC, id ASC",
        )
        .bind(user_key)
        .fetch_all(&self.pool)
        .await?;

        Ok(records)
    }
}

#[derive(FromRow)]
struct QuestionRow {
    id: i32,
    text: String,
    options: Json<Vec<QuestionOption>>,
}

#[async_trait]
impl QuestionSource for Connection {
    async fn load_questions(&self) -> Result<Vec<Question>, StoreError> {
        let rows = sqlx::query_as::<_, QuestionRow>(
            "SELECT id, text, options FROM questions ORDER BY id ASC",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|row| Question {
                id: row.id,
                text: row.text,
                options: row.options.0,
            })
            .collect())
    }
}
