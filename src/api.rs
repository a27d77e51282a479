use std::sync::Arc;

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::catalog::{Question, QuestionCatalog};
use crate::driver;
use crate::error::QuizError;
use crate::store::{AnswerStore, ProgressStore, SessionStore};

pub struct ApiContext<S> {
    pub store: Arc<S>,
    pub catalog: Arc<QuestionCatalog>,
    pub api_token: String,
}

impl<S> Clone for ApiContext<S> {
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            catalog: self.catalog.clone(),
            api_token: self.api_token.clone(),
        }
    }
}

impl<S> ApiContext<S> {
    /// Token and session-id gate shared by the write endpoints.
    fn authorize<'a>(
        &self,
        token: Option<&str>,
        session_id: Option<&'a str>,
    ) -> Result<&'a str, QuizError> {
        let (Some(token), Some(session_id)) = (token, session_id) else {
            return Err(QuizError::Unauthorized);
        };
        if self.api_token.is_empty() {
            log::error!("No API token configured, rejecting all requests");
            return Err(QuizError::Unauthorized);
        }
        if self.api_token != token {
            return Err(QuizError::Unauthorized);
        }
        Ok(session_id)
    }
}

pub fn router<S>(context: ApiContext<S>) -> Router
where
    S: SessionStore + ProgressStore + AnswerStore + Send + Sync + 'static,
{
    Router::new()
        .route("/questions", get(list_questions::<S>))
        .route("/questions/:id", get(question_by_id::<S>))
        .route("/answers", post(submit_answer::<S>))
        .route("/answers/stats", post(session_stats::<S>))
        .with_state(context)
}

#[derive(Serialize)]
struct Counter {
    total: usize,
    #[serde(rename = "currentNumber", skip_serializing_if = "Option::is_none")]
    current_number: Option<i32>,
}

#[derive(Serialize)]
struct QuestionsResponse {
    items: Vec<Question>,
    counter: Counter,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct AnswerBody {
    #[serde(default)]
    token: Option<String>,
    user_id: String,
    question_id: i32,
    option_id: i32,
    #[serde(default)]
    session_id: Option<String>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatsBody {
    #[serde(default)]
    token: Option<String>,
    user_id: String,
    #[serde(default)]
    session_id: Option<String>,
}

fn message(status: StatusCode, text: &str) -> Response {
    (status, Json(json!({ "message": text }))).into_response()
}

async fn list_questions<S>(State(context): State<ApiContext<S>>) -> Response {
    let questions = context.catalog.all();
    if questions.is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }

    Json(QuestionsResponse {
        items: questions.to_vec(),
        counter: Counter { total: questions.len(), current_number: None },
    })
    .into_response()
}

async fn question_by_id<S>(
    State(context): State<ApiContext<S>>,
    Path(id): Path<i32>,
) -> Response {
    match context.catalog.get(id) {
        Some(question) => Json(QuestionsResponse {
            items: vec![question.clone()],
            counter: Counter {
                total: context.catalog.count(),
                current_number: Some(id),
            },
        })
        .into_response(),
        None => message(StatusCode::NOT_FOUND, "No such question"),
    }
}

async fn submit_answer<S>(
    State(context): State<ApiContext<S>>,
    Json(body): Json<AnswerBody>,
) -> Response
where
    S: SessionStore + ProgressStore + AnswerStore + Send + Sync,
{
    let Ok(session_id) = context.authorize(body.token.as_deref(), body.session_id.as_deref())
    else {
        return message(StatusCode::UNAUTHORIZED, "Unauthorized");
    };

    log::info!(
        "User {} answered q{} with o{}",
        body.user_id,
        body.question_id,
        body.option_id
    );

    match driver::submit_answer(
        context.store.as_ref(),
        context.catalog.as_ref(),
        session_id,
        &body.user_id,
        body.question_id,
        body.option_id,
    )
    .await
    {
        Ok(outcome) => Json(json!({ "status": "ok", "correct": outcome.correct })).into_response(),
        Err(QuizError::NotFound(_)) => {
            message(StatusCode::BAD_REQUEST, "Question or answer not found")
        }
        Err(QuizError::Validation(reason)) => message(StatusCode::BAD_REQUEST, &reason),
        Err(e) => {
            log::error!("Error processing answer: {e}");
            message(StatusCode::INTERNAL_SERVER_ERROR, "Failed to save answer")
        }
    }
}

async fn session_stats<S>(
    State(context): State<ApiContext<S>>,
    Json(body): Json<StatsBody>,
) -> Response
where
    S: SessionStore + ProgressStore + AnswerStore + Send + Sync,
{
    let Ok(session_id) = context.authorize(body.token.as_deref(), body.session_id.as_deref())
    else {
        return message(StatusCode::UNAUTHORIZED, "Unauthorized");
    };

    match driver::session_report(context.store.as_ref(), session_id, &body.user_id).await {
        Ok(report) => Json(report).into_response(),
        Err(QuizError::NotFound(_)) => message(
            StatusCode::NOT_FOUND,
            "No statistics found for this user or session",
        ),
        Err(e) => {
            log::error!("Error fetching statistics: {e}");
            message(StatusCode::INTERNAL_SERVER_ERROR, "Internal server error")
        }
    }
}
