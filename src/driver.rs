use uuid::Uuid;

use crate::catalog::{Question, QuestionCatalog};
use crate::error::QuizError;
use crate::scoring::{self, ScoreReport};
use crate::store::{AnswerStore, NewAnswer, ProgressStore, SessionStore};

/// What the caller should deliver next: another question or the final report.
#[derive(Debug)]
pub enum TurnOutcome {
    Question {
        question: Question,
        /// 1-based position, for display.
        number: usize,
        total: usize,
    },
    Finished(ScoreReport),
}

#[derive(Debug)]
pub struct AnswerOutcome {
    pub correct: bool,
    pub next: TurnOutcome,
}

/// Creates a fresh session with progress 0 and returns its id.
pub async fn start_session<S>(store: &S, user_key: &str, chat_key: &str) -> Result<String, QuizError>
where
    S: SessionStore + ProgressStore,
{
    let session_id = format!("{user_key}_{chat_key}_{}", Uuid::new_v4());
    store.create_session(&session_id, user_key).await?;
    store.set_progress(&session_id, user_key, 0).await?;

    log::info!("Started session {session_id} for {user_key}");
    Ok(session_id)
}

/// Serves the question the session currently points at. A session without a
/// progress row reads as index 0 and gets its row recreated; a session past
/// the last question gets its report again.
pub async fn current_question<S>(
    store: &S,
    catalog: &QuestionCatalog,
    session_id: &str,
    user_key: &str,
) -> Result<TurnOutcome, QuizError>
where
    S: ProgressStore + AnswerStore,
{
    let total = catalog.count();
    if total == 0 {
        return Err(QuizError::NotFound("question"));
    }

    let index = store.progress(session_id).await?.unwrap_or(0);
    store.set_progress(session_id, user_key, index).await?;

    let index = index as usize;
    if index >= total {
        let records = store.answers_for_session(session_id).await?;
        return Ok(TurnOutcome::Finished(scoring::score(&records)));
    }

    let question = catalog
        .by_index(index)
        .ok_or(QuizError::NotFound("question"))?;

    Ok(TurnOutcome::Question {
        question: question.clone(),
        number: index + 1,
        total,
    })
}

/// One answer turn: validate against the catalog, persist the answer with its
/// verdict, then advance. Progress is only written after the answer row is
/// durable, so a failed turn can be retried without skipping a question.
pub async fn submit_answer<S>(
    store: &S,
    catalog: &QuestionCatalog,
    session_id: &str,
    user_key: &str,
    question_id: i32,
    option_id: i32,
) -> Result<AnswerOutcome, QuizError>
where
    S: ProgressStore + AnswerStore,
{
    let total = catalog.count();
    if total == 0 {
        return Err(QuizError::NotFound("question"));
    }

    let question = catalog
        .get(question_id)
        .ok_or(QuizError::NotFound("question"))?;
    let option = question
        .option(option_id)
        .ok_or(QuizError::NotFound("option"))?;
    let correct = option.is_correct;

    let index = store.progress(session_id).await?.unwrap_or(0) as usize;
    if index >= total {
        return Err(QuizError::Validation("quiz already completed".to_owned()));
    }

    // Two-phase write: pending row first, verdict second.
    let answer_id = store
        .record_answer(NewAnswer {
            session_id,
            user_key,
            question_id,
            option_id,
        })
        .await?;
    store.update_correctness(answer_id, correct).await?;

    let next_index = index + 1;
    store
        .set_progress(session_id, user_key, next_index as i32)
        .await?;

    if next_index >= total {
        let records = store.answers_for_session(session_id).await?;
        let report = scoring::score(&records);
        log::info!(
            "Session {session_id} finished with {}/{total}",
            report.correct_answers
        );
        return Ok(AnswerOutcome {
            correct,
            next: TurnOutcome::Finished(report),
        });
    }

    let question = catalog
        .by_index(next_index)
        .ok_or(QuizError::NotFound("question"))?;

    Ok(AnswerOutcome {
        correct,
        next: TurnOutcome::Question {
            question: question.clone(),
            number: next_index + 1,
            total,
        },
    })
}

/// Final statistics for one session; the session must exist for this user.
pub async fn session_report<S>(
    store: &S,
    session_id: &str,
    user_key: &str,
) -> Result<ScoreReport, QuizError>
where
    S: SessionStore + AnswerStore,
{
    store
        .find_session(session_id, user_key)
        .await?
        .ok_or(QuizError::NotFound("session"))?;

    let records = store.answers_for_session(session_id).await?;
    Ok(scoring::score(&records))
}
