use std::error::Error;
use std::sync::Arc;

use teloxide::{
    dispatching::{dialogue::GetChatId, UpdateFilterExt, UpdateHandler},
    dptree,
    payloads::{AnswerCallbackQuerySetters, SendMessageSetters},
    prelude::Requester,
    types::{CallbackQuery, ChatId, Message, Update},
    Bot,
};
use tracing::instrument;

use crate::catalog::{Question, QuestionCatalog};
use crate::commands::{help, start, Command};
use crate::driver::{self, TurnOutcome};
use crate::error::QuizError;
use crate::identity::UserKey;
use crate::keyboard::{options_keyboard, START_QUIZ};
use crate::scoring::ScoreReport;
use crate::store::postgres::Connection;
use crate::store::{AnswerStore, ProgressStore, SessionStore};
use crate::HandlerResult;

pub fn schema() -> UpdateHandler<Box<dyn Error + Send + Sync + 'static>> {
    use dptree::case;

    let command_handler = teloxide::filter_command::<Command, _>()
        .branch(case![Command::Help].endpoint(help))
        .branch(case![Command::Start].endpoint(start::<Connection>));

    let message_handler = Update::filter_message()
        .branch(command_handler)
        .endpoint(invalid_input);

    let callback_handler = Update::filter_callback_query()
        .branch(
            dptree::filter(|q: CallbackQuery| q.data.as_deref() == Some(START_QUIZ))
                .endpoint(begin_quiz::<Connection>),
        )
        .endpoint(take_answer::<Connection>);

    dptree::entry()
        .branch(message_handler)
        .branch(callback_handler)
}

/// The "take the test" button: resume the latest session or open a new one,
/// then serve whatever the session points at.
#[instrument(level = "info", skip(bot, connection, catalog))]
pub(crate) async fn begin_quiz<S>(
    bot: Bot,
    q: CallbackQuery,
    connection: Arc<S>,
    catalog: Arc<QuestionCatalog>,
) -> HandlerResult
where
    S: SessionStore + ProgressStore + AnswerStore + Send + Sync,
{
    bot.answer_callback_query(q.id.clone()).await?;
    let Some(chat_id) = q.chat_id() else {
        return Ok(());
    };
    let user = q.user_key();

    let session_id = match connection
        .latest_session_id(&user)
        .await
        .map_err(QuizError::from)?
    {
        Some(id) => id,
        // The button can outlive the session, e.g. after a redeploy.
        None => driver::start_session(connection.as_ref(), &user, &chat_id.to_string()).await?,
    };

    match driver::current_question(connection.as_ref(), catalog.as_ref(), &session_id, &user).await
    {
        Ok(TurnOutcome::Question { question, number, total }) => {
            bot.send_message(
                chat_id,
                format!("Всего в тесте {total} вопросов 🤩\nВыбери правильный ответ⬇"),
            )
            .await?;
            send_question(&bot, chat_id, &question, number).await?;
        }
        Ok(TurnOutcome::Finished(report)) => {
            send_report(&bot, chat_id, &report, catalog.count()).await?;
        }
        Err(QuizError::NotFound(_)) => {
            bot.send_message(chat_id, "Пока нет доступных вопросов. Загляни позже 🙌")
                .await?;
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

/// An option button: grade the answer for the question the session points at,
/// then advance or deliver the final report.
#[instrument(level = "info", skip(bot, connection, catalog))]
pub(crate) async fn take_answer<S>(
    bot: Bot,
    q: CallbackQuery,
    connection: Arc<S>,
    catalog: Arc<QuestionCatalog>,
) -> HandlerResult
where
    S: SessionStore + ProgressStore + AnswerStore + Send + Sync,
{
    let Some(data) = q.data.clone() else {
        bot.answer_callback_query(q.id.clone())
            .text("Вместо текста, пожалуйста, выберите один из вариантов")
            .await?;
        return Ok(());
    };

    let Ok(option_id) = data.parse::<i32>() else {
        log::error!("Invalid callback payload: {data}");
        bot.answer_callback_query(q.id.clone()).await?;
        return Ok(());
    };

    bot.answer_callback_query(q.id.clone()).await?;
    let Some(chat_id) = q.chat_id() else {
        return Ok(());
    };
    let user = q.user_key();

    let Some(session_id) = connection
        .latest_session_id(&user)
        .await
        .map_err(QuizError::from)?
    else {
        bot.send_message(chat_id, "Сначала жми /start 🙌").await?;
        return Ok(());
    };

    // The answered question is the one the session currently points at.
    let question_id = match driver::current_question(
        connection.as_ref(),
        catalog.as_ref(),
        &session_id,
        &user,
    )
    .await
    {
        Ok(TurnOutcome::Question { question, .. }) => question.id,
        Ok(TurnOutcome::Finished(report)) => {
            send_report(&bot, chat_id, &report, catalog.count()).await?;
            return Ok(());
        }
        Err(QuizError::NotFound(_)) => {
            bot.send_message(chat_id, "Пока нет доступных вопросов. Загляни позже 🙌")
                .await?;
            return Ok(());
        }
        Err(e) => return Err(e.into()),
    };

    log::info!("{user} answered q{question_id} with o{option_id}");

    match driver::submit_answer(
        connection.as_ref(),
        catalog.as_ref(),
        &session_id,
        &user,
        question_id,
        option_id,
    )
    .await
    {
        Ok(outcome) => match outcome.next {
            TurnOutcome::Question { question, number, .. } => {
                send_question(&bot, chat_id, &question, number).await?;
            }
            TurnOutcome::Finished(report) => {
                bot.send_message(chat_id, "🎉 Тест пройден!").await?;
                send_report(&bot, chat_id, &report, catalog.count()).await?;
            }
        },
        Err(QuizError::NotFound(what)) => {
            log::error!("Rejected answer for session {session_id}: {what} not found");
            bot.send_message(chat_id, "Такого варианта нет. Выбери один из вариантов ниже⬇")
                .await?;
        }
        Err(QuizError::Validation(reason)) => {
            log::info!("Rejected answer for session {session_id}: {reason}");
            bot.send_message(chat_id, "Тест уже пройден 🎉 Жми /start, чтобы начать заново.")
                .await?;
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}

async fn send_question(
    bot: &Bot,
    chat_id: ChatId,
    question: &Question,
    number: usize,
) -> HandlerResult {
    bot.send_message(chat_id, format!("Вопрос №{number}\n{}", question.text))
        .reply_markup(options_keyboard(&question.options))
        .await?;
    Ok(())
}

async fn send_report(
    bot: &Bot,
    chat_id: ChatId,
    report: &ScoreReport,
    total: usize,
) -> HandlerResult {
    bot.send_message(
        chat_id,
        format!(
            "🎉 Вы прошли тест!\n\n\
             Правильных ответов: {} из {}\n\
             Ваш уровень: {}",
            report.correct_answers, total, report.proficiency_level
        ),
    )
    .await?;
    Ok(())
}

#[instrument(level = "info", skip(bot))]
async fn invalid_input(bot: Bot, msg: Message) -> HandlerResult {
    log::info!("{}: unexpected message {:?}", msg.user_key(), msg.text());
    bot.send_message(
        msg.chat.id,
        "Не понимаю 🤷 Жми /start, чтобы пройти тест, или /help.",
    )
    .await?;
    Ok(())
}
