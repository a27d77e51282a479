use std::sync::Arc;

use teloxide::{
    payloads::SendMessageSetters, prelude::Requester, types::Message, utils::command::BotCommands,
    Bot,
};
use tracing::instrument;

use crate::catalog::QuestionCatalog;
use crate::driver;
use crate::identity::UserKey;
use crate::keyboard::start_keyboard;
use crate::store::{ProgressStore, SessionStore};
use crate::HandlerResult;

#[derive(Debug, Clone, BotCommands)]
#[command(rename_rule = "lowercase")]
pub enum Command {
    #[command(description = "display help.")]
    Help,
    #[command(description = "start the placement test")]
    Start,
}

pub(crate) async fn help(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, Command::descriptions().to_string())
        .await?;
    Ok(())
}

/// `/start`: a fresh session at question 0 plus the greeting with the
/// "take the test" button.
#[instrument(level = "info", skip(bot, connection, catalog))]
pub(crate) async fn start<S>(
    bot: Bot,
    msg: Message,
    connection: Arc<S>,
    catalog: Arc<QuestionCatalog>,
) -> HandlerResult
where
    S: SessionStore + ProgressStore + Send + Sync,
{
    let user = msg.user_key();
    driver::start_session(connection.as_ref(), &user, &msg.chat.id.to_string()).await?;

    let greeting = format!(
        "Мы поможем тебе!\n\n\
         Всего в тесте {} вопросов 🇮🇹\n\
         Для прохождения — просто выбери правильный ответ. Узнай свой уровень!\n\n\
         Жми — пройти тест👇",
        catalog.count()
    );
    bot.send_message(msg.chat.id, greeting)
        .reply_markup(start_keyboard())
        .await?;

    Ok(())
}
