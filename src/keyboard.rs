use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::catalog::QuestionOption;

/// Callback payload of the "take the test" button.
pub(crate) const START_QUIZ: &str = "start_quiz";

pub(crate) fn start_keyboard() -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![InlineKeyboardButton::callback(
        "Пройти тест 📝",
        START_QUIZ,
    )]])
}

pub(crate) fn options_keyboard(options: &[QuestionOption]) -> InlineKeyboardMarkup {
    let keyboard: Vec<Vec<InlineKeyboardButton>> = options
        .iter()
        .map(|option| {
            vec![InlineKeyboardButton::callback(
                option.text.clone(),
                option.id.to_string(),
            )]
        })
        .collect();

    InlineKeyboardMarkup::new(keyboard)
}
