use teloxide::types::{CallbackQuery, Message};

/// Stable user key for persistence, so the chat transport can be swapped
/// without rewriting the store.
pub(crate) trait UserKey {
    fn user_key(&self) -> String;
}

// Some Telegram accounts only have a numeric id.
impl UserKey for Message {
    fn user_key(&self) -> String {
        self.chat
            .username()
            .map(ToOwned::to_owned)
            .unwrap_or_else(|| self.chat.id.to_string())
    }
}

impl UserKey for CallbackQuery {
    fn user_key(&self) -> String {
        self.from
            .username
            .clone()
            .unwrap_or_else(|| self.from.id.to_string())
    }
}
