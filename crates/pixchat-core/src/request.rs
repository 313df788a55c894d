use serde::{Deserialize, Serialize};

use crate::state::Message;

/// One prior turn as the assistant service expects it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub role: String,
    pub content: String,
}

impl From<&Message> for HistoryEntry {
    fn from(message: &Message) -> Self {
        Self {
            role: message.author.as_role().to_string(),
            content: message.content.clone(),
        }
    }
}

/// Body of `POST /chat-bot/ask`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AskRequest {
    pub question: String,
    pub user_id: Option<i64>,
    pub include_images: bool,
    pub chat_history: Vec<HistoryEntry>,
}

/// Assemble the ask payload.
///
/// `history` must be captured before `question` is appended to the store, so
/// the new turn only ever travels as `question`.
pub fn build(question: &str, user_id: Option<i64>, history: &[Message]) -> AskRequest {
    AskRequest {
        question: question.to_string(),
        user_id,
        include_images: true,
        chat_history: history.iter().map(HistoryEntry::from).collect(),
    }
}
