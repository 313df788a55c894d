use crate::state::Message;

/// Number of prior messages sent back to the assistant as context
pub const HISTORY_WINDOW: usize = 10;

/// Append-only log of the current session's messages, in chronological order
#[derive(Debug, Default, Clone)]
pub struct ConversationStore {
    messages: Vec<Message>,
}

impl ConversationStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append(&mut self, message: Message) {
        self.messages.push(message);
    }

    /// The last `n` messages (fewer if the store is shorter), oldest first
    pub fn trailing_window(&self, n: usize) -> &[Message] {
        let start = self.messages.len().saturating_sub(n);
        &self.messages[start..]
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn last(&self) -> Option<&Message> {
        self.messages.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store_with(count: usize) -> ConversationStore {
        let mut store = ConversationStore::new();
        for i in 0..count {
            if i % 2 == 0 {
                store.append(Message::user(format!("q{}", i)));
            } else {
                store.append(Message::fallback(format!("a{}", i)));
            }
        }
        store
    }

    #[test]
    fn test_trailing_window_longer_store() {
        let store = store_with(15);
        let window = store.trailing_window(HISTORY_WINDOW);
        assert_eq!(window.len(), 10);
        assert_eq!(window[0].content, "a5");
        assert_eq!(window[9].content, "q14");
        assert_eq!(store.messages().len(), 15);
    }

    #[test]
    fn test_trailing_window_shorter_store() {
        let store = store_with(3);
        let window = store.trailing_window(HISTORY_WINDOW);
        let contents: Vec<&str> = window.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["q0", "a1", "q2"]);
    }

    #[test]
    fn test_trailing_window_empty_and_zero() {
        assert!(ConversationStore::new().trailing_window(HISTORY_WINDOW).is_empty());
        assert!(store_with(4).trailing_window(0).is_empty());
    }

    #[test]
    fn test_append_keeps_order() {
        let mut store = ConversationStore::new();
        store.append(Message::user("first"));
        store.append(Message::fallback("second"));
        assert_eq!(store.messages()[0].content, "first");
        assert_eq!(store.last().map(|m| m.content.as_str()), Some("second"));
    }
}
