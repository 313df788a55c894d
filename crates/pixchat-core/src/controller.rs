//! Submission / reply lifecycle
//!
//! The controller owns the conversation and a two-state send lock. A question
//! is accepted only while [`ChatState::Idle`]; the reply (or failure) for it is
//! handed back through [`ChatController::complete`], which always returns the
//! controller to idle. Front ends that must keep drawing while the request is
//! in flight call `submit` and `complete` themselves; everything else can use
//! [`ChatController::ask`].

use crate::api::{AskResponse, Assistant};
use crate::error::Result;
use crate::request::{self, AskRequest};
use crate::state::Message;
use crate::store::{ConversationStore, HISTORY_WINDOW};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChatState {
    #[default]
    Idle,
    Sending,
}

#[derive(Debug)]
pub struct ChatController {
    store: ConversationStore,
    state: ChatState,
}

impl Default for ChatController {
    fn default() -> Self {
        Self::new()
    }
}

impl ChatController {
    pub fn new() -> Self {
        Self {
            store: ConversationStore::new(),
            state: ChatState::Idle,
        }
    }

    pub fn state(&self) -> ChatState {
        self.state
    }

    pub fn is_sending(&self) -> bool {
        self.state == ChatState::Sending
    }

    pub fn messages(&self) -> &[Message] {
        self.store.messages()
    }

    /// Accept a question: lock sending, record the user turn, and return the
    /// request to send. Returns `None` for blank input or while a reply is pending.
    pub fn submit(&mut self, question: &str, user_id: Option<i64>) -> Option<AskRequest> {
        if self.is_sending() {
            tracing::debug!("submit ignored, reply still pending");
            return None;
        }
        if question.trim().is_empty() {
            return None;
        }

        let history = self.store.trailing_window(HISTORY_WINDOW).to_vec();

        self.state = ChatState::Sending;
        self.store.append(Message::user(question));

        Some(request::build(question, user_id, &history))
    }

    /// Record the outcome of the pending request and unlock sending.
    ///
    /// Failures become a fallback assistant message; they never escape.
    /// Returns `None` if nothing was pending.
    pub fn complete(&mut self, outcome: Result<AskResponse>) -> Option<&Message> {
        if !self.is_sending() {
            tracing::warn!("reply arrived with no question pending, dropping it");
            return None;
        }

        let message = match outcome.and_then(AskResponse::into_message) {
            Ok(message) => message,
            Err(err) => {
                tracing::warn!(error = %err, "ask failed");
                Message::fallback(err.user_message())
            }
        };

        self.store.append(message);
        self.state = ChatState::Idle;
        self.store.last()
    }

    /// Submit, wait for the assistant, and record the reply
    pub async fn ask<A: Assistant>(
        &mut self,
        assistant: &A,
        question: &str,
        user_id: Option<i64>,
    ) -> Option<&Message> {
        let request = self.submit(question, user_id)?;
        let outcome = assistant.ask(&request).await;
        self.complete(outcome)
    }

    /// The "typing" placeholder follows the last user message while sending
    pub fn shows_typing_indicator(&self) -> bool {
        self.is_sending() && self.store.last().is_some_and(Message::is_user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::content::{self, Segment};
    use crate::error::{ChatError, CONNECTIVITY_MESSAGE, GENERIC_FAILURE_MESSAGE};
    use crate::state::{Author, ImageRef};
    use std::future::Future;
    use std::sync::Mutex;

    struct FakeAssistant {
        calls: Mutex<Vec<AskRequest>>,
        reply: fn() -> Result<AskResponse>,
    }

    impl FakeAssistant {
        fn new(reply: fn() -> Result<AskResponse>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                reply,
            }
        }

        fn call_count(&self) -> usize {
            self.calls.lock().unwrap().len()
        }
    }

    impl Assistant for FakeAssistant {
        fn ask(&self, request: &AskRequest) -> impl Future<Output = Result<AskResponse>> + Send {
            self.calls.lock().unwrap().push(request.clone());
            std::future::ready((self.reply)())
        }
    }

    fn text_reply(text: &str) -> AskResponse {
        AskResponse {
            text: Some(text.to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_submit_on_empty_store() {
        let mut controller = ChatController::new();
        let request = controller.submit("hello", None).unwrap();

        assert_eq!(controller.state(), ChatState::Sending);
        assert_eq!(controller.messages(), &[Message::user("hello")]);
        assert_eq!(request.question, "hello");
        assert!(request.chat_history.is_empty());
        assert!(request.include_images);
    }

    #[test]
    fn test_blank_submit_rejected() {
        let mut controller = ChatController::new();
        assert!(controller.submit("   \n\t", Some(1)).is_none());
        assert_eq!(controller.state(), ChatState::Idle);
        assert!(controller.messages().is_empty());
    }

    #[test]
    fn test_submit_while_sending_rejected() {
        let mut controller = ChatController::new();
        assert!(controller.submit("first", None).is_some());
        assert!(controller.submit("second", None).is_none());
        assert_eq!(controller.messages().len(), 1);
        assert!(controller.is_sending());
    }

    #[test]
    fn test_history_excludes_new_question() {
        let mut controller = ChatController::new();
        controller.submit("one", Some(1));
        controller.complete(Ok(text_reply("reply one")));

        let request = controller.submit("two", Some(1)).unwrap();
        let contents: Vec<&str> = request
            .chat_history
            .iter()
            .map(|entry| entry.content.as_str())
            .collect();
        assert_eq!(contents, vec!["one", "reply one"]);
        assert_eq!(request.chat_history[1].role, "assistant");
    }

    #[test]
    fn test_history_window_is_bounded() {
        let mut controller = ChatController::new();
        for i in 0..8 {
            controller.submit(&format!("q{}", i), None);
            controller.complete(Ok(text_reply(&format!("a{}", i))));
        }

        let request = controller.submit("last", None).unwrap();
        assert_eq!(request.chat_history.len(), 10);
        assert_eq!(request.chat_history[0].content, "q3");
        assert_eq!(request.chat_history[9].content, "a7");
    }

    #[test]
    fn test_short_history_sent_whole() {
        let mut controller = ChatController::new();
        controller.submit("a", None);
        controller.complete(Ok(text_reply("b")));

        let request = controller.submit("c", None).unwrap();
        let contents: Vec<&str> = request
            .chat_history
            .iter()
            .map(|entry| entry.content.as_str())
            .collect();
        assert_eq!(contents, vec!["a", "b"]);
    }

    #[test]
    fn test_user_content_kept_raw() {
        let mut controller = ChatController::new();
        let request = controller.submit("  padded  ", None).unwrap();
        assert_eq!(request.question, "  padded  ");
        assert_eq!(controller.messages()[0].content, "  padded  ");
    }

    #[test]
    fn test_success_reply_with_inline_image() {
        let mut controller = ChatController::new();
        controller.submit("show me a cat", Some(1));

        let reply = AskResponse {
            text: Some("![cat](http://x/c.png) nice".to_string()),
            images: Some(Vec::new()),
            has_images: Some(false),
            ..Default::default()
        };
        let message = controller.complete(Ok(reply)).unwrap().clone();

        assert_eq!(controller.state(), ChatState::Idle);
        assert_eq!(message.author, Author::Assistant);
        assert!(message.images.is_empty());
        assert!(!message.has_images);
        assert_eq!(
            content::parse(&message.content),
            vec![
                Segment::image("http://x/c.png", "cat"),
                Segment::text(" nice"),
            ]
        );
    }

    #[test]
    fn test_success_reply_fields() {
        let mut controller = ChatController::new();
        controller.submit("q", None);
        let reply = AskResponse {
            response: Some("legacy".to_string()),
            images: Some(vec![ImageRef::new("http://x/a.png", Some("a".to_string()))]),
            has_images: Some(true),
            response_time_ms: Some(420),
            ..Default::default()
        };
        let message = controller.complete(Ok(reply)).unwrap();
        assert_eq!(message.content, "legacy");
        assert_eq!(message.gallery().len(), 1);
        assert_eq!(message.response_time_ms, Some(420));
    }

    #[test]
    fn test_connectivity_failure() {
        let mut controller = ChatController::new();
        controller.submit("anyone there?", None);
        let message = controller
            .complete(Err(ChatError::Connectivity("connection refused".into())))
            .unwrap();

        assert_eq!(message.content, CONNECTIVITY_MESSAGE);
        assert!(message.images.is_empty());
        assert!(!message.has_images);
        assert_eq!(controller.state(), ChatState::Idle);
    }

    #[test]
    fn test_service_and_malformed_failures() {
        let mut controller = ChatController::new();
        controller.submit("q", None);
        let message = controller
            .complete(Err(ChatError::Service { status: 500 }))
            .unwrap();
        assert_eq!(message.content, GENERIC_FAILURE_MESSAGE);

        controller.submit("q again", None);
        let message = controller.complete(Ok(AskResponse::default())).unwrap();
        assert_eq!(message.content, GENERIC_FAILURE_MESSAGE);
        assert_eq!(controller.messages().len(), 4);
    }

    #[test]
    fn test_complete_without_pending_is_ignored() {
        let mut controller = ChatController::new();
        assert!(controller.complete(Ok(text_reply("stray"))).is_none());
        assert!(controller.messages().is_empty());
    }

    #[test]
    fn test_typing_indicator() {
        let mut controller = ChatController::new();
        assert!(!controller.shows_typing_indicator());
        controller.submit("q", None);
        assert!(controller.shows_typing_indicator());
        controller.complete(Ok(text_reply("a")));
        assert!(!controller.shows_typing_indicator());
    }

    #[tokio::test]
    async fn test_ask_round_trip() {
        let assistant = FakeAssistant::new(|| Ok(text_reply("hi back")));
        let mut controller = ChatController::new();

        let reply = controller.ask(&assistant, "hi", Some(7)).await.cloned();

        assert_eq!(reply.map(|m| m.content), Some("hi back".to_string()));
        assert_eq!(assistant.call_count(), 1);
        let calls = assistant.calls.lock().unwrap();
        assert_eq!(calls[0].user_id, Some(7));
        assert!(calls[0].chat_history.is_empty());
    }

    #[tokio::test]
    async fn test_ask_while_sending_issues_no_call() {
        let assistant = FakeAssistant::new(|| Ok(text_reply("unused")));
        let mut controller = ChatController::new();
        controller.submit("pending", None);

        assert!(controller.ask(&assistant, "again", None).await.is_none());
        assert_eq!(assistant.call_count(), 0);
        assert_eq!(controller.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_ask_failure_is_absorbed() {
        let assistant =
            FakeAssistant::new(|| Err(ChatError::Connectivity("unreachable".into())));
        let mut controller = ChatController::new();

        let reply = controller.ask(&assistant, "hello", None).await.cloned();
        assert_eq!(
            reply.map(|m| m.content),
            Some(CONNECTIVITY_MESSAGE.to_string())
        );
        assert_eq!(controller.state(), ChatState::Idle);

        // Session carries on after a failure
        assert!(controller.ask(&assistant, "retry", None).await.is_some());
        assert_eq!(controller.messages().len(), 4);
    }
}
