//! Chat controller
//!
//! Owns the conversation store, the typing animation and the loading flag.
//! A submission is split in two halves so a front end can run the network
//! call in the background: [`ChatController::begin_submit`] records the user
//! message and hands back a ticket, and [`ChatController::finish_submit`]
//! applies the endpoint result for that ticket.

use crate::ai::{ChatEndpoint, Reply};
use crate::error::ChatError;
use crate::state::ChatMessage;
use crate::store::ConversationStore;
use crate::typing::{Typewriter, TypingStep};

/// Assistant message recorded when the endpoint cannot be reached
pub const ERROR_REPLY: &str = "Error: could not get response";

/// A submitted message waiting for its reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingRequest {
    pub id: u64,
    pub message: String,
}

#[derive(Debug)]
pub struct ChatController {
    store: ConversationStore,
    typewriter: Typewriter,
    loading: bool,
    next_request: u64,
    pending: Option<u64>,
}

impl ChatController {
    pub fn new(store: ConversationStore) -> Self {
        Self {
            store,
            typewriter: Typewriter::new(),
            loading: false,
            next_request: 0,
            pending: None,
        }
    }

    pub fn messages(&self) -> &[ChatMessage] {
        self.store.messages()
    }

    pub fn store(&self) -> &ConversationStore {
        &self.store
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn is_typing(&self) -> bool {
        self.typewriter.is_active()
    }

    /// Whether a new message would be accepted
    pub fn can_submit(&self) -> bool {
        !self.loading && !self.typewriter.is_active()
    }

    /// Partially revealed reply, while a typing session is active
    pub fn typing_text(&self) -> Option<&str> {
        self.typewriter.revealed()
    }

    pub fn typing_generation(&self) -> u64 {
        self.typewriter.generation()
    }

    /// Record a user message and return the request to send.
    ///
    /// Returns `None` without touching the log when the text is blank or a
    /// reply is still loading or typing.
    pub fn begin_submit(&mut self, user_text: &str) -> Option<PendingRequest> {
        let message = user_text.trim();
        if message.is_empty() || !self.can_submit() {
            return None;
        }

        self.store.append(ChatMessage::user(message));
        self.loading = true;
        self.next_request += 1;
        self.pending = Some(self.next_request);

        tracing::debug!(request = self.next_request, "submitted chat message");
        Some(PendingRequest {
            id: self.next_request,
            message: message.to_string(),
        })
    }

    /// Apply the endpoint result for request `id`.
    ///
    /// Results for requests dropped by [`clear`](Self::clear) are ignored.
    /// Returns whether the result was applied.
    pub fn finish_submit(&mut self, id: u64, result: Result<Reply, ChatError>) -> bool {
        if self.pending != Some(id) {
            tracing::debug!(request = id, "dropping reply for cleared request");
            return false;
        }

        match result {
            Ok(reply) => {
                self.typewriter.start(reply.into_text());
            }
            Err(e) => {
                tracing::warn!(request = id, error = %e, "chat request failed");
                self.store.append(ChatMessage::assistant(ERROR_REPLY));
            }
        }

        self.pending = None;
        self.loading = false;
        true
    }

    /// Submit and wait for the reply inline.
    pub async fn submit(&mut self, endpoint: &dyn ChatEndpoint, user_text: &str) -> bool {
        let Some(request) = self.begin_submit(user_text) else {
            return false;
        };
        let result = endpoint.send(&request.message).await;
        self.finish_submit(request.id, result)
    }

    /// Advance the typing animation; a finished reply joins the log.
    pub fn tick(&mut self, generation: u64) -> Option<TypingStep> {
        let step = self.typewriter.tick(generation)?;
        if let TypingStep::Finished(text) = &step {
            self.store.append(ChatMessage::assistant(text.clone()));
        }
        Some(step)
    }

    /// Reveal the rest of the active reply immediately.
    pub fn finish_typing(&mut self) {
        let generation = self.typewriter.generation();
        while let Some(step) = self.tick(generation) {
            if matches!(step, TypingStep::Finished(_)) {
                break;
            }
        }
    }

    /// Forget the conversation, any typing session, and any pending reply.
    pub fn clear(&mut self) {
        if self.typewriter.cancel() {
            tracing::debug!("cancelled typing session");
        }
        self.pending = None;
        self.loading = false;
        self.store.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::FALLBACK_REPLY;
    use crate::state::ChatRole;
    use crate::storage::MemoryStorage;
    use crate::store::HISTORY_KEY;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeEndpoint {
        reply: Option<Reply>,
        calls: AtomicUsize,
    }

    impl FakeEndpoint {
        fn replying(reply: Reply) -> Self {
            Self {
                reply: Some(reply),
                calls: AtomicUsize::new(0),
            }
        }

        fn failing() -> Self {
            Self {
                reply: None,
                calls: AtomicUsize::new(0),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ChatEndpoint for FakeEndpoint {
        fn name(&self) -> &str {
            "fake"
        }

        async fn send(&self, _message: &str) -> Result<Reply, ChatError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.reply
                .clone()
                .ok_or_else(|| ChatError::remote("fake", 500, "Error communicating with provider"))
        }
    }

    fn controller() -> ChatController {
        ChatController::new(ConversationStore::load(Box::new(MemoryStorage::new())))
    }

    fn type_out(chat: &mut ChatController) {
        let generation = chat.typing_generation();
        while let Some(step) = chat.tick(generation) {
            if matches!(step, TypingStep::Finished(_)) {
                return;
            }
        }
    }

    #[tokio::test]
    async fn test_reply_is_typed_then_committed() {
        let mut chat = controller();
        let endpoint = FakeEndpoint::replying(Reply::Content("### Hi\n- 🎉 done".to_string()));

        assert!(chat.submit(&endpoint, "  hello  ").await);
        assert_eq!(chat.messages(), &[ChatMessage::user("hello")]);
        assert!(chat.is_typing());
        assert!(!chat.is_loading());

        type_out(&mut chat);
        assert!(!chat.is_typing());
        assert_eq!(
            chat.messages(),
            &[
                ChatMessage::user("hello"),
                ChatMessage::assistant("### Hi\n- 🎉 done"),
            ]
        );
    }

    #[tokio::test]
    async fn test_blank_input_is_noop() {
        let mut chat = controller();
        let endpoint = FakeEndpoint::replying(Reply::Text("x".to_string()));

        assert!(!chat.submit(&endpoint, "").await);
        assert!(!chat.submit(&endpoint, " \t\n").await);
        assert!(chat.messages().is_empty());
        assert_eq!(endpoint.calls(), 0);
    }

    #[tokio::test]
    async fn test_submit_while_typing_is_noop() {
        let mut chat = controller();
        let endpoint = FakeEndpoint::replying(Reply::Text("slow reply".to_string()));

        chat.submit(&endpoint, "first").await;
        assert!(chat.is_typing());

        assert!(!chat.submit(&endpoint, "second").await);
        assert_eq!(chat.messages().len(), 1);
        assert_eq!(endpoint.calls(), 1);
    }

    #[test]
    fn test_submit_while_loading_is_noop() {
        let mut chat = controller();
        assert!(chat.begin_submit("first").is_some());
        assert!(chat.begin_submit("second").is_none());
        assert_eq!(chat.messages().len(), 1);
    }

    #[tokio::test]
    async fn test_failure_appends_single_error() {
        let mut chat = controller();
        let endpoint = FakeEndpoint::failing();

        chat.submit(&endpoint, "hello").await;
        assert_eq!(
            chat.messages(),
            &[ChatMessage::user("hello"), ChatMessage::assistant(ERROR_REPLY)]
        );
        assert!(!chat.is_loading());
        assert!(!chat.is_typing());
        assert!(chat.can_submit());
    }

    #[tokio::test]
    async fn test_missing_reply_uses_placeholder() {
        let mut chat = controller();
        chat.submit(&FakeEndpoint::replying(Reply::Missing), "hello").await;
        type_out(&mut chat);
        assert_eq!(chat.messages()[1], ChatMessage::assistant(FALLBACK_REPLY));
    }

    #[test]
    fn test_user_message_persisted_before_reply() {
        let mut chat = controller();
        chat.begin_submit("question").unwrap();

        let raw = chat.store().storage().get(HISTORY_KEY).unwrap().unwrap();
        let persisted: Vec<ChatMessage> = serde_json::from_str(&raw).unwrap();
        assert_eq!(persisted, vec![ChatMessage::user("question")]);
        assert!(chat.is_loading());
    }

    #[test]
    fn test_clear_mid_reveal_commits_nothing() {
        for stop_after in [0, 1, 3, 5] {
            let mut chat = controller();
            let request = chat.begin_submit("hi").unwrap();
            chat.finish_submit(request.id, Ok(Reply::Text("hello".to_string())));

            let generation = chat.typing_generation();
            for _ in 0..stop_after {
                chat.tick(generation);
            }
            chat.clear();

            // Ticks already queued for the old session must not revive it
            for _ in 0..10 {
                assert_eq!(chat.tick(generation), None);
            }
            assert!(chat.messages().is_empty());
            assert!(chat.typing_text().is_none());
        }
    }

    #[test]
    fn test_reply_after_clear_is_dropped() {
        let mut chat = controller();
        let request = chat.begin_submit("hi").unwrap();
        chat.clear();
        assert!(!chat.is_loading());

        assert!(!chat.finish_submit(request.id, Ok(Reply::Text("late".to_string()))));
        assert!(!chat.is_typing());
        assert!(chat.messages().is_empty());
    }

    #[test]
    fn test_finish_typing_commits_full_text() {
        let mut chat = controller();
        let request = chat.begin_submit("hi").unwrap();
        chat.finish_submit(request.id, Ok(Reply::Text("all at once".to_string())));
        chat.tick(chat.typing_generation());

        chat.finish_typing();
        assert_eq!(chat.messages().last().map(|m| m.role), Some(ChatRole::Assistant));
        assert_eq!(chat.messages()[1].content, "all at once");
        assert!(chat.can_submit());
    }
}
