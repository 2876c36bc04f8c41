//! Chat turn state machine

use super::state::ChatState;
use crate::error::{CourseBotError, Result};
use crate::llm::ChatMessage;
use crate::rag::{Advisor, AdvisorReply, Transcript};
use std::sync::Arc;
use tokio::sync::watch;

/// First assistant message shown in every new session
pub const GREETING: &str = "Hello! I'm RMITbot, your helpful assistant for RMIT courses. \
How can I assist you today? I'd be happy to provide information about the official RMIT \
course offerings. Please let me know if you have any specific questions.";

/// One user's conversation: what is shown, what the model sees, and where the
/// current turn is
pub struct ChatSession {
    advisor: Arc<Advisor>,
    display: Vec<ChatMessage>,
    context: Transcript,
    state: watch::Sender<ChatState>,
    error: Option<String>,
}

impl ChatSession {
    pub fn new(advisor: Arc<Advisor>) -> Self {
        let (state, _) = watch::channel(ChatState::Idle);
        Self {
            advisor,
            display: vec![ChatMessage::assistant(GREETING)],
            context: Transcript::new(),
            state,
            error: None,
        }
    }

    pub fn state(&self) -> ChatState {
        self.state.borrow().clone()
    }

    /// Receiver notified on every state change
    pub fn subscribe(&self) -> watch::Receiver<ChatState> {
        self.state.subscribe()
    }

    /// Messages shown to the user, greeting first
    pub fn display(&self) -> &[ChatMessage] {
        &self.display
    }

    /// Messages exchanged with the model
    pub fn context(&self) -> &Transcript {
        &self.context
    }

    /// Banner text from the last failed turn
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    fn invalid(&self, event: &'static str) -> CourseBotError {
        CourseBotError::InvalidTransition {
            event,
            state: self.state.borrow().name().to_string(),
        }
    }

    /// Queue a user message. Blank input is ignored and returns `false`.
    pub fn submit(&mut self, text: &str) -> Result<bool> {
        if !matches!(*self.state.borrow(), ChatState::Idle) {
            return Err(self.invalid("submit"));
        }
        if text.trim().is_empty() {
            return Ok(false);
        }

        self.error = None;
        self.state.send_replace(ChatState::Submitted {
            text: text.to_string(),
        });
        Ok(true)
    }

    /// Move the queued message into the conversation and start answering it
    pub fn begin_answer(&mut self) -> Result<String> {
        let submitted = match &*self.state.borrow() {
            ChatState::Submitted { text } => Some(text.clone()),
            _ => None,
        };
        let text = submitted.ok_or_else(|| self.invalid("begin_answer"))?;

        self.display.push(ChatMessage::user(text.clone()));
        self.state.send_replace(ChatState::Answering { text: text.clone() });
        Ok(text)
    }

    /// Record the assistant reply and return to idle
    pub fn finish(&mut self, reply: impl Into<String>) -> Result<()> {
        if !matches!(*self.state.borrow(), ChatState::Answering { .. }) {
            return Err(self.invalid("finish"));
        }

        self.display.push(ChatMessage::assistant(reply));
        self.state.send_replace(ChatState::Idle);
        Ok(())
    }

    /// Abandon the turn with a banner; model-context entries already added stay
    pub fn fail(&mut self, error: impl Into<String>) -> Result<()> {
        if !matches!(*self.state.borrow(), ChatState::Answering { .. }) {
            return Err(self.invalid("fail"));
        }

        self.error = Some(error.into());
        self.state.send_replace(ChatState::Idle);
        Ok(())
    }

    /// Answer the submitted message
    pub async fn respond(&mut self) -> Result<AdvisorReply> {
        let text = self.begin_answer()?;

        match self.advisor.answer(&mut self.context, &text).await {
            Ok(reply) => {
                self.finish(reply.text.clone())?;
                Ok(reply)
            }
            Err(e) => {
                tracing::error!("Failed to answer message: {}", e);
                self.fail(format!("Sorry, something went wrong: {}", e))?;
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{CompletionRequest, LanguageModel, Role};
    use crate::store::{QueryMatch, StoredDocument, VectorStore};
    use async_trait::async_trait;

    struct EchoModel {
        fail: bool,
    }

    #[async_trait]
    impl LanguageModel for EchoModel {
        async fn complete(&self, request: &CompletionRequest) -> Result<String> {
            if self.fail {
                return Err(CourseBotError::ExternalError("Bedrock error (HTTP 500)".into()));
            }
            Ok(format!("reply to {} messages", request.messages.len()))
        }

        fn model_name(&self) -> &str {
            "echo"
        }
    }

    struct EmptyStore;

    #[async_trait]
    impl VectorStore for EmptyStore {
        fn count(&self) -> Result<usize> {
            Ok(0)
        }

        async fn add(&self, _documents: Vec<StoredDocument>) -> Result<()> {
            Ok(())
        }

        async fn query(&self, _text: &str, _k: usize) -> Result<Vec<QueryMatch>> {
            Ok(Vec::new())
        }
    }

    fn session(fail: bool) -> ChatSession {
        let advisor = Advisor::new(Arc::new(EchoModel { fail }), Arc::new(EmptyStore));
        ChatSession::new(Arc::new(advisor))
    }

    #[test]
    fn test_new_session_shows_greeting() {
        let session = session(false);
        assert_eq!(session.state(), ChatState::Idle);
        assert_eq!(session.display(), &[ChatMessage::assistant(GREETING)]);
        assert!(session.context().is_empty());
    }

    #[test]
    fn test_blank_submit_is_ignored() {
        let mut session = session(false);
        assert!(!session.submit("   \n").unwrap());
        assert_eq!(session.state(), ChatState::Idle);
    }

    #[test]
    fn test_illegal_transitions_are_rejected() {
        let mut session = session(false);
        assert!(matches!(
            session.begin_answer(),
            Err(CourseBotError::InvalidTransition { event: "begin_answer", .. })
        ));
        assert!(session.finish("x").is_err());
        assert!(session.fail("x").is_err());

        session.submit("hello").unwrap();
        assert!(matches!(
            session.submit("again"),
            Err(CourseBotError::InvalidTransition { event: "submit", .. })
        ));
        assert!(session.finish("x").is_err());
    }

    #[tokio::test]
    async fn test_respond_walks_the_states() {
        let mut session = session(false);
        let mut states = session.subscribe();

        session.submit("I like art").unwrap();
        assert!(states.has_changed().unwrap());
        assert_eq!(
            *states.borrow_and_update(),
            ChatState::Submitted {
                text: "I like art".into()
            }
        );

        let reply = session.respond().await.unwrap();
        assert_eq!(session.state(), ChatState::Idle);
        assert_eq!(*states.borrow_and_update(), ChatState::Idle);

        let display = session.display();
        assert_eq!(display.len(), 3);
        assert_eq!(display[1], ChatMessage::user("I like art"));
        assert_eq!(display[2].role, Role::Assistant);
        assert_eq!(display[2].content, reply.text);
        assert_eq!(session.context().len(), 4);
    }

    #[tokio::test]
    async fn test_failed_turn_sets_banner_and_returns_idle() {
        let mut session = session(true);
        session.submit("hello").unwrap();

        assert!(session.respond().await.is_err());
        assert_eq!(session.state(), ChatState::Idle);
        assert!(session.error().unwrap().contains("HTTP 500"));
        assert_eq!(session.display().len(), 2);
        assert_eq!(session.context().len(), 1);

        session.submit("retry").unwrap();
        assert!(session.error().is_none());
    }
}
