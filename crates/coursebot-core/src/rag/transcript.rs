//! Model-context transcript and the policy deciding how much of it is sent

use crate::llm::{ChatMessage, Role};
use serde::{Deserialize, Serialize};

/// How much conversation history accompanies a synthesis call
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ContextPolicy {
    /// Send the whole transcript
    Unbounded,
    /// Send the last `max_turns` exchanges plus the pending user message
    SlidingWindow { max_turns: usize },
}

/// Every message exchanged with the model, in call order
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Transcript {
    messages: Vec<ChatMessage>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, message: ChatMessage) {
        self.messages.push(message);
    }

    pub fn messages(&self) -> &[ChatMessage] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    /// The slice to send under `policy`; never starts on an assistant entry
    pub fn window(&self, policy: ContextPolicy) -> &[ChatMessage] {
        let start = match policy {
            ContextPolicy::Unbounded => 0,
            ContextPolicy::SlidingWindow { max_turns } => {
                let limit = max_turns.saturating_mul(2).saturating_add(1);
                self.messages.len().saturating_sub(limit)
            }
        };

        let start = self.messages[start..]
            .iter()
            .position(|m| m.role == Role::User)
            .map(|offset| start + offset)
            .unwrap_or(self.messages.len());

        &self.messages[start..]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transcript(turns: usize) -> Transcript {
        let mut t = Transcript::new();
        for i in 0..turns {
            t.push(ChatMessage::user(format!("q{}", i)));
            t.push(ChatMessage::assistant(format!("a{}", i)));
        }
        t.push(ChatMessage::user("pending"));
        t
    }

    #[test]
    fn test_unbounded_sends_everything() {
        let t = transcript(20);
        assert_eq!(t.window(ContextPolicy::Unbounded).len(), 41);
    }

    #[test]
    fn test_sliding_window_is_bounded_and_starts_on_user() {
        let t = transcript(20);
        let window = t.window(ContextPolicy::SlidingWindow { max_turns: 3 });
        assert_eq!(window.len(), 7);
        assert_eq!(window[0], ChatMessage::user("q17"));
        assert_eq!(window.last().unwrap(), &ChatMessage::user("pending"));
    }

    #[test]
    fn test_window_skips_leading_assistant_entry() {
        let mut t = Transcript::new();
        t.push(ChatMessage::user("q0"));
        t.push(ChatMessage::assistant("a0"));
        t.push(ChatMessage::assistant("a0-extra"));
        t.push(ChatMessage::user("q1"));
        let window = t.window(ContextPolicy::SlidingWindow { max_turns: 1 });
        assert_eq!(window, &[ChatMessage::user("q1")]);
    }

    #[test]
    fn test_short_transcript_fits_window() {
        let t = transcript(1);
        assert_eq!(t.window(ContextPolicy::SlidingWindow { max_turns: 10 }).len(), 3);
        assert!(Transcript::new()
            .window(ContextPolicy::SlidingWindow { max_turns: 2 })
            .is_empty());
    }
}
