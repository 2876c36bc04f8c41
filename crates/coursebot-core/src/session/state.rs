use serde::Serialize;

/// Lifecycle of a single chat turn
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ChatState {
    Idle,
    Submitted { text: String },
    Answering { text: String },
}

impl ChatState {
    pub fn name(&self) -> &'static str {
        match self {
            ChatState::Idle => "idle",
            ChatState::Submitted { .. } => "submitted",
            ChatState::Answering { .. } => "answering",
        }
    }

    /// A turn is in flight
    pub fn is_busy(&self) -> bool {
        !matches!(self, ChatState::Idle)
    }
}
