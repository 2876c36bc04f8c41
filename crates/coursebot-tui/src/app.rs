//! TUI application state

use coursebot_core::{ChatSession, ChatState, SessionContext};
use tokio::sync::watch;

pub struct App {
    pub chat: ChatSession,
    pub state: watch::Receiver<ChatState>,

    pub input: String,
    /// Cursor position in characters
    pub cursor_pos: usize,

    /// Lines scrolled up from the bottom of the conversation
    pub scroll_back: usize,
    pub tick: usize,

    pub should_quit: bool,
}

impl App {
    pub fn new(context: &SessionContext) -> Self {
        Self::with_chat(context.chat())
    }

    pub fn with_chat(chat: ChatSession) -> Self {
        let state = chat.subscribe();
        Self {
            chat,
            state,
            input: String::new(),
            cursor_pos: 0,
            scroll_back: 0,
            tick: 0,
            should_quit: false,
        }
    }

    pub fn current_state(&self) -> ChatState {
        self.state.borrow().clone()
    }

    pub fn is_busy(&self) -> bool {
        self.state.borrow().is_busy()
    }

    /// A submitted message is waiting to be answered
    pub fn has_pending(&self) -> bool {
        matches!(*self.state.borrow(), ChatState::Submitted { .. })
    }

    fn byte_index(&self) -> usize {
        self.input
            .char_indices()
            .nth(self.cursor_pos)
            .map(|(i, _)| i)
            .unwrap_or(self.input.len())
    }

    pub fn insert_char(&mut self, c: char) {
        let index = self.byte_index();
        self.input.insert(index, c);
        self.cursor_pos += 1;
    }

    pub fn delete_char(&mut self) {
        if self.cursor_pos > 0 {
            self.cursor_pos -= 1;
            let index = self.byte_index();
            self.input.remove(index);
        }
    }

    pub fn move_left(&mut self) {
        self.cursor_pos = self.cursor_pos.saturating_sub(1);
    }

    pub fn move_right(&mut self) {
        if self.cursor_pos < self.input.chars().count() {
            self.cursor_pos += 1;
        }
    }

    /// Hand the input line to the chat session
    pub fn submit(&mut self) {
        if self.is_busy() {
            return;
        }
        match self.chat.submit(&self.input) {
            Ok(true) => {
                self.input.clear();
                self.cursor_pos = 0;
                self.scroll_back = 0;
            }
            Ok(false) => {}
            Err(e) => tracing::warn!("Submit rejected: {}", e),
        }
    }

    /// Answer the pending message; failures surface through the chat banner
    pub async fn respond(&mut self) {
        if let Err(e) = self.chat.respond().await {
            tracing::error!("Turn failed: {}", e);
        }
        self.scroll_back = 0;
    }

    pub fn scroll_up(&mut self) {
        self.scroll_back += 1;
    }

    pub fn scroll_down(&mut self) {
        self.scroll_back = self.scroll_back.saturating_sub(1);
    }

    pub fn on_tick(&mut self) {
        self.tick = self.tick.wrapping_add(1);
    }
}
