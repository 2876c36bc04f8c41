//! Chat sessions and the shared resources behind them

mod chat;
mod context;
mod state;

pub use chat::{ChatSession, GREETING};
pub use context::{open_database, open_store, SessionContext};
pub use state::ChatState;
