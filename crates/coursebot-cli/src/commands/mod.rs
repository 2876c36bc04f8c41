//! CLI command handlers

pub mod ask;
pub mod config;
pub mod populate;
pub mod search;
pub mod status;

use coursebot_core::CourseBotError;

/// Join positional words, rejecting blank input
pub(crate) fn joined(words: &[String], what: &str) -> Result<String, CourseBotError> {
    let text = words.join(" ");
    if text.trim().is_empty() {
        return Err(CourseBotError::InvalidInput(format!(
            "{} must not be empty",
            what
        )));
    }
    Ok(text)
}
