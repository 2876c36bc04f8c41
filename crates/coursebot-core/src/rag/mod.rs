//! Conversation orchestration
//!
//! Each user message goes through two model calls: one rewrites the message
//! into search keywords, the other answers from whatever course documents
//! the keywords retrieve. Both calls are recorded in a [`Transcript`].

mod advisor;
pub mod prompts;
mod transcript;

pub use advisor::{is_relevant, partition_relevant, Advisor, AdvisorReply, SynthesisPath};
pub use transcript::{ContextPolicy, Transcript};
