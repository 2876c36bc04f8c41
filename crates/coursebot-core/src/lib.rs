//! Coursebot Core Library
//!
//! Core functionality for coursebot, a retrieval-augmented course advisor.
//!
//! # Features
//! - Course dataset loading into a SQLite-backed vector store
//! - Cognito user-pool login federated into temporary AWS credentials
//! - Anthropic models on Bedrock via SigV4-signed InvokeModel calls
//! - Keyword rewriting, relevance-gated retrieval and grounded answers
//! - Chat turn state machine with subscribable state

pub mod auth;
pub mod config;
pub mod corpus;
pub mod db;
pub mod error;
pub mod llm;
pub mod rag;
pub mod session;
pub mod store;

#[cfg(test)]
mod test_support;

pub use auth::{CognitoIdentityProvider, IdentityProvider, TemporaryCredentials};
pub use config::{AwsConfig, Config, CorpusConfig, EmbeddingServiceConfig, RetrievalConfig};
pub use corpus::{load_dataset, populate, CourseRecord, PopulateOutcome};
pub use db::{Database, DatabaseStats};
pub use error::{AuthError, CourseBotError, Error, Result};
pub use llm::{
    BedrockClient, ChatMessage, CompletionRequest, Embedder, GenerationOptions, HttpEmbedder,
    LanguageModel, Role,
};
pub use rag::{Advisor, AdvisorReply, ContextPolicy, SynthesisPath, Transcript};
pub use session::{ChatSession, ChatState, SessionContext};
pub use store::{QueryMatch, SqliteVectorStore, StoredDocument, VectorStore};

/// Default cache directory name
pub const CACHE_DIR_NAME: &str = "coursebot";

/// Default config directory name
pub const CONFIG_DIR_NAME: &str = "coursebot";
