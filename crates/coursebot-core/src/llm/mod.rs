//! LLM integration
//!
//! Provides traits and implementations for:
//! - Chat completions via AWS Bedrock (Anthropic message envelope)
//! - Embedding generation via external services (vLLM, OpenAI, etc.)
//! - AWS Signature Version 4 request signing

mod bedrock;
mod http_embedder;
pub mod sigv4;
mod traits;
mod types;

pub use bedrock::{parse_completion, BedrockClient, InvokeEnvelope, ANTHROPIC_VERSION};
pub use http_embedder::HttpEmbedder;
pub use traits::*;
pub use types::{ChatMessage, CompletionRequest, GenerationOptions, Role};
