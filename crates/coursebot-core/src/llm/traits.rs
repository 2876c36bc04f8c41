//! LLM trait definitions

use super::CompletionRequest;
use crate::error::Result;
use async_trait::async_trait;

/// Hosted chat model that turns a message list into a text completion
#[async_trait]
pub trait LanguageModel: Send + Sync {
    /// Send the request and return the first text completion
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;

    /// Get model name
    fn model_name(&self) -> &str;
}

/// Embedding generation trait
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate embedding for single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for batch of texts
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    /// Declared embedding dimensions, if known up front
    fn dimensions(&self) -> Option<usize>;

    /// Get model name
    fn model_name(&self) -> &str;
}
