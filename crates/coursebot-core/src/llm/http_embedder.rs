//! HTTP-based embedder using an external embedding service

use super::Embedder;
use crate::config::EmbeddingServiceConfig;
use crate::error::{CourseBotError, Result};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Embedder that uses an OpenAI-compatible `/v1/embeddings` endpoint
pub struct HttpEmbedder {
    http_client: reqwest::Client,
    config: EmbeddingServiceConfig,
}

#[derive(Serialize)]
struct EmbedRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Deserialize)]
struct EmbedResponse {
    data: Vec<EmbedData>,
}

#[derive(Deserialize)]
struct EmbedData {
    #[serde(default)]
    index: Option<usize>,
    embedding: Vec<f32>,
}

impl HttpEmbedder {
    /// Create from configuration
    pub fn from_config(config: EmbeddingServiceConfig) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            http_client,
            config,
        })
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let results = self.embed_batch(&[text.to_string()]).await?;
        results
            .into_iter()
            .next()
            .ok_or_else(|| CourseBotError::Embedding("No embedding returned".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!("{}/v1/embeddings", self.config.url.trim_end_matches('/'));
        let mut req = self.http_client.post(&url).json(&EmbedRequest {
            model: &self.config.model,
            input: texts,
        });

        if let Some(ref api_key) = self.config.api_key {
            req = req.header("Authorization", format!("Bearer {}", api_key));
        }

        tracing::debug!("Embedding batch of {} texts", texts.len());
        let response = req.send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(CourseBotError::ExternalError(format!(
                "Embedding service error (HTTP {}): {}",
                status, body
            )));
        }

        let mut embed_response: EmbedResponse = response.json().await?;
        if embed_response.data.len() != texts.len() {
            return Err(CourseBotError::Embedding(format!(
                "Expected {} embeddings, got {}",
                texts.len(),
                embed_response.data.len()
            )));
        }

        // Services may answer out of order; `index` restores input order
        embed_response
            .data
            .sort_by_key(|d| d.index.unwrap_or(usize::MAX));
        Ok(embed_response
            .data
            .into_iter()
            .map(|d| d.embedding)
            .collect())
    }

    fn dimensions(&self) -> Option<usize> {
        self.config.dimensions
    }

    fn model_name(&self) -> &str {
        &self.config.model
    }
}
