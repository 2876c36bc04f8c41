//! Bedrock runtime client for Anthropic models
//!
//! Sends the Anthropic messages envelope to `InvokeModel` and returns the
//! first text block of the response. No retries.

use super::sigv4::{self, SignableRequest, SigningParams};
use super::{ChatMessage, CompletionRequest, LanguageModel};
use crate::auth::TemporaryCredentials;
use crate::error::{CourseBotError, Result};
use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::time::Instant;

/// Envelope version expected by Anthropic models on Bedrock
pub const ANTHROPIC_VERSION: &str = "bedrock-2023-05-31";

const SIGNING_SERVICE: &str = "bedrock";
const JSON: &str = "application/json";

/// Request body for `InvokeModel`
#[derive(Debug, Serialize)]
pub struct InvokeEnvelope<'a> {
    pub anthropic_version: &'static str,
    pub max_tokens: u32,
    pub temperature: f32,
    pub top_p: f32,
    pub messages: &'a [ChatMessage],
}

impl<'a> InvokeEnvelope<'a> {
    pub fn from_request(request: &'a CompletionRequest) -> Self {
        Self {
            anthropic_version: ANTHROPIC_VERSION,
            max_tokens: request.options.max_tokens,
            temperature: request.options.temperature,
            top_p: request.options.top_p,
            messages: &request.messages,
        }
    }
}

#[derive(Deserialize)]
struct InvokeResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    #[serde(default)]
    text: Option<String>,
}

/// Extract the completion text from an `InvokeModel` response body
pub fn parse_completion(body: &[u8]) -> Result<String> {
    let response: InvokeResponse = serde_json::from_slice(body)?;
    response
        .content
        .into_iter()
        .next()
        .and_then(|block| block.text)
        .ok_or_else(|| CourseBotError::Llm("No text content in model response".to_string()))
}

/// Language model gateway backed by the Bedrock runtime
pub struct BedrockClient {
    http_client: reqwest::Client,
    region: String,
    model_id: String,
    endpoint: String,
    credentials: TemporaryCredentials,
}

impl BedrockClient {
    /// Create client for a model in a region
    pub fn new(
        region: impl Into<String>,
        model_id: impl Into<String>,
        credentials: TemporaryCredentials,
    ) -> Result<Self> {
        let region = region.into();
        let http_client = reqwest::Client::builder().build()?;

        Ok(Self {
            http_client,
            endpoint: format!("https://bedrock-runtime.{}.amazonaws.com", region),
            region,
            model_id: model_id.into(),
            credentials,
        })
    }

    /// Override the runtime endpoint
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into().trim_end_matches('/').to_string();
        self
    }

    fn invoke_path(&self) -> String {
        format!("/model/{}/invoke", sigv4::uri_encode(&self.model_id, true))
    }
}

#[async_trait]
impl LanguageModel for BedrockClient {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let start = Instant::now();
        let body = serde_json::to_vec(&InvokeEnvelope::from_request(request))?;

        let path = self.invoke_path();
        let url = reqwest::Url::parse(&format!("{}{}", self.endpoint, path))
            .map_err(|e| CourseBotError::Config(format!("Invalid Bedrock endpoint: {}", e)))?;
        let host = match (url.host_str(), url.port()) {
            (Some(host), Some(port)) => format!("{}:{}", host, port),
            (Some(host), None) => host.to_string(),
            (None, _) => {
                return Err(CourseBotError::Config(format!(
                    "Bedrock endpoint has no host: {}",
                    self.endpoint
                )))
            }
        };

        if self.credentials.is_expired(Utc::now()) {
            tracing::warn!("Temporary credentials have expired; the request will likely be rejected");
        }

        let signed = sigv4::sign(
            &SigningParams {
                access_key_id: &self.credentials.access_key_id,
                secret_key: &self.credentials.secret_key,
                session_token: Some(&self.credentials.session_token),
                region: &self.region,
                service: SIGNING_SERVICE,
                time: Utc::now(),
            },
            &SignableRequest {
                method: "POST",
                path: &path,
                query: "",
                headers: vec![
                    ("accept".to_string(), JSON.to_string()),
                    ("content-type".to_string(), JSON.to_string()),
                    ("host".to_string(), host),
                ],
                body: &body,
            },
        )?;

        let mut req = self
            .http_client
            .post(url)
            .header("accept", JSON)
            .header("content-type", JSON);
        for (name, value) in signed {
            req = req.header(name, value);
        }

        tracing::debug!(
            "Invoking {} with {} messages ({} bytes)",
            self.model_id,
            request.messages.len(),
            body.len()
        );

        let response = req.body(body).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let text = response.text().await.unwrap_or_default();
            return Err(CourseBotError::ExternalError(format!(
                "Bedrock error (HTTP {}): {}",
                status, text
            )));
        }

        let bytes = response.bytes().await?;
        let content = parse_completion(&bytes)?;

        tracing::debug!(
            "Model responded in {} ms ({} chars)",
            start.elapsed().as_millis(),
            content.len()
        );
        Ok(content)
    }

    fn model_name(&self) -> &str {
        &self.model_id
    }
}
