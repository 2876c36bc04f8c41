//! Two-call answer flow: keyword rewrite, retrieval, grounded synthesis

use super::prompts::{context_block, grounded_prompt, keyword_prompt, no_match_prompt};
use super::transcript::{ContextPolicy, Transcript};
use crate::config::RetrievalConfig;
use crate::error::Result;
use crate::llm::{ChatMessage, CompletionRequest, GenerationOptions, LanguageModel};
use crate::store::{QueryMatch, VectorStore};
use serde::Serialize;
use std::sync::Arc;
use std::time::Instant;

/// Whether a distance clears the relevance gate
pub fn is_relevant(distance: f32, threshold: f32) -> bool {
    distance <= threshold
}

/// Matches at or under `threshold`, in retrieval order
pub fn partition_relevant(matches: &[QueryMatch], threshold: f32) -> Vec<QueryMatch> {
    matches
        .iter()
        .filter(|m| is_relevant(m.distance, threshold))
        .cloned()
        .collect()
}

/// Which instruction the synthesis call used
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SynthesisPath {
    Grounded,
    NoMatch,
}

/// Outcome of one full turn
#[derive(Debug, Clone, Serialize)]
pub struct AdvisorReply {
    pub text: String,
    pub keywords: String,
    pub matches: Vec<QueryMatch>,
    pub relevant: usize,
    pub path: SynthesisPath,
}

/// Conversation orchestrator over a language model and a vector store
pub struct Advisor {
    model: Arc<dyn LanguageModel>,
    store: Arc<dyn VectorStore>,
    retrieval: RetrievalConfig,
    generation: GenerationOptions,
    policy: ContextPolicy,
}

impl Advisor {
    pub fn new(model: Arc<dyn LanguageModel>, store: Arc<dyn VectorStore>) -> Self {
        Self {
            model,
            store,
            retrieval: RetrievalConfig::default(),
            generation: GenerationOptions::default(),
            policy: ContextPolicy::SlidingWindow { max_turns: 10 },
        }
    }

    pub fn with_retrieval(mut self, retrieval: RetrievalConfig) -> Self {
        self.retrieval = retrieval;
        self
    }

    pub fn with_generation(mut self, generation: GenerationOptions) -> Self {
        self.generation = generation;
        self
    }

    pub fn with_context_policy(mut self, policy: ContextPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn context_policy(&self) -> ContextPolicy {
        self.policy
    }

    /// Stage 1: rewrite the message into search keywords.
    ///
    /// Only the wrapped instruction is sent. The raw message and the model
    /// output are recorded in `transcript`.
    pub async fn extract_keywords(&self, transcript: &mut Transcript, message: &str) -> Result<String> {
        transcript.push(ChatMessage::user(message));

        let start = Instant::now();
        let request = CompletionRequest::new(
            self.generation,
            vec![ChatMessage::user(keyword_prompt(message))],
        );
        let keywords = self.model.complete(&request).await?;
        tracing::info!(
            "Keyword extraction took {:.2}s",
            start.elapsed().as_secs_f64()
        );
        tracing::debug!("Keywords: {}", keywords);

        transcript.push(ChatMessage::assistant(keywords.clone()));
        Ok(keywords)
    }

    /// Stage 2: nearest course documents for the keyword text
    pub async fn retrieve(&self, keywords: &str) -> Result<Vec<QueryMatch>> {
        let start = Instant::now();
        let matches = self
            .store
            .query(keywords.trim(), self.retrieval.n_results)
            .await?;
        tracing::info!(
            "Retrieved {} matches in {:.2}s",
            matches.len(),
            start.elapsed().as_secs_f64()
        );
        Ok(matches)
    }

    /// Stage 3: compose the answer from the relevant matches, or redirect
    /// when there are none
    pub async fn synthesize(
        &self,
        transcript: &mut Transcript,
        query: &str,
        relevant: &[QueryMatch],
    ) -> Result<(String, SynthesisPath)> {
        let (instruction, path) = if relevant.is_empty() {
            tracing::info!("No relevant documents within threshold");
            (no_match_prompt(query), SynthesisPath::NoMatch)
        } else {
            (
                grounded_prompt(&context_block(relevant), query),
                SynthesisPath::Grounded,
            )
        };

        transcript.push(ChatMessage::user(instruction));
        let messages = transcript.window(self.policy).to_vec();
        tracing::debug!(
            "Synthesis sends {} of {} transcript messages ({} chars)",
            messages.len(),
            transcript.len(),
            messages.iter().map(|m| m.content.len()).sum::<usize>()
        );

        let start = Instant::now();
        let request = CompletionRequest::new(self.generation, messages);
        let text = self.model.complete(&request).await?;
        tracing::info!("Answer generation took {:.2}s", start.elapsed().as_secs_f64());

        transcript.push(ChatMessage::assistant(text.clone()));
        Ok((text, path))
    }

    /// Run all three stages for one user message
    pub async fn answer(&self, transcript: &mut Transcript, message: &str) -> Result<AdvisorReply> {
        let keywords = self.extract_keywords(transcript, message).await?;
        let matches = self.retrieve(&keywords).await?;
        let relevant = partition_relevant(&matches, self.retrieval.relevance_threshold);
        tracing::debug!(
            "{} of {} matches are relevant (threshold {})",
            relevant.len(),
            matches.len(),
            self.retrieval.relevance_threshold
        );

        let (text, path) = self.synthesize(transcript, message, &relevant).await?;
        Ok(AdvisorReply {
            text,
            keywords,
            relevant: relevant.len(),
            matches,
            path,
        })
    }
}
