//! Shared fixtures for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use coursebot_core::llm::{CompletionRequest, Embedder, LanguageModel};
use coursebot_core::{CourseBotError, Result};
use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const VOCABULARY: [&str; 4] = ["biology", "science", "law", "nursing"];

/// Embeds text as keyword presence over a tiny vocabulary, with a final
/// axis for text that mentions none of them
pub struct KeywordEmbedder;

#[async_trait]
impl Embedder for KeywordEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let text = text.to_lowercase();
        let mut vector: Vec<f32> = VOCABULARY
            .iter()
            .map(|word| if text.contains(word) { 1.0 } else { 0.0 })
            .collect();
        let none = vector.iter().all(|v| *v == 0.0);
        vector.push(if none { 1.0 } else { 0.0 });
        Ok(vector)
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let mut out = Vec::with_capacity(texts.len());
        for text in texts {
            out.push(self.embed(text).await?);
        }
        Ok(out)
    }

    fn dimensions(&self) -> Option<usize> {
        Some(VOCABULARY.len() + 1)
    }

    fn model_name(&self) -> &str {
        "keyword-presence"
    }
}

/// Returns canned replies in order and records every request
pub struct ScriptedModel {
    replies: Mutex<VecDeque<String>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedModel {
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: Mutex::new(replies.iter().map(|r| r.to_string()).collect()),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl LanguageModel for ScriptedModel {
    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        self.requests.lock().unwrap().push(request.clone());
        self.replies
            .lock()
            .unwrap()
            .pop_front()
            .ok_or_else(|| CourseBotError::Llm("no scripted reply left".to_string()))
    }

    fn model_name(&self) -> &str {
        "scripted"
    }
}

pub const DATASET: &str = r#"[
    {
        "name": "Bachelor of Science (Biology)",
        "rmit_code": "BP229",
        "campus": "City",
        "atar": 70.05,
        "duration": "3 years full-time",
        "prerequisites": "English",
        "pathways": ["Diploma of Applied Science"],
        "raw_text": "Explore cells, genetics and ecology in the lab."
    },
    {
        "name": "Bachelor of Laws",
        "rmit_code": "BP254",
        "campus": "City",
        "atar": 90.1,
        "duration": "4 years full-time",
        "prerequisites": "English",
        "pathways": [],
        "raw_text": "Legal practice and advocacy."
    },
    {
        "name": "Bachelor of Nursing",
        "rmit_code": "BP365",
        "campus": "Bundoora",
        "atar": null,
        "duration": "3 years full-time",
        "raw_text": "Clinical placements from first year."
    }
]"#;

/// Write the fixture dataset into `dir`
pub fn write_dataset(dir: &Path) -> PathBuf {
    let path = dir.join("courses.json");
    std::fs::write(&path, DATASET).unwrap();
    path
}
