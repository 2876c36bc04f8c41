//! Configuration management
//!
//! Settings come from `<config_dir>/coursebot/config.yml` and can be
//! overridden field-by-field with `COURSEBOT_*` environment variables.

use crate::error::{CourseBotError, Result};
use crate::llm::GenerationOptions;
use crate::rag::ContextPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

const REDACTED: &str = "********";

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Cloud identity and model settings
    #[serde(default)]
    pub aws: AwsConfig,

    /// Similarity search settings
    #[serde(default)]
    pub retrieval: RetrievalConfig,

    /// Sampling options sent with every model call
    #[serde(default)]
    pub generation: GenerationOptions,

    /// Embedding service used by the vector store
    #[serde(default)]
    pub embedding: EmbeddingServiceConfig,

    /// Course corpus settings
    #[serde(default)]
    pub corpus: CorpusConfig,

    /// Conversation turns sent to the model as context (0 = whole transcript)
    #[serde(default = "default_context_turns")]
    pub context_turns: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            aws: AwsConfig::default(),
            retrieval: RetrievalConfig::default(),
            generation: GenerationOptions::default(),
            embedding: EmbeddingServiceConfig::default(),
            corpus: CorpusConfig::default(),
            context_turns: default_context_turns(),
        }
    }
}

/// Identity federation and model endpoint settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AwsConfig {
    #[serde(default = "default_region")]
    pub region: String,

    #[serde(default)]
    pub model_id: String,

    #[serde(default)]
    pub identity_pool_id: String,

    #[serde(default)]
    pub user_pool_id: String,

    #[serde(default)]
    pub app_client_id: String,

    #[serde(default)]
    pub username: String,

    #[serde(default)]
    pub password: String,
}

impl Default for AwsConfig {
    fn default() -> Self {
        Self {
            region: default_region(),
            model_id: String::new(),
            identity_pool_id: String::new(),
            user_pool_id: String::new(),
            app_client_id: String::new(),
            username: String::new(),
            password: String::new(),
        }
    }
}

/// Retrieval parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Number of nearest documents requested per query
    #[serde(default = "default_n_results")]
    pub n_results: usize,

    /// Maximum embedding distance for a match to count as relevant.
    ///
    /// Distances are squared Euclidean over unit-length embeddings, so they
    /// range over `[0, 4]`: `0` is identical, `2` is orthogonal. Matches at
    /// or below the threshold are relevant.
    #[serde(default = "default_relevance_threshold")]
    pub relevance_threshold: f32,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            n_results: default_n_results(),
            relevance_threshold: default_relevance_threshold(),
        }
    }
}

/// Embedding service configuration (OpenAI-compatible `/v1/embeddings`)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingServiceConfig {
    #[serde(default = "default_embedding_url")]
    pub url: String,

    #[serde(default = "default_embedding_model")]
    pub model: String,

    #[serde(default)]
    pub api_key: Option<String>,

    /// Expected embedding dimensions; responses of another size are rejected
    #[serde(default)]
    pub dimensions: Option<usize>,

    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,
}

impl Default for EmbeddingServiceConfig {
    fn default() -> Self {
        Self {
            url: default_embedding_url(),
            model: default_embedding_model(),
            api_key: None,
            dimensions: None,
            timeout_secs: default_timeout(),
        }
    }
}

/// Where the course data lives
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorpusConfig {
    /// JSON array of course records
    #[serde(default = "default_dataset_path")]
    pub dataset_path: PathBuf,

    /// SQLite file backing the vector store (defaults to the cache dir)
    #[serde(default)]
    pub store_path: Option<PathBuf>,

    #[serde(default = "default_collection")]
    pub collection: String,
}

impl Default for CorpusConfig {
    fn default() -> Self {
        Self {
            dataset_path: default_dataset_path(),
            store_path: None,
            collection: default_collection(),
        }
    }
}

fn default_region() -> String {
    "us-east-1".to_string()
}

fn default_n_results() -> usize {
    5
}

fn default_relevance_threshold() -> f32 {
    2.0
}

fn default_embedding_url() -> String {
    "http://localhost:8000".to_string()
}

fn default_embedding_model() -> String {
    "sentence-transformers/all-MiniLM-L6-v2".to_string()
}

/// Variable naming a config file to use instead of the default path
pub const CONFIG_PATH_ENV: &str = "COURSEBOT_CONFIG";

fn default_timeout() -> u64 {
    30
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from("data").join("rmit_course_data.json")
}

fn default_collection() -> String {
    "courses".to_string()
}

fn default_context_turns() -> usize {
    10
}

impl Config {
    /// Load config from `COURSEBOT_CONFIG` or the default path, then apply
    /// environment overrides
    pub fn load() -> Result<Self> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    fn load_with<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = match lookup(CONFIG_PATH_ENV).filter(|p| !p.is_empty()) {
            Some(path) => Self::load_from(path)?,
            None => {
                let path = Self::default_path();
                if path.exists() {
                    Self::load_from(&path)?
                } else {
                    Config::default()
                }
            }
        };
        config.apply_overrides(&lookup)?;
        Ok(config)
    }

    /// Load a specific YAML file, then apply environment overrides
    pub fn load_path(path: impl AsRef<Path>) -> Result<Self> {
        let mut config = Self::load_from(path)?;
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// Load config from a specific YAML file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: Config = serde_yaml::from_str(&content)?;
        Ok(config)
    }

    /// Save config as YAML at `path`
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = serde_yaml::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Get default config path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(crate::CONFIG_DIR_NAME)
            .join("config.yml")
    }

    /// Apply `COURSEBOT_*` overrides using the given variable lookup
    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str, field: &mut String| {
            if let Some(value) = lookup(key) {
                *field = value;
            }
        };
        text("COURSEBOT_REGION", &mut self.aws.region);
        text("COURSEBOT_MODEL_ID", &mut self.aws.model_id);
        text("COURSEBOT_IDENTITY_POOL_ID", &mut self.aws.identity_pool_id);
        text("COURSEBOT_USER_POOL_ID", &mut self.aws.user_pool_id);
        text("COURSEBOT_APP_CLIENT_ID", &mut self.aws.app_client_id);
        text("COURSEBOT_USERNAME", &mut self.aws.username);
        text("COURSEBOT_PASSWORD", &mut self.aws.password);
        text("COURSEBOT_COLLECTION", &mut self.corpus.collection);
        text("COURSEBOT_EMBEDDING_URL", &mut self.embedding.url);
        text("COURSEBOT_EMBEDDING_MODEL", &mut self.embedding.model);

        if let Some(path) = lookup("COURSEBOT_DATASET") {
            self.corpus.dataset_path = PathBuf::from(path);
        }
        if let Some(path) = lookup("COURSEBOT_DB") {
            self.corpus.store_path = Some(PathBuf::from(path));
        }
        if let Some(key) = lookup("COURSEBOT_EMBEDDING_API_KEY") {
            self.embedding.api_key = Some(key);
        }
        if let Some(dims) = lookup("COURSEBOT_EMBEDDING_DIMS") {
            self.embedding.dimensions = Some(parse_number("COURSEBOT_EMBEDDING_DIMS", &dims)?);
        }
        if let Some(n) = lookup("COURSEBOT_N_RESULTS") {
            self.retrieval.n_results = parse_number("COURSEBOT_N_RESULTS", &n)?;
        }
        if let Some(threshold) = lookup("COURSEBOT_RELEVANCE_THRESHOLD") {
            self.retrieval.relevance_threshold =
                parse_number("COURSEBOT_RELEVANCE_THRESHOLD", &threshold)?;
        }
        if let Some(secs) = lookup("COURSEBOT_EMBEDDING_TIMEOUT") {
            self.embedding.timeout_secs = parse_number("COURSEBOT_EMBEDDING_TIMEOUT", &secs)?;
        }
        if let Some(n) = lookup("COURSEBOT_MAX_TOKENS") {
            self.generation.max_tokens = parse_number("COURSEBOT_MAX_TOKENS", &n)?;
        }
        if let Some(t) = lookup("COURSEBOT_TEMPERATURE") {
            self.generation.temperature = parse_number("COURSEBOT_TEMPERATURE", &t)?;
        }
        if let Some(p) = lookup("COURSEBOT_TOP_P") {
            self.generation.top_p = parse_number("COURSEBOT_TOP_P", &p)?;
        }
        if let Some(turns) = lookup("COURSEBOT_CONTEXT_TURNS") {
            self.context_turns = parse_number("COURSEBOT_CONTEXT_TURNS", &turns)?;
        }
        Ok(())
    }

    /// Path of the vector store database
    pub fn store_path(&self) -> PathBuf {
        self.corpus.store_path.clone().unwrap_or_else(|| {
            dirs::cache_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(crate::CACHE_DIR_NAME)
                .join("courses.sqlite")
        })
    }

    /// Context policy derived from `context_turns`
    pub fn context_policy(&self) -> ContextPolicy {
        match self.context_turns {
            0 => ContextPolicy::Unbounded,
            max_turns => ContextPolicy::SlidingWindow { max_turns },
        }
    }

    /// Check that every setting needed for the credential exchange is present
    pub fn validate_aws(&self) -> Result<()> {
        let aws = &self.aws;
        let missing: Vec<&str> = [
            ("region", &aws.region),
            ("model_id", &aws.model_id),
            ("identity_pool_id", &aws.identity_pool_id),
            ("user_pool_id", &aws.user_pool_id),
            ("app_client_id", &aws.app_client_id),
            ("username", &aws.username),
            ("password", &aws.password),
        ]
        .iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| *name)
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(CourseBotError::Config(format!(
                "missing aws settings: {}",
                missing.join(", ")
            )))
        }
    }

    /// Copy of the config with secrets masked, for display
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if !copy.aws.password.is_empty() {
            copy.aws.password = REDACTED.to_string();
        }
        if copy.embedding.api_key.is_some() {
            copy.embedding.api_key = Some(REDACTED.to_string());
        }
        copy
    }
}

fn parse_number<T: std::str::FromStr>(key: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| CourseBotError::Config(format!("{} is not a valid number: {}", key, value)))
}
