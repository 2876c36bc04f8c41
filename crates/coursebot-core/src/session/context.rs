//! Process-wide session resources, built once and shared by every turn

use super::chat::ChatSession;
use crate::auth::{CognitoIdentityProvider, IdentityProvider, TemporaryCredentials};
use crate::config::Config;
use crate::corpus::{populate, PopulateOutcome};
use crate::db::Database;
use crate::error::Result;
use crate::llm::{BedrockClient, Embedder, HttpEmbedder, LanguageModel};
use crate::rag::Advisor;
use crate::store::{SqliteVectorStore, VectorStore};
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Instant;

/// Open and initialize the store database named by the config
pub fn open_database(config: &Config) -> Result<Arc<Database>> {
    let path = config.store_path();
    tracing::debug!("Opening vector store database at {:?}", path);
    let db = Database::open(&path)?;
    db.initialize()?;
    Ok(Arc::new(db))
}

/// Vector store over the configured collection and embedding service
pub fn open_store(config: &Config, db: Arc<Database>) -> Result<Arc<SqliteVectorStore>> {
    let embedder: Arc<dyn Embedder> = Arc::new(HttpEmbedder::from_config(config.embedding.clone())?);
    Ok(Arc::new(SqliteVectorStore::new(
        db,
        embedder,
        config.corpus.collection.clone(),
    )?))
}

/// Config, model gateway, store and orchestrator for one running process
pub struct SessionContext {
    config: Config,
    advisor: Arc<Advisor>,
    credentials_expire: Option<DateTime<Utc>>,
    populated: Option<PopulateOutcome>,
}

impl SessionContext {
    /// Authenticate, connect the model, open and populate the store
    pub async fn initialize(config: Config) -> Result<Self> {
        config.validate_aws()?;
        let provider = CognitoIdentityProvider::new(&config.aws)?;
        Self::initialize_with(config, &provider).await
    }

    /// As [`SessionContext::initialize`] with a caller-chosen identity provider
    pub async fn initialize_with(config: Config, provider: &dyn IdentityProvider) -> Result<Self> {
        let start = Instant::now();
        let credentials: TemporaryCredentials = provider
            .credentials(&config.aws.username, &config.aws.password)
            .await?;
        let credentials_expire = credentials.expiration;

        let model: Arc<dyn LanguageModel> = Arc::new(BedrockClient::new(
            config.aws.region.clone(),
            config.aws.model_id.clone(),
            credentials,
        )?);

        let db = open_database(&config)?;
        let store: Arc<dyn VectorStore> = open_store(&config, db)?;
        let outcome = populate(store.as_ref(), &config.corpus.dataset_path).await?;

        let mut context = Self::from_parts(config, model, store);
        context.credentials_expire = credentials_expire;
        context.populated = Some(outcome);
        tracing::info!(
            "Session initialized in {:.2}s",
            start.elapsed().as_secs_f64()
        );
        Ok(context)
    }

    /// Assemble from existing collaborators without any network or disk setup
    pub fn from_parts(
        config: Config,
        model: Arc<dyn LanguageModel>,
        store: Arc<dyn VectorStore>,
    ) -> Self {
        let advisor = Advisor::new(model, store)
            .with_retrieval(config.retrieval.clone())
            .with_generation(config.generation)
            .with_context_policy(config.context_policy());

        Self {
            config,
            advisor: Arc::new(advisor),
            credentials_expire: None,
            populated: None,
        }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn advisor(&self) -> Arc<Advisor> {
        self.advisor.clone()
    }

    /// What the start-up population step did, if it ran
    pub fn populated(&self) -> Option<&PopulateOutcome> {
        self.populated.as_ref()
    }

    pub fn credentials_expire(&self) -> Option<DateTime<Utc>> {
        self.credentials_expire
    }

    /// New conversation sharing this context's orchestrator
    pub fn chat(&self) -> ChatSession {
        ChatSession::new(self.advisor())
    }

    /// Release the store and model client
    pub fn shutdown(self) {
        tracing::info!("Shutting down session");
        drop(self);
    }
}
